pub mod args;
mod backup;
pub mod commands;
mod config;
mod error;
pub mod export;
pub mod model;
pub mod report;
pub mod session;
pub mod store;
mod utils;

#[cfg(test)]
mod test;

pub use backup::Backup;
pub use config::Config;
pub use error::{error_type, Error, ErrorType, Result};
