//! Error types shared by the library and the `gastos` binary.
//!
//! Internally everything is an `anyhow::Error`. Errors that leave a public command are tagged with
//! an `ErrorType` so that callers can tell a rejected input apart from, say, a broken data home.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies errors returned from public commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The input was rejected, e.g. a missing date or event. Nothing was changed.
    Validation,
    /// The requested record does not exist.
    NotFound,
    /// The persistent slot could not be read or written.
    Storage,
    /// The data home or its `config.json` is missing or invalid.
    Config,
    /// A report could not be written.
    Export,
}

impl Display for ErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorType::Validation => "Validation error",
            ErrorType::NotFound => "Not found",
            ErrorType::Storage => "Storage error",
            ErrorType::Config => "Configuration error",
            ErrorType::Export => "Export error",
        };
        f.write_str(s)
    }
}

/// Attaches an `ErrorType` to the error of a `Result` before it is handed to a public caller.
pub(crate) trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T> IntoResult<T> for Result<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| {
            if self::error_type(&e).is_some() {
                e
            } else {
                e.context(error_type)
            }
        })
    }
}

/// Returns the `ErrorType` attached to `err`, if any.
pub fn error_type(err: &Error) -> Option<ErrorType> {
    err.downcast_ref::<ErrorType>().copied()
}
