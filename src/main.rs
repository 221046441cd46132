use clap::Parser;
use gastos_report::args::{Args, Command};
use gastos_report::{commands, error_type, Config, ErrorType, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            // A failed export leaves the stored expenses as they were
            if error_type(&e) == Some(ErrorType::Export) {
                warn!("Export failed: {e:#}");
            } else {
                error!("Exiting with error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().gastos_home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Add(add_args) => {
            let config = Config::load(home).await.map_err(config_error)?;
            commands::add(config, add_args.clone()).await?.print()
        }

        Command::Delete(delete_args) => {
            let config = Config::load(home).await.map_err(config_error)?;
            commands::delete(config, delete_args.clone(), commands::confirm_delete)
                .await?
                .print()
        }

        Command::Report(report_args) => {
            let config = Config::load(home).await.map_err(config_error)?;
            commands::report(config, report_args.clone()).await?.print()
        }

        Command::Months => {
            let config = Config::load(home).await.map_err(config_error)?;
            commands::months(config).await?.print()
        }

        Command::Export(export_args) => {
            let config = Config::load(home).await.map_err(config_error)?;
            commands::export(config, export_args.clone()).await?.print()
        }
    };
    Ok(())
}

fn config_error(e: gastos_report::Error) -> gastos_report::Error {
    e.context(ErrorType::Config)
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                "gastos_report",
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
