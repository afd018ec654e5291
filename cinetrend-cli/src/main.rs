//! Cinetrend CLI - Command-line interface
//!
//! Provides command-line access to catalog search, trending and the
//! trending HTTP service.

mod commands;

use std::process::ExitCode;

use cinetrend_core::tracing_setup::{CliLogLevel, init_tracing};
use cinetrend_core::{CinetrendConfig, CinetrendError, RuntimeMode};
use clap::Parser;

#[derive(Parser)]
#[command(name = "cinetrend")]
#[command(about = "Movie search with trending searches")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: commands::Commands,

    /// Console log level; the log file always captures everything
    #[arg(long, value_enum, default_value_t = CliLogLevel::Warn, global = true)]
    log_level: CliLogLevel,

    /// Runtime mode (production, development); overrides CINETREND_MODE
    #[arg(long, global = true)]
    mode: Option<RuntimeMode>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = init_tracing(cli.log_level.as_tracing_level(), None) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    let mut config = CinetrendConfig::from_env();
    if let Some(mode) = cli.mode {
        config.runtime_mode = mode;
    }

    match commands::handle_command(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

/// Prints a command failure; configuration mistakes exit with status 2.
fn report(error: &anyhow::Error) -> ExitCode {
    tracing::error!("{error:#}");
    match error.downcast_ref::<CinetrendError>() {
        Some(e) => {
            eprintln!("{}", e.user_message());
            if e.is_user_error() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
        None => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
