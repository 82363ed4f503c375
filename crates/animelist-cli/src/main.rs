mod app;
mod browser;
mod cli;
mod format;
mod logging;

use std::process::ExitCode;

use animelist_core::config::AppConfig;
use clap::Parser;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("animelist: {e}");
            return ExitCode::FAILURE;
        }
    };

    let _guard = match config.ensure_data_dir() {
        Ok(dir) => logging::init(&dir.join("logs"), cli.verbose),
        Err(e) => {
            eprintln!("animelist: {e}");
            return ExitCode::FAILURE;
        }
    };

    let command = cli.command.unwrap_or(Commands::Browse);
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "animelist starting");

    match app::run(command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            eprintln!("animelist: {e}");
            ExitCode::FAILURE
        }
    }
}
