#![doc = include_str!("../README.md")]

mod cli;

use std::process::ExitCode;

use clap::Parser;
use cli::commands::{TryAgain, dispatch};
use cli::config::{AppConfig, CliArgs};
use cli::telemetry::init_telemetry;

/// `EX_TEMPFAIL` from `sysexits.h`.
const EXIT_TEMPFAIL: u8 = 75;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = AppConfig::try_from(args)?;

    init_telemetry(config.log_format)?;
    if cfg!(debug_assertions) {
        tracing::debug!("Starting with config: {:#?}", config);
    }

    match dispatch(config).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) if err.downcast_ref::<TryAgain>().is_some() => {
            eprintln!("error: {err:#}");
            Ok(ExitCode::from(EXIT_TEMPFAIL))
        }
        Err(err) => Err(err),
    }
}
