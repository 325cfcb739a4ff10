//! Kotonoha CLI
//!
//! Converts informal Japanese text into a chosen politeness register through
//! the conversion pipeline.
//!
//! # Commands
//!
//! - `kotonoha convert "水 ぬるく" --register polite`
//! - `kotonoha regenerate "水 ぬるく" --register polite --previous "お水をぬるめでお願いします"`
//! - `kotonoha batch < requests.jsonl` reads one JSON request per line and
//!   runs them concurrently
//! - `kotonoha status` reports which providers are usable
//!
//! Configuration comes from the environment (a `.env` file is honored).

mod args;
mod commands;
mod logging;
mod router;

use args::Cli;
use clap::Parser;
use kotonoha_core::{KotonohaError, UnifiedError};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    let config = kotonoha_core::config::load_from_env().map_err(startup_error)?;
    logging::init(&config.logging, cli.verbose);

    router::route(cli, config).await
}

/// `[CODE] message (context)` for errors raised before the pipeline exists
fn startup_error(err: KotonohaError) -> anyhow::Error {
    match err.context() {
        Some(context) => anyhow::anyhow!("[{}] {} ({})", err.error_code(), err.message(), context),
        None => anyhow::anyhow!("[{}] {}", err.error_code(), err.message()),
    }
}
