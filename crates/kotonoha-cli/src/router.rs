//! Command routing logic for CLI

use crate::args::{Cli, Commands};
use crate::commands;
use kotonoha_core::config::Config;
use std::process::ExitCode;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli, config: Config) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Convert {
            text,
            register,
            origin,
        } => commands::convert::convert(&config, &text, &register, &origin).await,
        Commands::Regenerate {
            text,
            register,
            previous,
            origin,
        } => commands::convert::regenerate(&config, &text, &register, &previous, &origin).await,
        Commands::Batch { input, concurrency } => {
            commands::batch::run(&config, input.as_deref(), concurrency).await
        }
        Commands::Status { json } => commands::status::status(&config, json),
    }
}
