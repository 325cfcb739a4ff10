//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kotonoha")]
#[command(about = "Kotonoha - convert Japanese text to a target politeness register")]
#[command(
    long_about = r#"Kotonoha - convert Japanese text to a target politeness register

USAGE:
  kotonoha convert "水 ぬるく" --register polite
  kotonoha regenerate "水 ぬるく" --register polite --previous "お水をぬるめでお願いします"
  kotonoha batch --input requests.jsonl
  kotonoha status

Providers are configured with ANTHROPIC_API_KEY / OPENAI_API_KEY."#
)]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG still takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert one text
    Convert {
        /// Text to convert
        text: String,

        /// Target register: casual, normal or polite
        #[arg(long, short, default_value = "normal")]
        register: String,

        #[command(flatten)]
        origin: RequestOrigin,
    },

    /// Convert again, asking for a phrasing different from a previous result
    Regenerate {
        /// Text to convert
        text: String,

        /// Target register: casual, normal or polite
        #[arg(long, short, default_value = "normal")]
        register: String,

        /// Result of the earlier conversion
        #[arg(long)]
        previous: String,

        #[command(flatten)]
        origin: RequestOrigin,
    },

    /// Run JSON-lines requests concurrently, one response per output line
    Batch {
        /// Read requests from this file instead of stdin
        #[arg(long, short)]
        input: Option<PathBuf>,

        /// Maximum requests in flight
        #[arg(long, default_value_t = 8)]
        concurrency: usize,
    },

    /// Show provider availability and effective configuration
    Status {
        /// Print the health report as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Who is asking, and which provider should answer
#[derive(Args, Clone, Debug, Default)]
pub struct RequestOrigin {
    /// Provider to use instead of the configured default
    #[arg(long)]
    pub provider: Option<String>,

    /// Forwarded-address chain of the caller; the first entry is used
    #[arg(long)]
    pub forwarded_for: Option<String>,

    /// Direct peer address of the caller
    #[arg(long)]
    pub peer: Option<String>,
}
