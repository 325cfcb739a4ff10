//! JSON-lines batch command
//!
//! Each input line is a request object:
//!
//! ```json
//! {"op":"convert","input_text":"水 ぬるく","target_register":"polite","forwarded_for":"203.0.113.7"}
//! ```
//!
//! Responses are written in input order, one JSON object per line.

use super::{build_pipeline, shutdown};
use colored::*;
use futures::stream::{self, StreamExt};
use kotonoha_core::admission::derive_client_key;
use kotonoha_core::config::Config;
use kotonoha_core::pipeline::{
    ConversionPipeline, PipelineResponse, RawConversionRequest, TerminalState,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum BatchOp {
    #[default]
    Convert,
    Regenerate,
}

#[derive(Debug, Deserialize)]
struct BatchLine {
    #[serde(default)]
    op: BatchOp,
    #[serde(flatten)]
    request: RawConversionRequest,
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    forwarded_for: Option<String>,
    #[serde(default)]
    peer_addr: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum BatchOutput {
    Response {
        line: usize,
        #[serde(flatten)]
        response: PipelineResponse,
    },
    Unparseable {
        line: usize,
        error: String,
    },
}

#[derive(Debug, Default)]
struct Tally {
    succeeded: usize,
    denied: usize,
    failed: usize,
    rejected: usize,
    unparseable: usize,
}

impl Tally {
    fn count(&mut self, output: &BatchOutput) {
        match output {
            BatchOutput::Unparseable { .. } => self.unparseable += 1,
            BatchOutput::Response { response, .. } => match response.terminal {
                TerminalState::Succeeded => self.succeeded += 1,
                TerminalState::Denied => self.denied += 1,
                TerminalState::Rejected => self.rejected += 1,
                TerminalState::Failed | TerminalState::Internal => self.failed += 1,
            },
        }
    }

    fn all_succeeded(&self) -> bool {
        self.denied + self.failed + self.rejected + self.unparseable == 0
    }
}

/// Run every request from `input` (stdin when absent) through one pipeline
pub async fn run(
    config: &Config,
    input: Option<&Path>,
    concurrency: usize,
) -> anyhow::Result<ExitCode> {
    let lines = match input {
        Some(path) => read_lines(tokio::fs::File::open(path).await?).await?,
        None => read_lines(tokio::io::stdin()).await?,
    };
    info!(requests = lines.len(), concurrency, "starting batch");

    let (pipeline, worker) = build_pipeline(config);
    let purge = pipeline.admission().spawn_purge_task(pipeline.admission().window());

    let outputs: Vec<BatchOutput> = stream::iter(lines)
        .map(|(line, text)| {
            let pipeline = pipeline.clone();
            async move { handle_line(&pipeline, line, &text).await }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    purge.abort();
    let audit = shutdown(pipeline, worker).await;

    let mut tally = Tally::default();
    for output in &outputs {
        tally.count(output);
        println!("{}", serde_json::to_string(output)?);
    }

    eprintln!(
        "{} {} succeeded, {} denied, {} failed, {} rejected, {} unparseable",
        "batch:".bold(),
        tally.succeeded.to_string().green(),
        tally.denied.to_string().yellow(),
        tally.failed.to_string().red(),
        tally.rejected.to_string().yellow(),
        tally.unparseable.to_string().red(),
    );
    eprintln!(
        "{} {} written, {} failed, {} dropped",
        "audit:".bold(),
        audit.written,
        audit.failed,
        audit.dropped
    );

    Ok(if tally.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Non-blank lines with their 1-based line numbers
async fn read_lines<R: AsyncRead + Unpin>(reader: R) -> anyhow::Result<Vec<(usize, String)>> {
    let mut lines = BufReader::new(reader).lines();
    let mut collected = Vec::new();
    let mut number = 0;
    while let Some(line) = lines.next_line().await? {
        number += 1;
        if !line.trim().is_empty() {
            collected.push((number, line));
        }
    }
    Ok(collected)
}

async fn handle_line(pipeline: &ConversionPipeline, line: usize, text: &str) -> BatchOutput {
    let parsed: BatchLine = match serde_json::from_str(text) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(line, error = %e, "skipping unparseable batch line");
            return BatchOutput::Unparseable {
                line,
                error: e.to_string(),
            };
        }
    };

    let client = derive_client_key(parsed.forwarded_for.as_deref(), parsed.peer_addr.as_deref());
    let response = match parsed.request.validate() {
        Err(e) => ConversionPipeline::reject(e),
        Ok(request) => {
            let request = request.with_provider(parsed.provider);
            match parsed.op {
                BatchOp::Convert => pipeline.convert(&client, request).await,
                BatchOp::Regenerate => pipeline.regenerate(&client, request).await,
            }
        }
    };

    BatchOutput::Response { line, response }
}
