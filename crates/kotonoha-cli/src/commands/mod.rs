//! CLI commands

pub mod batch;
pub mod convert;
pub mod status;

use kotonoha_core::admission::AdmissionController;
use kotonoha_core::audit::{AuditLogger, AuditStatsSnapshot, AuditWorker, sink_from_config};
use kotonoha_core::config::Config;
use kotonoha_core::llm::ProviderDispatcher;
use kotonoha_core::pipeline::{ConversionPipeline, PipelineResponse};
use std::sync::Arc;
use tracing::debug;

/// Wire the pipeline from configuration. Must run inside the runtime since
/// the audit writer is spawned here.
pub fn build_pipeline(config: &Config) -> (ConversionPipeline, AuditWorker) {
    let dispatcher = Arc::new(ProviderDispatcher::from_config(config));
    let admission = AdmissionController::from_config(&config.admission);
    let (audit, worker) = AuditLogger::spawn(sink_from_config(&config.audit), &config.audit);
    (ConversionPipeline::new(admission, dispatcher, audit), worker)
}

/// Drop the pipeline and wait for its audit records to be written
pub async fn shutdown(pipeline: ConversionPipeline, worker: AuditWorker) -> AuditStatsSnapshot {
    drop(pipeline);
    let stats = worker.drain().await;
    debug!(?stats, "audit writer drained");
    stats
}

/// Pretty-print a single response as JSON on stdout
pub fn print_response(response: &PipelineResponse) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}
