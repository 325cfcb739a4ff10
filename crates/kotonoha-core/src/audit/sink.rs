//! Audit record destinations

use super::record::AuditRecord;
use crate::config::AuditConfig;
use crate::error::{KotonohaError, KotonohaResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Append-only store for audit records
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist one record; a single call is a single write attempt
    async fn append(&self, record: &AuditRecord) -> KotonohaResult<()>;
}

/// Sink selected by configuration: a JSON-lines file when a path is set,
/// otherwise structured log events
pub fn sink_from_config(config: &AuditConfig) -> Arc<dyn AuditSink> {
    match &config.log_path {
        Some(path) => Arc::new(JsonLinesAuditSink::new(path.clone())),
        None => Arc::new(TracingAuditSink),
    }
}

/// JSON-lines file, one record per line
#[derive(Debug)]
pub struct JsonLinesAuditSink {
    path: PathBuf,
    // Serializes appends so lines from concurrent writers never interleave.
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonLinesAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AuditSink for JsonLinesAuditSink {
    async fn append(&self, record: &AuditRecord) -> KotonohaResult<()> {
        let mut line = serde_json::to_string(record).map_err(|e| {
            KotonohaError::audit(format!("cannot encode record {}: {}", record.correlation_id(), e))
        })?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                KotonohaError::io_with_path(e.to_string(), self.path.display().to_string())
            })?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

/// Emits each record as a structured `tracing` event on the `audit` target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn append(&self, record: &AuditRecord) -> KotonohaResult<()> {
        info!(
            target: "audit",
            correlation_id = %record.correlation_id(),
            input_fingerprint = record.input_fingerprint(),
            input_length = record.input_length(),
            output_length = record.output_length(),
            register = %record.register(),
            elapsed_ms = record.elapsed_ms(),
            provider = record.provider(),
            success = record.is_success(),
            failure_reason = record.failure_reason().unwrap_or(""),
            created_at = %record.created_at().to_rfc3339(),
            "conversion attempt"
        );
        Ok(())
    }
}

/// In-memory sink; clones share the same record list
#[derive(Debug, Default, Clone)]
pub struct MemoryAuditSink {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn append(&self, record: &AuditRecord) -> KotonohaResult<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}
