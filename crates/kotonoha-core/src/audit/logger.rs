//! Background audit writer

use super::record::AuditRecord;
use super::sink::AuditSink;
use crate::config::AuditConfig;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{SendTimeoutError, TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};
use uuid::Uuid;

#[derive(Debug, Default)]
struct AuditStats {
    enqueued: AtomicU64,
    written: AtomicU64,
    failed: AtomicU64,
    deferred: AtomicU64,
    dropped: AtomicU64,
}

/// Point-in-time audit counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuditStatsSnapshot {
    /// Records accepted onto the queue
    pub enqueued: u64,
    /// Records the sink accepted
    pub written: u64,
    /// Records dropped after every write attempt failed
    pub failed: u64,
    /// Enqueues that outlasted the enqueue wait and finished in the background
    pub deferred: u64,
    /// Records lost because the writer had already stopped
    pub dropped: u64,
}

impl AuditStats {
    fn snapshot(&self) -> AuditStatsSnapshot {
        AuditStatsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            written: self.written.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            deferred: self.deferred.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }

    fn mark_enqueued(&self) {
        self.enqueued.fetch_add(1, Ordering::Relaxed);
    }

    fn mark_dropped(&self, correlation_id: Uuid) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
        warn!(%correlation_id, "audit writer stopped, record dropped");
    }
}

/// Handle used on the response path to hand records to the writer
#[derive(Debug, Clone)]
pub struct AuditLogger {
    tx: mpsc::Sender<AuditRecord>,
    stats: Arc<AuditStats>,
    enqueue_wait: Duration,
}

/// The spawned writer task
#[derive(Debug)]
pub struct AuditWorker {
    handle: JoinHandle<()>,
    stats: Arc<AuditStats>,
}

impl AuditLogger {
    /// Spawn a writer using the configured queue bound and attempt count
    pub fn spawn(sink: Arc<dyn AuditSink>, config: &AuditConfig) -> (Self, AuditWorker) {
        Self::with_options(
            sink,
            config.queue_capacity,
            config.write_attempts,
            config.enqueue_wait(),
        )
    }

    pub fn with_options(
        sink: Arc<dyn AuditSink>,
        queue_capacity: usize,
        write_attempts: u8,
        enqueue_wait: Duration,
    ) -> (Self, AuditWorker) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let stats = Arc::new(AuditStats::default());
        let handle = tokio::spawn(run_writer(rx, sink, write_attempts.max(1), stats.clone()));

        (
            Self {
                tx,
                stats: stats.clone(),
                enqueue_wait,
            },
            AuditWorker { handle, stats },
        )
    }

    /// Queue a record for writing. Never fails and never waits longer than
    /// the enqueue wait: if the queue is still full after that, a detached
    /// task keeps waiting for room. Records are only dropped once the writer
    /// has stopped.
    pub async fn record(&self, record: AuditRecord) {
        let correlation_id = record.correlation_id();
        let record = match self.tx.try_send(record) {
            Ok(()) => return self.stats.mark_enqueued(),
            Err(TrySendError::Closed(_)) => return self.stats.mark_dropped(correlation_id),
            Err(TrySendError::Full(record)) => record,
        };

        debug!(%correlation_id, "audit queue full, waiting for room");
        let record = match self.tx.send_timeout(record, self.enqueue_wait).await {
            Ok(()) => return self.stats.mark_enqueued(),
            Err(SendTimeoutError::Closed(_)) => return self.stats.mark_dropped(correlation_id),
            Err(SendTimeoutError::Timeout(record)) => record,
        };

        debug!(%correlation_id, "audit queue still full, handing off to background enqueue");
        self.stats.deferred.fetch_add(1, Ordering::Relaxed);
        let tx = self.tx.clone();
        let stats = self.stats.clone();
        tokio::spawn(async move {
            match tx.send(record).await {
                Ok(()) => stats.mark_enqueued(),
                Err(_) => stats.mark_dropped(correlation_id),
            }
        });
    }

    pub fn stats(&self) -> AuditStatsSnapshot {
        self.stats.snapshot()
    }
}

impl AuditWorker {
    /// Wait for the queue to empty. Completes once every `AuditLogger`
    /// clone and every background enqueue has finished.
    pub async fn drain(self) -> AuditStatsSnapshot {
        if let Err(e) = self.handle.await {
            error!(error = %e, "audit writer task ended abnormally");
        }
        self.stats.snapshot()
    }

    pub fn stats(&self) -> AuditStatsSnapshot {
        self.stats.snapshot()
    }
}

async fn run_writer(
    mut rx: mpsc::Receiver<AuditRecord>,
    sink: Arc<dyn AuditSink>,
    write_attempts: u8,
    stats: Arc<AuditStats>,
) {
    while let Some(record) = rx.recv().await {
        for attempt in 1..=write_attempts {
            match sink.append(&record).await {
                Ok(()) => {
                    stats.written.fetch_add(1, Ordering::Relaxed);
                    break;
                }
                Err(e) if attempt < write_attempts => {
                    debug!(
                        correlation_id = %record.correlation_id(),
                        attempt,
                        error = %e,
                        "audit write failed, retrying once"
                    );
                }
                Err(e) => {
                    stats.failed.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        correlation_id = %record.correlation_id(),
                        attempts = write_attempts,
                        error = %e,
                        "audit write failed, record dropped"
                    );
                }
            }
        }
    }
    debug!("audit writer stopped");
}
