use super::*;
use crate::error::{KotonohaError, KotonohaResult};
use crate::llm::TargetRegister;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use uuid::Uuid;

fn sample(input: &str) -> AuditRecord {
    AuditRecord::success(
        Uuid::new_v4(),
        input,
        "お水をぬるめでお願いします",
        TargetRegister::Normal,
        "anthropic",
        1500,
    )
}

/// Fails the first `failures` appends, then succeeds
#[derive(Default)]
struct FlakySink {
    failures: usize,
    calls: AtomicUsize,
    written: MemoryAuditSink,
}

#[async_trait]
impl AuditSink for FlakySink {
    async fn append(&self, record: &AuditRecord) -> KotonohaResult<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(KotonohaError::audit("store unavailable"));
        }
        self.written.append(record).await
    }
}

/// Blocks every append until released
struct GatedSink {
    gate: Arc<Notify>,
    inner: MemoryAuditSink,
}

#[async_trait]
impl AuditSink for GatedSink {
    async fn append(&self, record: &AuditRecord) -> KotonohaResult<()> {
        self.gate.notified().await;
        self.inner.append(record).await
    }
}

#[tokio::test]
async fn records_reach_the_sink_after_drain() {
    let sink = MemoryAuditSink::new();
    let (logger, worker) = AuditLogger::with_options(
        Arc::new(sink.clone()),
        8,
        1,
        Duration::from_millis(50),
    );

    logger.record(sample("一")).await;
    logger.record(sample("二")).await;
    drop(logger);

    let stats = worker.drain().await;
    assert_eq!(stats.enqueued, 2);
    assert_eq!(stats.written, 2);
    assert_eq!(sink.len(), 2);
}

#[tokio::test]
async fn single_attempt_then_drop() {
    let sink = Arc::new(FlakySink {
        failures: usize::MAX,
        ..Default::default()
    });
    let (logger, worker) =
        AuditLogger::with_options(sink.clone(), 8, 1, Duration::from_millis(50));

    logger.record(sample("水 ぬるく")).await;
    drop(logger);
    let stats = worker.drain().await;

    assert_eq!(sink.calls.load(Ordering::SeqCst), 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.written, 0);
}

#[tokio::test]
async fn optional_retry_is_a_single_extra_attempt() {
    let sink = Arc::new(FlakySink {
        failures: 1,
        ..Default::default()
    });
    let (logger, worker) =
        AuditLogger::with_options(sink.clone(), 8, 2, Duration::from_millis(50));

    logger.record(sample("水 ぬるく")).await;
    drop(logger);
    let stats = worker.drain().await;

    assert_eq!(sink.calls.load(Ordering::SeqCst), 2);
    assert_eq!(stats.written, 1);
    assert_eq!(sink.written.len(), 1);
}

#[tokio::test]
async fn full_queue_defers_enqueue_instead_of_dropping() {
    let gate = Arc::new(Notify::new());
    let inner = MemoryAuditSink::new();
    let sink = Arc::new(GatedSink {
        gate: gate.clone(),
        inner: inner.clone(),
    });
    let (logger, worker) = AuditLogger::with_options(sink, 1, 1, Duration::from_millis(20));

    // First record is taken by the writer and blocks; second fills the queue.
    logger.record(sample("一")).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    logger.record(sample("二")).await;

    let started = std::time::Instant::now();
    logger.record(sample("三")).await;
    assert!(started.elapsed() < Duration::from_millis(500));

    let stats = logger.stats();
    assert_eq!(stats.deferred, 1);
    assert_eq!(stats.dropped, 0);

    drop(logger);
    for _ in 0..3 {
        gate.notify_one();
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let stats = worker.drain().await;

    assert_eq!(stats.enqueued, 3);
    assert_eq!(stats.written, 3);
    assert_eq!(stats.dropped, 0);
    assert_eq!(inner.len(), 3);
}

/// Sleeps before every append
struct SlowSink {
    delay: Duration,
    inner: MemoryAuditSink,
}

#[async_trait]
impl AuditSink for SlowSink {
    async fn append(&self, record: &AuditRecord) -> KotonohaResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.append(record).await
    }
}

#[tokio::test]
async fn every_record_reaches_a_slow_sink() {
    let inner = MemoryAuditSink::new();
    let sink = Arc::new(SlowSink {
        delay: Duration::from_millis(30),
        inner: inner.clone(),
    });
    let (logger, worker) = AuditLogger::with_options(sink, 1, 1, Duration::from_millis(5));

    for i in 0..6 {
        logger.record(sample(&format!("入力{i}"))).await;
    }
    drop(logger);
    let stats = worker.drain().await;

    assert_eq!(stats.enqueued, 6);
    assert_eq!(stats.written, 6);
    assert_eq!(stats.dropped, 0);
    assert_eq!(inner.len(), 6);
}

#[tokio::test]
async fn json_lines_sink_appends_one_record_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("audit.jsonl");
    let sink = JsonLinesAuditSink::new(&path);

    let first = sample("水 ぬるく");
    let second = AuditRecord::failure(
        Uuid::new_v4(),
        "お茶",
        TargetRegister::Polite,
        "openai",
        30_000,
        "timeout",
    );
    sink.append(&first).await.unwrap();
    sink.append(&second).await.unwrap();

    let contents = tokio::fs::read_to_string(&path).await.unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(!contents.contains("水 ぬるく"));

    let parsed: AuditRecord = serde_json::from_str(lines[1]).unwrap();
    assert_eq!(parsed, second);
}

#[tokio::test]
async fn unwritable_path_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let sink = JsonLinesAuditSink::new(dir.path().join("missing").join("audit.jsonl"));
    let err = sink.append(&sample("水")).await.unwrap_err();
    assert!(matches!(err, KotonohaError::Io { path: Some(_), .. }));
}
