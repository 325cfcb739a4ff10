//! Audit trail
//!
//! Every admitted conversion attempt produces exactly one [`AuditRecord`]
//! holding a SHA-256 fingerprint and character counts, never raw text.
//! Records are handed to a bounded queue and written by a background task;
//! a failed write is logged and the record dropped.

mod fingerprint;
mod logger;
mod record;
mod sink;

pub use fingerprint::fingerprint;
pub use logger::{AuditLogger, AuditStatsSnapshot, AuditWorker};
pub use record::AuditRecord;
pub use sink::{AuditSink, JsonLinesAuditSink, MemoryAuditSink, TracingAuditSink, sink_from_config};

#[cfg(test)]
mod tests;
