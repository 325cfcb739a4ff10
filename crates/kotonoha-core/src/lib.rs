//! Kotonoha Core Library
//!
//! Turns short informal Japanese text into a chosen politeness register by
//! way of an LLM provider, with per-client admission control and a
//! privacy-preserving audit trail.

pub mod admission;
pub mod audit;
pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;

// Re-export commonly used types
pub use admission::{AdmissionController, ClientKey, RateLimitDecision, derive_client_key};
pub use audit::{AuditLogger, AuditRecord, AuditSink, AuditWorker, fingerprint};
pub use config::{Config, load_from_env};
pub use error::{FailureKind, KotonohaError, KotonohaResult, UnifiedError};
pub use llm::{
    ConversionOutcome, ConversionService, DispatchError, ProviderDispatcher, ProviderRegistry,
    TargetRegister,
};
pub use pipeline::{
    ApiResponse, ConversionData, ConversionPipeline, ConversionRequest, ErrorDetail,
    HealthReport, PipelineError, PipelineResponse, RawConversionRequest, TerminalState,
    ValidationError,
};
