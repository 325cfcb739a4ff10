//! Conversion pipeline
//!
//! Validation happens first and never touches the admission quota. Admitted
//! requests are dispatched to a provider and audited exactly once, whatever
//! the outcome; denied requests are neither dispatched nor audited.

mod envelope;
mod error;
pub mod health;
mod orchestrator;
mod request;

pub use envelope::{ApiResponse, ConversionData, ErrorDetail, PipelineResponse, TerminalState};
pub use error::{PipelineError, RATE_LIMIT_EXCEEDED_MESSAGE};
pub use health::HealthReport;
pub use orchestrator::ConversionPipeline;
pub use request::{
    ConversionRequest, INPUT_TEXT_MAX_CHARS, INPUT_TEXT_MIN_CHARS, RawConversionRequest,
    ValidationError,
};
