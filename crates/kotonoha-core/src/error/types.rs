//! Core error types and traits for Kotonoha

use thiserror::Error;

/// Result type alias for Kotonoha operations
pub type KotonohaResult<T> = Result<T, KotonohaError>;

/// Unified error trait implemented by every error surfaced across crates.
///
/// - `error_code()`: stable code for programmatic handling
/// - `message()`: human-readable message
/// - `context()`: optional detail (offending value, path or field)
pub trait UnifiedError: std::error::Error + Send + Sync {
    /// Get the error code for programmatic handling
    fn error_code(&self) -> &str;

    /// Get the human-readable error message
    fn message(&self) -> &str;

    /// Get optional context about the error
    fn context(&self) -> Option<&str> {
        None
    }
}

/// Main error type for the library plumbing (configuration and audit storage).
///
/// Conversion outcomes are not reported through this type; they are
/// classified into [`crate::error::FailureKind`] and carried by
/// [`crate::llm::DispatchError`] and [`crate::pipeline::PipelineError`].
#[derive(Error, Debug, Clone)]
pub enum KotonohaError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        context: Option<String>,
    },

    /// Audit store errors
    #[error("Audit error: {message}")]
    Audit { message: String },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    /// Invalid input errors
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        field: Option<String>,
    },
}
