//! Error types for Kotonoha
//!
//! `KotonohaError` covers library plumbing (configuration, audit storage,
//! serialization). Conversion outcomes use the `FailureKind` taxonomy, with
//! `classify_error_text` as the single text-based classifier.

mod classifiers;
mod constructors;
mod conversions;
mod failure;
mod types;
mod unified_error;

pub use classifiers::classify_error_text;
pub use failure::FailureKind;
pub use types::{KotonohaError, KotonohaResult, UnifiedError};
