//! From trait implementations for KotonohaError conversions

use super::types::KotonohaError;

impl From<std::io::Error> for KotonohaError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}
