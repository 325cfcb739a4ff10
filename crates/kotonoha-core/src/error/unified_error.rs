//! UnifiedError trait implementation for KotonohaError

use super::types::{KotonohaError, UnifiedError};

impl UnifiedError for KotonohaError {
    fn error_code(&self) -> &str {
        match self {
            Self::Config { .. } => "KOTONOHA_CONFIG",
            Self::Audit { .. } => "KOTONOHA_AUDIT",
            Self::Io { .. } => "KOTONOHA_IO",
            Self::InvalidInput { .. } => "KOTONOHA_INVALID_INPUT",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Config { message, .. } => message,
            Self::Audit { message } => message,
            Self::Io { message, .. } => message,
            Self::InvalidInput { message, .. } => message,
        }
    }

    fn context(&self) -> Option<&str> {
        match self {
            Self::Config { context, .. } => context.as_deref(),
            Self::Io { path, .. } => path.as_deref(),
            Self::InvalidInput { field, .. } => field.as_deref(),
            Self::Audit { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(KotonohaError::config("x").error_code(), "KOTONOHA_CONFIG");
        assert_eq!(KotonohaError::audit("x").error_code(), "KOTONOHA_AUDIT");
        assert_eq!(KotonohaError::io("x").error_code(), "KOTONOHA_IO");
        assert_eq!(
            KotonohaError::invalid_input_field("x", "target_register").error_code(),
            "KOTONOHA_INVALID_INPUT"
        );
    }

    #[test]
    fn context_is_exposed() {
        let err = KotonohaError::config_with_context("bad value", "AI_API_TIMEOUT");
        assert_eq!(err.message(), "bad value");
        assert_eq!(err.context(), Some("AI_API_TIMEOUT"));
        assert_eq!(KotonohaError::io_with_path("denied", "/var/log/a").context(), Some("/var/log/a"));
        assert_eq!(KotonohaError::audit("store down").context(), None);
    }
}
