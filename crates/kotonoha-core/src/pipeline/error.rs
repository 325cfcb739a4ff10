//! Pipeline error taxonomy

use super::envelope::ErrorDetail;
use super::request::ValidationError;
use crate::error::FailureKind;
use crate::llm::DispatchError;
use thiserror::Error;

pub const RATE_LIMIT_EXCEEDED_MESSAGE: &str =
    "リクエスト数が上限に達しました。しばらく待ってから再試行してください。";
const INTERNAL_ERROR_MESSAGE: &str = "サーバー内部でエラーが発生しました。";

/// Every way a pipeline request can end without a conversion
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("admission denied, retry after {retry_after}s")]
    AdmissionDenied { retry_after: u64 },

    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("internal error: {0}")]
    InternalUnexpected(String),
}

impl PipelineError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.error_code(),
            Self::AdmissionDenied { .. } => "RATE_LIMIT_EXCEEDED",
            Self::Dispatch(e) => e.kind.error_code(),
            Self::InternalUnexpected(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(e) => e.status_code(),
            Self::AdmissionDenied { .. } => 429,
            Self::Dispatch(e) => e.kind.status_code(),
            Self::InternalUnexpected(_) => 500,
        }
    }

    /// Caller-facing text; provider detail stays in the logs
    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation(e) => e.user_message(),
            Self::AdmissionDenied { .. } => RATE_LIMIT_EXCEEDED_MESSAGE,
            Self::Dispatch(e) => e.kind.user_message(),
            Self::InternalUnexpected(_) => INTERNAL_ERROR_MESSAGE,
        }
    }

    /// Reason stored in the audit record; `None` for outcomes that are not audited
    pub fn audit_reason(&self) -> Option<&'static str> {
        match self {
            Self::Validation(_) | Self::AdmissionDenied { .. } => None,
            Self::Dispatch(e) => Some(e.kind.reason()),
            Self::InternalUnexpected(_) => Some("internal"),
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Dispatch(e) => Some(e.kind),
            _ => None,
        }
    }

    pub fn to_detail(&self, retry_after: Option<u64>) -> ErrorDetail {
        ErrorDetail {
            code: self.error_code().to_string(),
            message: self.user_message().to_string(),
            status_code: self.status_code(),
            retry_after,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatch(kind: FailureKind) -> PipelineError {
        PipelineError::Dispatch(DispatchError {
            kind,
            provider: "anthropic".to_string(),
            message: "HTTP 500 from anthropic: {\"api_key\":\"[REDACTED]\"}".to_string(),
            retry_after_seconds: None,
            elapsed_ms: 12,
        })
    }

    #[test]
    fn mapping_table() {
        let cases = [
            (PipelineError::AdmissionDenied { retry_after: 3 }, 429, "RATE_LIMIT_EXCEEDED"),
            (dispatch(FailureKind::RateLimited), 429, "AI_RATE_LIMIT"),
            (dispatch(FailureKind::Timeout), 504, "AI_API_TIMEOUT"),
            (dispatch(FailureKind::ProviderUnavailable), 503, "AI_PROVIDER_ERROR"),
            (dispatch(FailureKind::ConversionFailed), 500, "AI_API_ERROR"),
            (PipelineError::InternalUnexpected("panic".into()), 500, "INTERNAL_ERROR"),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status, "{err}");
            assert_eq!(err.error_code(), code, "{err}");
        }
    }

    #[test]
    fn user_message_hides_provider_detail() {
        let err = dispatch(FailureKind::ConversionFailed);
        assert!(!err.user_message().contains("HTTP"));
        assert!(!err.to_detail(None).message.contains("anthropic"));
    }

    #[test]
    fn denied_is_not_audited() {
        assert_eq!(PipelineError::AdmissionDenied { retry_after: 1 }.audit_reason(), None);
        assert_eq!(dispatch(FailureKind::Timeout).audit_reason(), Some("timeout"));
        assert_eq!(
            PipelineError::InternalUnexpected(String::new()).audit_reason(),
            Some("internal")
        );
    }
}
