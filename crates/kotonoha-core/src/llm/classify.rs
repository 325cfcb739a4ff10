//! Provider failure classification

use super::providers::ProviderError;
use crate::error::{FailureKind, classify_error_text};

/// Map a provider failure onto the pipeline's failure taxonomy.
///
/// Structured signals (transport flags, HTTP status) win; response text is
/// only inspected when they say nothing specific.
pub fn classify_provider_error(error: &ProviderError) -> FailureKind {
    match error {
        ProviderError::NotConfigured { .. } => FailureKind::ProviderUnavailable,
        ProviderError::Transport { timed_out: true, .. } => FailureKind::Timeout,
        ProviderError::Transport { connect: true, .. } => FailureKind::ProviderUnavailable,
        ProviderError::Transport { message, .. } => classify_error_text(message),
        ProviderError::Http { status, body, .. } => match status {
            429 => FailureKind::RateLimited,
            408 | 504 => FailureKind::Timeout,
            401 | 403 => FailureKind::ProviderUnavailable,
            502 | 503 | 529 => FailureKind::ProviderUnavailable,
            _ => classify_error_text(body),
        },
        ProviderError::MalformedResponse { .. } | ProviderError::EmptyCompletion { .. } => {
            FailureKind::ConversionFailed
        }
    }
}
