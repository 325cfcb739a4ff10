//! Failure taxonomy shared by the dispatcher, the audit trail and the pipeline

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified reason a dispatched conversion did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The provider did not answer within the configured bound
    Timeout,
    /// The provider rejected the call because of its own quota
    RateLimited,
    /// The provider is misconfigured, unknown, unreachable or unauthenticated
    ProviderUnavailable,
    /// The provider answered but the answer was unusable
    ConversionFailed,
}

impl FailureKind {
    /// Short reason string stored in audit records
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::RateLimited => "rate_limited",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::ConversionFailed => "conversion_failed",
        }
    }

    /// Error code placed in the response envelope
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout => "AI_API_TIMEOUT",
            Self::RateLimited => "AI_RATE_LIMIT",
            Self::ProviderUnavailable => "AI_PROVIDER_ERROR",
            Self::ConversionFailed => "AI_API_ERROR",
        }
    }

    /// HTTP status used for the response envelope
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Timeout => 504,
            Self::RateLimited => 429,
            Self::ProviderUnavailable => 503,
            Self::ConversionFailed => 500,
        }
    }

    /// Caller-facing message; never includes provider internals
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Timeout => "AI APIの応答がタイムアウトしました。しばらく待ってから再試行してください。",
            Self::RateLimited => "AI APIのレート制限に達しました。しばらく待ってから再試行してください。",
            Self::ProviderUnavailable => "AIプロバイダーが利用できません。",
            Self::ConversionFailed => "AI変換処理に失敗しました。",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}
