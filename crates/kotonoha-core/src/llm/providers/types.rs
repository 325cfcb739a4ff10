//! Provider-level failures

use thiserror::Error;

/// Raw failure reported by a provider adapter, before classification
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Non-success HTTP status; `body` is already sanitized
    #[error("{provider} API error (status {status}): {body}")]
    Http {
        provider: String,
        status: u16,
        body: String,
        /// Parsed `Retry-After` header, in seconds
        retry_after: Option<u64>,
    },

    /// The request never produced a response
    #[error("{provider} request failed: {message}")]
    Transport {
        provider: String,
        message: String,
        timed_out: bool,
        connect: bool,
    },

    /// The response arrived but could not be read
    #[error("Failed to parse {provider} response: {message}")]
    MalformedResponse { provider: String, message: String },

    /// The response contained no usable text
    #[error("{provider} returned an empty completion")]
    EmptyCompletion { provider: String },

    /// No credentials were supplied for the provider
    #[error("{provider} API key is not configured")]
    NotConfigured { provider: String },
}

impl ProviderError {
    pub fn provider(&self) -> &str {
        match self {
            Self::Http { provider, .. }
            | Self::Transport { provider, .. }
            | Self::MalformedResponse { provider, .. }
            | Self::EmptyCompletion { provider }
            | Self::NotConfigured { provider } => provider,
        }
    }

    /// Provider-supplied retry hint, in seconds
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::Http { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}
