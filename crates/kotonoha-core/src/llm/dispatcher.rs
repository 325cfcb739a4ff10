//! Provider dispatch with a per-call time bound

use super::classify::classify_provider_error;
use super::prompt::CompletionRequest;
use super::register::TargetRegister;
use super::registry::ProviderRegistry;
use crate::config::Config;
use crate::error::FailureKind;
use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{info, instrument, warn};

/// Successful conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionOutcome {
    pub converted_text: String,
    /// Time from just before the outbound call to the parsed reply
    pub elapsed_ms: u64,
    pub provider_used: String,
}

/// Classified dispatch failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{provider}: {kind}: {message}")]
pub struct DispatchError {
    pub kind: FailureKind,
    /// Provider the call was resolved to, or the unrecognized name
    pub provider: String,
    /// Sanitized detail for logs; never shown to callers
    pub message: String,
    /// Provider-supplied retry hint for rate limits, in seconds
    pub retry_after_seconds: Option<u64>,
    pub elapsed_ms: u64,
}

impl DispatchError {
    fn unavailable(provider: &str, reason: String) -> Self {
        Self {
            kind: FailureKind::ProviderUnavailable,
            provider: provider.to_string(),
            message: reason,
            retry_after_seconds: None,
            elapsed_ms: 0,
        }
    }
}

/// Conversion operations used by the pipeline
#[async_trait]
pub trait ConversionService: Send + Sync {
    async fn convert(
        &self,
        text: &str,
        register: TargetRegister,
        provider: Option<&str>,
    ) -> Result<ConversionOutcome, DispatchError>;

    async fn regenerate(
        &self,
        text: &str,
        register: TargetRegister,
        previous_result: &str,
        provider: Option<&str>,
    ) -> Result<ConversionOutcome, DispatchError>;
}

/// Routes conversions to the selected provider
#[derive(Debug, Clone)]
pub struct ProviderDispatcher {
    registry: ProviderRegistry,
    default_provider: String,
    call_timeout: Duration,
}

impl ProviderDispatcher {
    pub fn new(
        registry: ProviderRegistry,
        default_provider: impl Into<String>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            registry,
            default_provider: default_provider.into().trim().to_lowercase(),
            call_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            ProviderRegistry::from_config(config),
            config.default_provider.clone(),
            config.timeouts.call_timeout(),
        )
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn default_provider(&self) -> &str {
        &self.default_provider
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Explicit name wins over the default; blank counts as absent
    pub fn resolve_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_lowercase)
            .unwrap_or_else(|| self.default_provider.clone())
    }

    #[instrument(skip(self, request), fields(intent = ?request.intent), level = "debug")]
    async fn dispatch(
        &self,
        request: CompletionRequest,
        requested: Option<&str>,
    ) -> Result<ConversionOutcome, DispatchError> {
        let name = self.resolve_name(requested);
        let provider = self.registry.resolve(&name).map_err(|reason| {
            warn!(provider = %name, reason = %reason, "provider unavailable");
            DispatchError::unavailable(&name, reason)
        })?;

        let started = Instant::now();
        let result = tokio::time::timeout(self.call_timeout, provider.complete(&request)).await;
        let elapsed_ms = millis(started.elapsed());

        match result {
            Err(_) => {
                warn!(
                    provider = %name,
                    elapsed_ms,
                    timeout_ms = millis(self.call_timeout),
                    "provider call timed out"
                );
                Err(DispatchError {
                    kind: FailureKind::Timeout,
                    provider: name,
                    message: format!("no reply within {:?}", self.call_timeout),
                    retry_after_seconds: None,
                    elapsed_ms,
                })
            }
            Ok(Err(err)) => {
                let kind = classify_provider_error(&err);
                warn!(provider = %name, kind = %kind, elapsed_ms, error = %err, "provider call failed");
                Err(DispatchError {
                    kind,
                    provider: name,
                    retry_after_seconds: err.retry_after(),
                    message: err.to_string(),
                    elapsed_ms,
                })
            }
            Ok(Ok(text)) => {
                let converted_text = text.trim().to_string();
                if converted_text.is_empty() {
                    warn!(provider = %name, elapsed_ms, "provider returned blank text");
                    return Err(DispatchError {
                        kind: FailureKind::ConversionFailed,
                        provider: name,
                        message: "blank completion".to_string(),
                        retry_after_seconds: None,
                        elapsed_ms,
                    });
                }

                info!(
                    provider = %name,
                    elapsed_ms,
                    output_chars = converted_text.chars().count(),
                    "conversion completed"
                );
                Ok(ConversionOutcome {
                    converted_text,
                    elapsed_ms,
                    provider_used: name,
                })
            }
        }
    }
}

#[async_trait]
impl ConversionService for ProviderDispatcher {
    async fn convert(
        &self,
        text: &str,
        register: TargetRegister,
        provider: Option<&str>,
    ) -> Result<ConversionOutcome, DispatchError> {
        self.dispatch(CompletionRequest::conversion(text, register), provider)
            .await
    }

    async fn regenerate(
        &self,
        text: &str,
        register: TargetRegister,
        previous_result: &str,
        provider: Option<&str>,
    ) -> Result<ConversionOutcome, DispatchError> {
        self.dispatch(
            CompletionRequest::regeneration(text, register, previous_result),
            provider,
        )
        .await
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
