//! Configuration data model

use super::defaults;
use crate::error::{KotonohaError, KotonohaResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Provider names in preference order
pub const KNOWN_PROVIDERS: [&str; 2] = ["anthropic", "openai"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Provider used when a request does not name one
    pub default_provider: String,
    /// Provider settings keyed by lowercase provider name
    pub providers: HashMap<String, ProviderSettings>,
    /// Timeout settings
    pub timeouts: TimeoutConfig,
    /// Admission control settings
    pub admission: AdmissionConfig,
    /// Audit trail settings
    pub audit: AuditConfig,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        let providers = [ProviderSettings::anthropic(), ProviderSettings::openai()]
            .into_iter()
            .map(|settings| (settings.name.clone(), settings))
            .collect();

        Self {
            default_provider: "anthropic".to_string(),
            providers,
            timeouts: TimeoutConfig::default(),
            admission: AdmissionConfig::default(),
            audit: AuditConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Look up provider settings by name (case-insensitive)
    pub fn provider(&self, name: &str) -> Option<&ProviderSettings> {
        self.providers.get(&name.trim().to_lowercase())
    }

    /// Validate numeric invariants
    pub fn validate(&self) -> KotonohaResult<()> {
        self.timeouts.validate()?;
        self.admission.validate()?;
        self.audit.validate()?;

        if self.default_provider.trim().is_empty() {
            return Err(KotonohaError::config("Default provider must not be empty"));
        }

        for settings in self.providers.values() {
            if settings.max_tokens == 0 {
                return Err(KotonohaError::config_with_context(
                    "max_tokens must be greater than 0",
                    format!("provider '{}'", settings.name),
                ));
            }
        }

        Ok(())
    }
}

/// Per-provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub name: String,
    /// API key; never serialized
    #[serde(skip_serializing, default)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// API version header (Anthropic only)
    pub api_version: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub regenerate_temperature: f32,
}

impl ProviderSettings {
    /// Default Anthropic settings without credentials
    pub fn anthropic() -> Self {
        Self {
            name: "anthropic".to_string(),
            api_key: None,
            model: "claude-3-5-sonnet-20241022".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            api_version: Some("2023-06-01".to_string()),
            max_tokens: defaults::provider::MAX_TOKENS,
            temperature: defaults::provider::CONVERT_TEMPERATURE,
            regenerate_temperature: defaults::provider::REGENERATE_TEMPERATURE,
        }
    }

    /// Default OpenAI settings without credentials
    pub fn openai() -> Self {
        Self {
            name: "openai".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            api_version: None,
            max_tokens: defaults::provider::MAX_TOKENS,
            temperature: defaults::provider::CONVERT_TEMPERATURE,
            regenerate_temperature: defaults::provider::REGENERATE_TEMPERATURE,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Non-blank API key, if any
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Bound on a single provider call, in seconds
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: f64,
    /// HTTP connect timeout, in seconds
    #[serde(default = "default_connection_timeout_secs")]
    pub connection_timeout_secs: u64,
}

fn default_call_timeout_secs() -> f64 {
    defaults::provider::CALL_SECS
}

fn default_connection_timeout_secs() -> u64 {
    defaults::provider::CONNECTION_SECS
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: default_call_timeout_secs(),
            connection_timeout_secs: default_connection_timeout_secs(),
        }
    }
}

impl TimeoutConfig {
    /// Per-call bound as Duration; out-of-range values fall back to the default
    pub fn call_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.call_timeout_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(defaults::provider::CALL_SECS))
    }

    /// Connect timeout as Duration
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    pub fn validate(&self) -> KotonohaResult<()> {
        if self.call_timeout_secs <= 0.0
            || Duration::try_from_secs_f64(self.call_timeout_secs).is_err()
        {
            return Err(KotonohaError::config(
                "call_timeout_secs must be a positive number",
            ));
        }
        if self.connection_timeout_secs == 0 {
            return Err(KotonohaError::config(
                "connection_timeout_secs must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Admission control configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Requests admitted per client per window
    pub max_requests: u32,
    /// Trailing window length in seconds
    pub window_secs: u64,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_requests: defaults::admission::MAX_REQUESTS,
            window_secs: defaults::admission::WINDOW_SECS,
        }
    }
}

impl AdmissionConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn validate(&self) -> KotonohaResult<()> {
        if self.max_requests == 0 {
            return Err(KotonohaError::config("max_requests must be greater than 0"));
        }
        if self.window_secs == 0 {
            return Err(KotonohaError::config("window_secs must be greater than 0"));
        }
        Ok(())
    }
}

/// Audit trail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// JSON-lines file; when unset records go to the tracing sink
    pub log_path: Option<PathBuf>,
    pub queue_capacity: usize,
    pub write_attempts: u8,
    pub enqueue_wait_ms: u64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            queue_capacity: defaults::audit::QUEUE_CAPACITY,
            write_attempts: defaults::audit::WRITE_ATTEMPTS,
            enqueue_wait_ms: defaults::audit::ENQUEUE_WAIT_MS,
        }
    }
}

impl AuditConfig {
    pub fn enqueue_wait(&self) -> Duration {
        Duration::from_millis(self.enqueue_wait_ms)
    }

    pub fn validate(&self) -> KotonohaResult<()> {
        if self.queue_capacity == 0 {
            return Err(KotonohaError::config("queue_capacity must be greater than 0"));
        }
        if self.write_attempts == 0 || self.write_attempts > defaults::audit::MAX_WRITE_ATTEMPTS {
            return Err(KotonohaError::config_with_context(
                format!("write_attempts must be 1 or {}", defaults::audit::MAX_WRITE_ATTEMPTS),
                format!("got {}", self.write_attempts),
            ));
        }
        Ok(())
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = KotonohaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(KotonohaError::config(format!(
                "Unknown log format '{}', expected 'pretty' or 'json'",
                other
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when RUST_LOG is unset
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeouts.call_timeout(), Duration::from_secs(30));
        assert_eq!(config.admission.max_requests, 1);
        assert_eq!(config.admission.window(), Duration::from_secs(10));
    }

    #[test]
    fn rejects_zero_window_and_quota() {
        let mut config = Config::default();
        config.admission.window_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.admission.max_requests = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_timeout() {
        let mut config = Config::default();
        config.timeouts.call_timeout_secs = 0.0;
        assert!(config.validate().is_err());
        config.timeouts.call_timeout_secs = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn write_attempts_allow_a_single_retry_at_most() {
        let mut config = Config::default();
        config.audit.write_attempts = 2;
        assert!(config.validate().is_ok());
        config.audit.write_attempts = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let settings = ProviderSettings::openai().with_api_key("   ");
        assert_eq!(settings.api_key(), None);
        let settings = ProviderSettings::openai().with_api_key("sk-test");
        assert_eq!(settings.api_key(), Some("sk-test"));
    }

    #[test]
    fn api_key_is_not_serialized() {
        let settings = ProviderSettings::anthropic().with_api_key("sk-ant-secret");
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("sk-ant-secret"));
    }

    #[test]
    fn provider_lookup_is_case_insensitive() {
        let config = Config::default();
        assert!(config.provider("OpenAI").is_some());
        assert!(config.provider("gemini").is_none());
    }
}
