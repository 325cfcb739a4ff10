//! Service health report

use crate::llm::{ProviderRegistry, ProviderStatus};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    /// First usable provider in preference order, or "none"
    pub ai_provider: String,
    pub providers: Vec<ProviderStatus>,
    pub version: &'static str,
    pub timestamp: String,
}

impl HealthReport {
    pub fn from_registry(registry: &ProviderRegistry) -> Self {
        Self {
            status: "ok",
            ai_provider: registry
                .primary()
                .map(str::to_string)
                .unwrap_or_else(|| "none".to_string()),
            providers: registry.statuses(),
            version: env!("CARGO_PKG_VERSION"),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    pub fn has_usable_provider(&self) -> bool {
        self.providers.iter().any(|p| p.available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn no_keys_reports_none() {
        let registry = ProviderRegistry::from_config(&Config::default());
        let report = HealthReport::from_registry(&registry);

        assert_eq!(report.status, "ok");
        assert_eq!(report.ai_provider, "none");
        assert!(!report.has_usable_provider());
        assert_eq!(report.providers.len(), 2);
        assert!(report.timestamp.ends_with('Z'));
    }

    #[test]
    fn openai_only_is_reported() {
        let mut config = Config::default();
        if let Some(openai) = config.providers.get_mut("openai") {
            openai.api_key = Some("sk-test".to_string());
        }
        let report = HealthReport::from_registry(&ProviderRegistry::from_config(&config));
        assert_eq!(report.ai_provider, "openai");
        assert!(report.has_usable_provider());
    }
}
