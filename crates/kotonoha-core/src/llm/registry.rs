//! Provider registry built once at startup

use super::providers::{AnthropicProvider, ConversionProvider, OpenAiProvider};
use crate::config::{Config, KNOWN_PROVIDERS, ProviderSettings};
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registration state of one provider name
#[derive(Clone)]
pub enum ProviderSlot {
    Ready(Arc<dyn ConversionProvider>),
    /// Permanently unusable for the life of the process
    Unavailable { reason: String },
}

impl fmt::Debug for ProviderSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(provider) => f.debug_tuple("Ready").field(&provider.name()).finish(),
            Self::Unavailable { reason } => {
                f.debug_struct("Unavailable").field("reason", reason).finish()
            }
        }
    }
}

/// Availability of a provider, as reported by health checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    pub name: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Provider instances keyed by lowercase name
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    slots: HashMap<String, ProviderSlot>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build adapters for every known provider.
    ///
    /// Missing credentials or an HTTP client that fails to build mark the
    /// provider unavailable; construction itself never fails.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();

        let http_client = Client::builder()
            .connect_timeout(config.timeouts.connection_timeout())
            .timeout(config.timeouts.call_timeout())
            .build();

        let http_client = match http_client {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "failed to build HTTP client, all providers disabled");
                for name in KNOWN_PROVIDERS {
                    registry.mark_unavailable(name, format!("HTTP client unavailable: {}", e));
                }
                return registry;
            }
        };

        for name in KNOWN_PROVIDERS {
            let settings = config.provider(name).cloned().unwrap_or_else(|| match name {
                "openai" => ProviderSettings::openai(),
                _ => ProviderSettings::anthropic(),
            });

            if settings.api_key().is_none() {
                debug!(provider = name, "no API key configured");
                registry.mark_unavailable(
                    name,
                    format!("{} API key is not configured", display_name(name)),
                );
                continue;
            }

            let provider: Arc<dyn ConversionProvider> = match name {
                "openai" => Arc::new(OpenAiProvider::new(settings, http_client.clone())),
                _ => Arc::new(AnthropicProvider::new(settings, http_client.clone())),
            };
            debug!(provider = name, "provider registered");
            registry.register(provider);
        }

        registry
    }

    /// Register a ready provider under its own name
    pub fn register(&mut self, provider: Arc<dyn ConversionProvider>) {
        self.slots
            .insert(provider.name().to_string(), ProviderSlot::Ready(provider));
    }

    /// Register a provider name as permanently unavailable
    pub fn mark_unavailable(&mut self, name: &str, reason: impl Into<String>) {
        self.slots.insert(
            name.to_lowercase(),
            ProviderSlot::Unavailable {
                reason: reason.into(),
            },
        );
    }

    /// Resolve a provider by name; the error is a caller-safe reason
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn ConversionProvider>, String> {
        match self.slots.get(&name.trim().to_lowercase()) {
            Some(ProviderSlot::Ready(provider)) => Ok(Arc::clone(provider)),
            Some(ProviderSlot::Unavailable { reason }) => Err(reason.clone()),
            None => Err(format!("Unknown AI provider: {}", name)),
        }
    }

    pub fn is_available(&self, name: &str) -> bool {
        matches!(
            self.slots.get(&name.trim().to_lowercase()),
            Some(ProviderSlot::Ready(_))
        )
    }

    /// First available provider in preference order
    pub fn primary(&self) -> Option<&str> {
        if let Some(name) = KNOWN_PROVIDERS.into_iter().find(|name| self.is_available(name)) {
            return Some(name);
        }

        let mut others: Vec<&str> = self
            .slots
            .iter()
            .filter(|(_, slot)| matches!(slot, ProviderSlot::Ready(_)))
            .map(|(name, _)| name.as_str())
            .collect();
        others.sort_unstable();
        others.first().copied()
    }

    /// Status of every registered provider, known providers first
    pub fn statuses(&self) -> Vec<ProviderStatus> {
        let mut names: Vec<&String> = self.slots.keys().collect();
        names.sort_by_key(|name| {
            (
                KNOWN_PROVIDERS
                    .iter()
                    .position(|known| *known == name.as_str())
                    .unwrap_or(KNOWN_PROVIDERS.len()),
                name.to_string(),
            )
        });

        names
            .into_iter()
            .map(|name| match &self.slots[name] {
                ProviderSlot::Ready(_) => ProviderStatus {
                    name: name.clone(),
                    available: true,
                    reason: None,
                },
                ProviderSlot::Unavailable { reason } => ProviderStatus {
                    name: name.clone(),
                    available: false,
                    reason: Some(reason.clone()),
                },
            })
            .collect()
    }
}

fn display_name(name: &str) -> &str {
    match name {
        "anthropic" => "Anthropic",
        "openai" => "OpenAI",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_keys(anthropic: Option<&str>, openai: Option<&str>) -> Config {
        let mut config = Config::default();
        let mut a = ProviderSettings::anthropic();
        a.api_key = anthropic.map(str::to_string);
        let mut o = ProviderSettings::openai();
        o.api_key = openai.map(str::to_string);
        config.providers.insert("anthropic".into(), a);
        config.providers.insert("openai".into(), o);
        config
    }

    #[test]
    fn unconfigured_providers_are_unavailable_with_reason() {
        let registry = ProviderRegistry::from_config(&config_with_keys(None, Some("sk-test")));

        assert!(!registry.is_available("anthropic"));
        assert!(registry.is_available("OpenAI"));
        assert_eq!(
            registry.resolve("anthropic").err().as_deref(),
            Some("Anthropic API key is not configured")
        );
        assert_eq!(registry.primary(), Some("openai"));
    }

    #[test]
    fn unknown_names_are_reported() {
        let registry = ProviderRegistry::from_config(&config_with_keys(Some("k"), Some("k")));
        assert_eq!(
            registry.resolve("gemini").err().as_deref(),
            Some("Unknown AI provider: gemini")
        );
        assert_eq!(registry.primary(), Some("anthropic"));
    }

    #[test]
    fn no_keys_means_no_primary() {
        let registry = ProviderRegistry::from_config(&config_with_keys(None, Some("  ")));
        assert_eq!(registry.primary(), None);

        let statuses = registry.statuses();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].name, "anthropic");
        assert_eq!(statuses[1].name, "openai");
        assert!(statuses.iter().all(|s| !s.available && s.reason.is_some()));
    }
}
