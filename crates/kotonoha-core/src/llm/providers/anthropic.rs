//! Anthropic provider implementation

use super::error_utils;
use super::provider_trait::ConversionProvider;
use super::types::ProviderError;
use crate::config::ProviderSettings;
use crate::llm::prompt::{CompletionIntent, CompletionRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::instrument;

const NAME: &str = "anthropic";

/// Anthropic Messages API adapter
#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    settings: ProviderSettings,
    http_client: Client,
}

impl AnthropicProvider {
    pub fn new(settings: ProviderSettings, http_client: Client) -> Self {
        Self {
            settings,
            http_client,
        }
    }

    fn request_body(&self, request: &CompletionRequest) -> Value {
        let temperature = match request.intent {
            CompletionIntent::Convert => self.settings.temperature,
            CompletionIntent::Regenerate => self.settings.regenerate_temperature,
        };

        json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "system": request.system,
            "temperature": temperature,
            "messages": [
                { "role": "user", "content": request.prompt }
            ],
        })
    }
}

/// Pull the first text block out of a Messages API response
pub(crate) fn extract_text(response: &Value) -> Result<String, ProviderError> {
    let blocks = response
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| error_utils::shape_error(NAME, "content array"))?;

    let text = blocks
        .iter()
        .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .and_then(|block| block.get("text"))
        .and_then(Value::as_str)
        .ok_or_else(|| error_utils::shape_error(NAME, "text content block"))?
        .trim();

    if text.is_empty() {
        return Err(ProviderError::EmptyCompletion {
            provider: NAME.to_string(),
        });
    }
    Ok(text.to_string())
}

#[async_trait]
impl ConversionProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        NAME
    }

    #[instrument(skip(self, request), fields(model = %self.settings.model), level = "debug")]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let api_key = self
            .settings
            .api_key()
            .ok_or_else(|| ProviderError::NotConfigured {
                provider: NAME.to_string(),
            })?;

        let url = format!("{}/v1/messages", self.settings.base_url());
        let mut http_request = self
            .http_client
            .post(&url)
            .header("x-api-key", api_key)
            .json(&self.request_body(request));

        if let Some(version) = &self.settings.api_version {
            http_request = http_request.header("anthropic-version", version);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| error_utils::transport_error(e, NAME))?;

        if !response.status().is_success() {
            return Err(error_utils::http_error(response, NAME).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| error_utils::parse_error(e, NAME))?;

        extract_text(&body)
    }
}
