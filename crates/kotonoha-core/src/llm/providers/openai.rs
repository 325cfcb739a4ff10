//! OpenAI provider implementation

use super::error_utils;
use super::provider_trait::ConversionProvider;
use super::types::ProviderError;
use crate::config::ProviderSettings;
use crate::llm::prompt::{CompletionIntent, CompletionRequest};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tracing::instrument;

const NAME: &str = "openai";

/// OpenAI Chat Completions adapter
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    settings: ProviderSettings,
    http_client: Client,
}

impl OpenAiProvider {
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
            "temperature": temperature,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.prompt }
            ],
        })
    }
}

/// Read `choices[0].message.content`
pub(crate) fn extract_text(response: &Value) -> Result<String, ProviderError> {
    let content = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| error_utils::shape_error(NAME, "choices[0]"))?
        .get("message")
        .and_then(|message| message.get("content"));

    match content {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        Some(Value::String(_)) | Some(Value::Null) => Err(ProviderError::EmptyCompletion {
            provider: NAME.to_string(),
        }),
        _ => Err(error_utils::shape_error(NAME, "choices[0].message.content")),
    }
}

#[async_trait]
impl ConversionProvider for OpenAiProvider {
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

        let url = format!("{}/chat/completions", self.settings.base_url());
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.request_body(request))
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
