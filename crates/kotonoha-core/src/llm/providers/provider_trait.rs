//! Provider trait definition

use super::types::ProviderError;
use crate::llm::prompt::CompletionRequest;
use async_trait::async_trait;

/// An upstream LLM service able to turn a prompt into text
///
/// Implementations hold only immutable configuration and a shareable HTTP
/// client; every call receives its own request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConversionProvider: Send + Sync {
    /// Lowercase provider name
    fn name(&self) -> &'static str;

    /// Run one completion and return the trimmed reply text
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}
