//! Provider adapters
//!
//! Each adapter speaks one vendor's HTTP API and reports failures as
//! [`ProviderError`]; classification happens in the dispatcher.

pub mod anthropic;
pub mod error_utils;
pub mod openai;
mod provider_trait;
mod types;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use provider_trait::ConversionProvider;
#[cfg(test)]
pub use provider_trait::MockConversionProvider;
pub use types::ProviderError;

#[cfg(test)]
mod tests;
