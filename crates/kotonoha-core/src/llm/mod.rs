//! LLM provider dispatch
//!
//! Builds the register-specific prompt, resolves a provider from the
//! registry, bounds the call with a timeout and classifies failures.

mod classify;
mod dispatcher;
pub mod prompt;
pub mod providers;
mod register;
mod registry;

pub use classify::classify_provider_error;
pub use dispatcher::{ConversionOutcome, ConversionService, DispatchError, ProviderDispatcher};
pub use prompt::{CompletionIntent, CompletionRequest};
pub use providers::{AnthropicProvider, ConversionProvider, OpenAiProvider, ProviderError};
pub use register::TargetRegister;
pub use registry::{ProviderRegistry, ProviderSlot, ProviderStatus};
