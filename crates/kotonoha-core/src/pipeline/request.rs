//! Request validation boundary

use crate::llm::TargetRegister;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const INPUT_TEXT_MIN_CHARS: usize = 2;
pub const INPUT_TEXT_MAX_CHARS: usize = 500;

const INPUT_TEXT_REQUIRED: &str = "入力文字列は必須です";
const INPUT_TEXT_EMPTY: &str = "入力文字列が空です";
const INPUT_TEXT_TOO_SHORT: &str = "入力文字列は2文字以上にしてください";
const INPUT_TEXT_TOO_LONG: &str = "入力文字列は500文字以下にしてください";
const PREVIOUS_RESULT_REQUIRED: &str = "前回の変換結果は必須です";
const PREVIOUS_RESULT_EMPTY: &str = "前回の変換結果が空です";
const REGISTER_INVALID: &str = "丁寧さレベルは casual, normal, polite のいずれかを指定してください";

/// Rejected request field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        "VALIDATION_ERROR"
    }

    pub fn status_code(&self) -> u16 {
        422
    }

    pub fn user_message(&self) -> &str {
        &self.message
    }
}

/// Untrusted request shape as it arrives from a routing layer
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawConversionRequest {
    #[serde(default)]
    pub input_text: Option<String>,
    #[serde(default)]
    pub target_register: Option<String>,
    #[serde(default)]
    pub previous_result: Option<String>,
}

impl RawConversionRequest {
    pub fn validate(&self) -> Result<ConversionRequest, ValidationError> {
        let input_text = validate_input_text(self.input_text.as_deref())?;
        let target_register = self
            .target_register
            .as_deref()
            .ok_or_else(|| ValidationError::new("target_register", REGISTER_INVALID))?
            .parse::<TargetRegister>()
            .map_err(|_| ValidationError::new("target_register", REGISTER_INVALID))?;
        let previous_result = self
            .previous_result
            .as_deref()
            .map(|previous| validate_previous_result(Some(previous)))
            .transpose()?;

        Ok(ConversionRequest {
            input_text,
            target_register,
            previous_result,
            provider: None,
        })
    }
}

/// A request that passed validation; text fields are trimmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    input_text: String,
    target_register: TargetRegister,
    previous_result: Option<String>,
    provider: Option<String>,
}

impl ConversionRequest {
    pub fn new(input_text: &str, target_register: TargetRegister) -> Result<Self, ValidationError> {
        Ok(Self {
            input_text: validate_input_text(Some(input_text))?,
            target_register,
            previous_result: None,
            provider: None,
        })
    }

    pub fn regeneration(
        input_text: &str,
        target_register: TargetRegister,
        previous_result: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            input_text: validate_input_text(Some(input_text))?,
            target_register,
            previous_result: Some(validate_previous_result(Some(previous_result))?),
            provider: None,
        })
    }

    /// Pin the request to a named provider instead of the configured default
    pub fn with_provider(mut self, provider: Option<String>) -> Self {
        self.provider = provider;
        self
    }

    pub fn input_text(&self) -> &str {
        &self.input_text
    }

    pub fn target_register(&self) -> TargetRegister {
        self.target_register
    }

    pub fn previous_result(&self) -> Option<&str> {
        self.previous_result.as_deref()
    }

    pub fn provider(&self) -> Option<&str> {
        self.provider.as_deref()
    }

    /// Error returned when a regeneration arrives without a previous result
    pub(crate) fn missing_previous_result() -> ValidationError {
        ValidationError::new("previous_result", PREVIOUS_RESULT_REQUIRED)
    }
}

fn validate_input_text(value: Option<&str>) -> Result<String, ValidationError> {
    let value = value.ok_or_else(|| ValidationError::new("input_text", INPUT_TEXT_REQUIRED))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("input_text", INPUT_TEXT_EMPTY));
    }

    let chars = trimmed.chars().count();
    if chars < INPUT_TEXT_MIN_CHARS {
        return Err(ValidationError::new("input_text", INPUT_TEXT_TOO_SHORT));
    }
    if chars > INPUT_TEXT_MAX_CHARS {
        return Err(ValidationError::new("input_text", INPUT_TEXT_TOO_LONG));
    }
    Ok(trimmed.to_string())
}

fn validate_previous_result(value: Option<&str>) -> Result<String, ValidationError> {
    let value =
        value.ok_or_else(|| ValidationError::new("previous_result", PREVIOUS_RESULT_REQUIRED))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new("previous_result", PREVIOUS_RESULT_EMPTY));
    }
    Ok(trimmed.to_string())
}
