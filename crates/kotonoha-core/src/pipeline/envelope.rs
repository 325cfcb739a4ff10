//! Uniform response envelope

use crate::llm::TargetRegister;
use serde::{Deserialize, Serialize};

/// `{success, data, error}` wrapper shared by every outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ErrorDetail>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: ErrorDetail) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub retry_after: Option<u64>,
}

/// Successful conversion payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionData {
    pub converted_text: String,
    pub original_text: String,
    pub target_register: TargetRegister,
    pub elapsed_ms: u64,
}

/// Where a request ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalState {
    Rejected,
    Denied,
    Succeeded,
    Failed,
    Internal,
}

/// Status, headers and body handed back to the routing layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineResponse {
    pub status_code: u16,
    pub headers: Vec<(String, String)>,
    pub body: ApiResponse<ConversionData>,
    pub terminal: TerminalState,
}

impl PipelineResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        self.body.success
    }

    pub fn error_code(&self) -> Option<&str> {
        self.body.error.as_ref().map(|e| e.code.as_str())
    }

    pub fn retry_after(&self) -> Option<u64> {
        self.body.error.as_ref().and_then(|e| e.retry_after)
    }
}
