//! Audit record shape

use super::fingerprint::fingerprint;
use crate::llm::TargetRegister;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Privacy-preserving description of one admitted conversion attempt.
///
/// Built only through [`AuditRecord::success`] / [`AuditRecord::failure`],
/// which fingerprint the input; raw text never enters the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    input_fingerprint: String,
    input_length: usize,
    output_length: usize,
    register: TargetRegister,
    elapsed_ms: u64,
    provider: String,
    success: bool,
    failure_reason: Option<String>,
    correlation_id: Uuid,
    created_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Record for a successful conversion of `input` (already trimmed)
    pub fn success(
        correlation_id: Uuid,
        input: &str,
        output: &str,
        register: TargetRegister,
        provider: &str,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            input_fingerprint: fingerprint(input),
            input_length: input.chars().count(),
            output_length: output.chars().count(),
            register,
            elapsed_ms,
            provider: provider.to_string(),
            success: true,
            failure_reason: None,
            correlation_id,
            created_at: Utc::now(),
        }
    }

    /// Record for a failed attempt; output length is always zero
    pub fn failure(
        correlation_id: Uuid,
        input: &str,
        register: TargetRegister,
        provider: &str,
        elapsed_ms: u64,
        reason: &str,
    ) -> Self {
        Self {
            input_fingerprint: fingerprint(input),
            input_length: input.chars().count(),
            output_length: 0,
            register,
            elapsed_ms,
            provider: provider.to_string(),
            success: false,
            failure_reason: Some(reason.to_string()),
            correlation_id,
            created_at: Utc::now(),
        }
    }

    pub fn input_fingerprint(&self) -> &str {
        &self.input_fingerprint
    }

    pub fn input_length(&self) -> usize {
        self.input_length
    }

    pub fn output_length(&self) -> usize {
        self.output_length
    }

    pub fn register(&self) -> TargetRegister {
        self.register
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_record_counts_characters_not_bytes() {
        let id = Uuid::new_v4();
        let record = AuditRecord::success(
            id,
            "水 ぬるく",
            "お水をぬるめでお願いします",
            TargetRegister::Normal,
            "anthropic",
            1500,
        );

        assert_eq!(record.input_length(), 5);
        assert_eq!(record.output_length(), 13);
        assert_eq!(record.input_fingerprint(), fingerprint("水 ぬるく"));
        assert_ne!(record.input_fingerprint(), "水 ぬるく");
        assert!(record.is_success());
        assert_eq!(record.failure_reason(), None);
        assert_eq!(record.correlation_id(), id);
    }

    #[test]
    fn failure_record_has_no_output() {
        let record = AuditRecord::failure(
            Uuid::new_v4(),
            "水 ぬるく",
            TargetRegister::Casual,
            "openai",
            30_000,
            "timeout",
        );
        assert_eq!(record.output_length(), 0);
        assert!(!record.is_success());
        assert_eq!(record.failure_reason(), Some("timeout"));
    }

    #[test]
    fn serialized_record_never_contains_raw_text() {
        let record = AuditRecord::success(
            Uuid::new_v4(),
            "秘密の入力文",
            "秘密の出力文です",
            TargetRegister::Polite,
            "anthropic",
            12,
        );
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("秘密"));
        assert!(json.contains("\"register\":\"polite\""));
    }
}
