//! Admission, dispatch and audit for one conversion request

use super::envelope::{ApiResponse, ConversionData, PipelineResponse, TerminalState};
use super::error::PipelineError;
use super::request::{ConversionRequest, RawConversionRequest, ValidationError};
use crate::admission::{AdmissionController, ClientKey, RateLimitDecision};
use crate::audit::{AuditLogger, AuditRecord};
use crate::error::FailureKind;
use crate::llm::{ConversionOutcome, ConversionService};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

const UNRESOLVED_PROVIDER: &str = "unknown";

#[derive(Debug, Clone)]
enum Operation {
    Convert,
    Regenerate { previous_result: String },
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Self::Convert => "convert",
            Self::Regenerate { .. } => "regenerate",
        }
    }
}

/// Runs requests through admission, provider dispatch and the audit trail
#[derive(Clone)]
pub struct ConversionPipeline {
    admission: AdmissionController,
    converter: Arc<dyn ConversionService>,
    audit: AuditLogger,
}

impl std::fmt::Debug for ConversionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionPipeline")
            .field("admission", &self.admission)
            .field("audit", &self.audit)
            .finish_non_exhaustive()
    }
}

impl ConversionPipeline {
    pub fn new(
        admission: AdmissionController,
        converter: Arc<dyn ConversionService>,
        audit: AuditLogger,
    ) -> Self {
        Self {
            admission,
            converter,
            audit,
        }
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Validate an untrusted conversion request, then run it
    pub async fn convert_raw(&self, client: &ClientKey, raw: &RawConversionRequest) -> PipelineResponse {
        match raw.validate() {
            Ok(request) => self.convert(client, request).await,
            Err(e) => Self::reject(e),
        }
    }

    /// Validate an untrusted regeneration request, then run it
    pub async fn regenerate_raw(
        &self,
        client: &ClientKey,
        raw: &RawConversionRequest,
    ) -> PipelineResponse {
        match raw.validate() {
            Ok(request) => self.regenerate(client, request).await,
            Err(e) => Self::reject(e),
        }
    }

    pub async fn convert(&self, client: &ClientKey, request: ConversionRequest) -> PipelineResponse {
        self.run(client, request, Operation::Convert).await
    }

    /// Like [`convert`](Self::convert), with the previous result passed as a
    /// hint to produce a different phrasing
    pub async fn regenerate(&self, client: &ClientKey, request: ConversionRequest) -> PipelineResponse {
        let Some(previous_result) = request.previous_result().map(str::to_string) else {
            return Self::reject(ConversionRequest::missing_previous_result());
        };
        self.run(client, request, Operation::Regenerate { previous_result })
            .await
    }

    /// 422 response for a request that never reached admission
    pub fn reject(err: ValidationError) -> PipelineResponse {
        debug!(field = err.field, "request rejected at validation");
        let err = PipelineError::from(err);
        PipelineResponse {
            status_code: err.status_code(),
            headers: Vec::new(),
            body: ApiResponse::err(err.to_detail(None)),
            terminal: TerminalState::Rejected,
        }
    }

    #[instrument(
        skip(self, client, request, operation),
        fields(client = %client, op = operation.name(), register = %request.target_register())
    )]
    async fn run(
        &self,
        client: &ClientKey,
        request: ConversionRequest,
        operation: Operation,
    ) -> PipelineResponse {
        debug!(state = "received", "conversion request received");
        let decision = self.admission.check(client);
        let mut headers = rate_limit_headers(&decision);

        if !decision.allowed {
            let retry_after = decision.retry_after_seconds.unwrap_or(1);
            info!(state = "denied", retry_after, "admission denied");
            headers.push(("Retry-After".to_string(), retry_after.to_string()));
            let err = PipelineError::AdmissionDenied { retry_after };
            return PipelineResponse {
                status_code: err.status_code(),
                headers,
                body: ApiResponse::err(err.to_detail(Some(retry_after))),
                terminal: TerminalState::Denied,
            };
        }

        let correlation_id = Uuid::new_v4();
        headers.push(("X-Request-Id".to_string(), correlation_id.to_string()));
        debug!(state = "admitted", %correlation_id, remaining = decision.remaining, "admitted");

        // Dispatch and audit run detached so the audit write survives a
        // caller that stops polling this future.
        let task = tokio::spawn(attempt(
            self.converter.clone(),
            self.audit.clone(),
            request.clone(),
            operation,
            correlation_id,
        ));
        let result = task.await.unwrap_or_else(|e| {
            error!(%correlation_id, error = %e, "conversion task ended abnormally");
            Err(PipelineError::InternalUnexpected(e.to_string()))
        });

        match result {
            Ok(outcome) => {
                info!(
                    state = "succeeded",
                    %correlation_id,
                    provider = %outcome.provider_used,
                    elapsed_ms = outcome.elapsed_ms,
                    "conversion succeeded"
                );
                PipelineResponse {
                    status_code: 200,
                    headers,
                    body: ApiResponse::ok(ConversionData {
                        converted_text: outcome.converted_text,
                        original_text: request.input_text().to_string(),
                        target_register: request.target_register(),
                        elapsed_ms: outcome.elapsed_ms,
                    }),
                    terminal: TerminalState::Succeeded,
                }
            }
            Err(err) => {
                let retry_after = match &err {
                    PipelineError::Dispatch(e) if e.kind == FailureKind::RateLimited => {
                        Some(self.provider_retry_after(e.retry_after_seconds))
                    }
                    _ => None,
                };
                if let Some(seconds) = retry_after {
                    headers.push(("Retry-After".to_string(), seconds.to_string()));
                }
                let terminal = match err {
                    PipelineError::InternalUnexpected(_) => TerminalState::Internal,
                    _ => TerminalState::Failed,
                };
                warn!(state = "failed", %correlation_id, code = err.error_code(), "conversion failed");
                PipelineResponse {
                    status_code: err.status_code(),
                    headers,
                    body: ApiResponse::err(err.to_detail(retry_after)),
                    terminal,
                }
            }
        }
    }

    /// Provider hint, or the admission window, clamped to [1, W]
    fn provider_retry_after(&self, hint: Option<u64>) -> u64 {
        let window = self.admission.window().as_secs_f64().ceil().max(1.0) as u64;
        hint.unwrap_or(window).clamp(1, window)
    }
}

async fn attempt(
    converter: Arc<dyn ConversionService>,
    audit: AuditLogger,
    request: ConversionRequest,
    operation: Operation,
    correlation_id: Uuid,
) -> Result<ConversionOutcome, PipelineError> {
    debug!(state = "dispatching", %correlation_id, "dispatching to provider");
    let started = Instant::now();

    let call = {
        let request = request.clone();
        tokio::spawn(async move {
            let text = request.input_text();
            let register = request.target_register();
            match &operation {
                Operation::Convert => converter.convert(text, register, request.provider()).await,
                Operation::Regenerate { previous_result } => {
                    converter
                        .regenerate(text, register, previous_result, request.provider())
                        .await
                }
            }
        })
    };

    let result = match call.await {
        Ok(Ok(outcome)) => Ok(outcome),
        Ok(Err(e)) => Err(PipelineError::Dispatch(e)),
        Err(e) => {
            error!(%correlation_id, error = %e, "provider dispatch panicked");
            Err(PipelineError::InternalUnexpected(e.to_string()))
        }
    };

    let record = match &result {
        Ok(outcome) => AuditRecord::success(
            correlation_id,
            request.input_text(),
            &outcome.converted_text,
            request.target_register(),
            &outcome.provider_used,
            outcome.elapsed_ms,
        ),
        Err(err) => {
            let (provider, elapsed_ms) = match err {
                PipelineError::Dispatch(e) => (e.provider.as_str(), e.elapsed_ms),
                _ => (
                    request.provider().unwrap_or(UNRESOLVED_PROVIDER),
                    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                ),
            };
            AuditRecord::failure(
                correlation_id,
                request.input_text(),
                request.target_register(),
                provider,
                elapsed_ms,
                err.audit_reason().unwrap_or("internal"),
            )
        }
    };
    audit.record(record).await;

    result
}

fn rate_limit_headers(decision: &RateLimitDecision) -> Vec<(String, String)> {
    vec![
        ("X-RateLimit-Limit".to_string(), decision.limit.to_string()),
        ("X-RateLimit-Remaining".to_string(), decision.remaining.to_string()),
        ("X-RateLimit-Reset".to_string(), decision.reset_after_seconds.to_string()),
    ]
}
