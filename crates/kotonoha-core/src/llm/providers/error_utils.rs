//! Provider error construction and sanitization helpers.

use super::types::ProviderError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

const MAX_ERROR_TEXT_CHARS: usize = 512;
const REDACTED: &str = "[REDACTED]";

static BEARER_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bBearer\s+[A-Za-z0-9._\-+/=]{8,}").expect("valid bearer token regex")
});

static SECRET_ASSIGNMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(api[_-]?key|x-api-key|access[_-]?token|token|secret|password|authorization)\b\s*[:=]\s*["']?[^"',\s}]+"#,
    )
    .expect("valid secret assignment regex")
});

static PROVIDER_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bsk-[A-Za-z0-9_\-]{8,}").expect("valid provider key regex"));

/// Redact credentials from provider error text and cap its length.
pub fn sanitize_provider_error_text(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return "<empty error response body>".to_string();
    }

    let redacted = match serde_json::from_str::<Value>(trimmed) {
        Ok(mut json) => {
            redact_json(&mut json);
            serde_json::to_string(&json).unwrap_or_else(|_| "<unserializable error>".to_string())
        }
        Err(_) => redact_text(trimmed),
    };

    truncate(redacted)
}

fn redact_json(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if is_secret_key(key) {
                    *val = Value::String(REDACTED.to_string());
                } else {
                    redact_json(val);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact_json),
        Value::String(text) => *text = redact_text(text),
        _ => {}
    }
}

fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase().replace(['-', ' '], "_");
    ["api_key", "token", "secret", "password", "authorization", "cookie"]
        .iter()
        .any(|marker| key.contains(marker))
}

fn redact_text(input: &str) -> String {
    let text = BEARER_TOKEN_RE.replace_all(input, "Bearer [REDACTED]");
    let text = SECRET_ASSIGNMENT_RE.replace_all(&text, "$1=[REDACTED]");
    PROVIDER_KEY_RE.replace_all(&text, REDACTED).into_owned()
}

fn truncate(input: String) -> String {
    let char_count = input.chars().count();
    if char_count <= MAX_ERROR_TEXT_CHARS {
        return input;
    }
    let kept: String = input.chars().take(MAX_ERROR_TEXT_CHARS).collect();
    format!("{}... [truncated {} chars]", kept, char_count - MAX_ERROR_TEXT_CHARS)
}

/// Parse a `Retry-After` header given in whole seconds.
///
/// HTTP-date values are ignored.
pub fn parse_retry_after(value: Option<&str>) -> Option<u64> {
    value
        .map(str::trim)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| secs.ceil() as u64)
}

/// Build a ProviderError from a non-success HTTP response.
pub async fn http_error(response: reqwest::Response, provider: &str) -> ProviderError {
    let status = response.status().as_u16();
    let retry_after = parse_retry_after(
        response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok()),
    );
    let body = response.text().await.unwrap_or_default();

    ProviderError::Http {
        provider: provider.to_string(),
        status,
        body: sanitize_provider_error_text(&body),
        retry_after,
    }
}

/// Build a ProviderError from a failed send.
pub fn transport_error(err: reqwest::Error, provider: &str) -> ProviderError {
    ProviderError::Transport {
        provider: provider.to_string(),
        message: sanitize_provider_error_text(&err.to_string()),
        timed_out: err.is_timeout(),
        connect: err.is_connect(),
    }
}

/// Build a ProviderError from a body that was not valid JSON.
pub fn parse_error(err: reqwest::Error, provider: &str) -> ProviderError {
    if err.is_timeout() {
        return transport_error(err, provider);
    }
    ProviderError::MalformedResponse {
        provider: provider.to_string(),
        message: sanitize_provider_error_text(&err.to_string()),
    }
}

/// Report a response whose JSON did not have the expected shape.
pub fn shape_error(provider: &str, missing: &str) -> ProviderError {
    ProviderError::MalformedResponse {
        provider: provider.to_string(),
        message: format!("missing {}", missing),
    }
}
