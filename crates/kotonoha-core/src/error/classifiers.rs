//! Text-based failure classification

use super::failure::FailureKind;

/// `code` appears in `text` as a standalone number, not inside an id or a
/// longer number
fn contains_status_code(text: &str, code: &str) -> bool {
    text.match_indices(code).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + code.len()..].chars().next();
        !before.is_some_and(|c| c.is_alphanumeric() || c == '_')
            && !after.is_some_and(|c| c.is_alphanumeric() || c == '_')
    })
}

/// Classify free-form provider error text.
///
/// Used when nothing structured (status code, transport flags) is available.
/// Unclassifiable text is a `ConversionFailed`.
pub fn classify_error_text(text: &str) -> FailureKind {
    let lower = text.to_lowercase();

    if lower.contains("timeout") || lower.contains("timed out") {
        FailureKind::Timeout
    } else if contains_status_code(&lower, "429")
        || lower.contains("rate limit")
        || lower.contains("rate_limit")
        || lower.contains("ratelimit")
        || lower.contains("too many requests")
    {
        FailureKind::RateLimited
    } else if contains_status_code(&lower, "401")
        || contains_status_code(&lower, "403")
        || lower.contains("unauthorized")
        || lower.contains("forbidden")
        || lower.contains("invalid api key")
        || lower.contains("authentication")
        || lower.contains("not configured")
        || lower.contains("connection refused")
        || lower.contains("dns error")
        || lower.contains("error trying to connect")
    {
        FailureKind::ProviderUnavailable
    } else {
        FailureKind::ConversionFailed
    }
}
