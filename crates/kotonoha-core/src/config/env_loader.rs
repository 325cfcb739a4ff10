//! Environment variable-based configuration loading

use super::model::{Config, LogFormat, ProviderSettings};
use crate::error::{KotonohaError, KotonohaResult};
use std::path::PathBuf;
use std::str::FromStr;

/// Load configuration from the process environment
///
/// Provider credentials come from `ANTHROPIC_*` / `OPENAI_*`; everything else
/// uses the `KOTONOHA_` prefix, with the legacy `AI_API_TIMEOUT` and
/// `DEFAULT_AI_PROVIDER` names still honoured.
pub fn load_from_env() -> KotonohaResult<Config> {
    load_from_lookup(|key| std::env::var(key).ok())
}

/// Load configuration through an arbitrary variable lookup
pub fn load_from_lookup<F>(lookup: F) -> KotonohaResult<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
    let mut config = Config::default();

    if let Some(provider) = get("KOTONOHA_DEFAULT_PROVIDER").or_else(|| get("DEFAULT_AI_PROVIDER")) {
        config.default_provider = provider.trim().to_lowercase();
    }

    load_provider(&mut config, ProviderSettings::anthropic(), "ANTHROPIC", &get)?;
    load_provider(&mut config, ProviderSettings::openai(), "OPENAI", &get)?;

    if let Some(value) = get("AI_API_TIMEOUT") {
        config.timeouts.call_timeout_secs = parse_var("AI_API_TIMEOUT", &value)?;
    }
    if let Some(value) = get("KOTONOHA_CONNECT_TIMEOUT") {
        config.timeouts.connection_timeout_secs = parse_var("KOTONOHA_CONNECT_TIMEOUT", &value)?;
    }

    if let Some(value) = get("KOTONOHA_RATE_LIMIT_MAX") {
        config.admission.max_requests = parse_var("KOTONOHA_RATE_LIMIT_MAX", &value)?;
    }
    if let Some(value) = get("KOTONOHA_RATE_LIMIT_WINDOW_SECS") {
        config.admission.window_secs = parse_var("KOTONOHA_RATE_LIMIT_WINDOW_SECS", &value)?;
    }

    if let Some(path) = get("KOTONOHA_AUDIT_LOG_PATH") {
        config.audit.log_path = Some(PathBuf::from(path.trim()));
    }
    if let Some(value) = get("KOTONOHA_AUDIT_QUEUE_CAPACITY") {
        config.audit.queue_capacity = parse_var("KOTONOHA_AUDIT_QUEUE_CAPACITY", &value)?;
    }
    if let Some(value) = get("KOTONOHA_AUDIT_WRITE_ATTEMPTS") {
        config.audit.write_attempts = parse_var("KOTONOHA_AUDIT_WRITE_ATTEMPTS", &value)?;
    }
    if let Some(value) = get("KOTONOHA_AUDIT_ENQUEUE_WAIT_MS") {
        config.audit.enqueue_wait_ms = parse_var("KOTONOHA_AUDIT_ENQUEUE_WAIT_MS", &value)?;
    }

    if let Some(level) = get("LOG_LEVEL") {
        config.logging.level = level.trim().to_lowercase();
    }
    if let Some(format) = get("KOTONOHA_LOG_FORMAT") {
        config.logging.format = LogFormat::from_str(&format)?;
    }

    config.validate()?;
    Ok(config)
}

fn load_provider<G>(
    config: &mut Config,
    mut settings: ProviderSettings,
    env_prefix: &str,
    get: &G,
) -> KotonohaResult<()>
where
    G: Fn(&str) -> Option<String>,
{
    let var = |suffix: &str| format!("{}_{}", env_prefix, suffix);

    if let Some(api_key) = get(var("API_KEY").as_str()) {
        settings.api_key = Some(api_key.trim().to_string());
    }
    if let Some(model) = get(var("MODEL").as_str()) {
        settings.model = model.trim().to_string();
    }
    if let Some(base_url) = get(var("BASE_URL").as_str()) {
        settings.base_url = base_url.trim().to_string();
    }

    let key = var("MAX_TOKENS");
    if let Some(value) = get(key.as_str()) {
        settings.max_tokens = parse_var(&key, &value)?;
    }

    let key = var("TEMPERATURE");
    if let Some(value) = get(key.as_str()) {
        settings.temperature = parse_var(&key, &value)?;
    }

    config.providers.insert(settings.name.clone(), settings);
    Ok(())
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> KotonohaResult<T> {
    value.trim().parse().map_err(|_| {
        KotonohaError::config_with_context(
            format!("Invalid {} value", name),
            format!("Parsing '{}'", value.trim()),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::time::Duration;

    fn load(vars: &[(&str, &str)]) -> KotonohaResult<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        load_from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.default_provider, "anthropic");
        assert_eq!(config.timeouts.call_timeout(), Duration::from_secs(30));
        assert!(config.provider("anthropic").unwrap().api_key().is_none());
        assert!(config.provider("openai").unwrap().api_key().is_none());
        assert!(config.audit.log_path.is_none());
    }

    #[test]
    fn reads_provider_credentials_and_models() {
        let config = load(&[
            ("ANTHROPIC_API_KEY", "sk-ant-test"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("DEFAULT_AI_PROVIDER", "OpenAI"),
        ])
        .unwrap();

        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.provider("anthropic").unwrap().api_key(), Some("sk-ant-test"));
        assert_eq!(config.provider("openai").unwrap().model, "gpt-4o");
    }

    #[test]
    fn prefixed_default_provider_wins_over_legacy_name() {
        let config = load(&[
            ("KOTONOHA_DEFAULT_PROVIDER", "anthropic"),
            ("DEFAULT_AI_PROVIDER", "openai"),
        ])
        .unwrap();
        assert_eq!(config.default_provider, "anthropic");
    }

    #[test]
    fn accepts_fractional_timeout() {
        let config = load(&[("AI_API_TIMEOUT", "2.5")]).unwrap();
        assert_eq!(config.timeouts.call_timeout(), Duration::from_millis(2500));
    }

    #[test]
    fn malformed_numbers_name_the_variable() {
        let err = load(&[("KOTONOHA_RATE_LIMIT_MAX", "many")]).unwrap_err();
        assert!(err.to_string().contains("KOTONOHA_RATE_LIMIT_MAX"));
    }

    #[test]
    fn invalid_values_fail_validation() {
        assert!(load(&[("KOTONOHA_RATE_LIMIT_WINDOW_SECS", "0")]).is_err());
        assert!(load(&[("KOTONOHA_AUDIT_WRITE_ATTEMPTS", "5")]).is_err());
        assert!(load(&[("KOTONOHA_LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn admission_and_audit_overrides() {
        let config = load(&[
            ("KOTONOHA_RATE_LIMIT_MAX", "3"),
            ("KOTONOHA_RATE_LIMIT_WINDOW_SECS", "60"),
            ("KOTONOHA_AUDIT_LOG_PATH", "/tmp/audit.jsonl"),
            ("KOTONOHA_LOG_FORMAT", "json"),
        ])
        .unwrap();

        assert_eq!(config.admission.max_requests, 3);
        assert_eq!(config.admission.window_secs, 60);
        assert_eq!(config.audit.log_path, Some(PathBuf::from("/tmp/audit.jsonl")));
        assert_eq!(config.logging.format, LogFormat::Json);
    }
}
