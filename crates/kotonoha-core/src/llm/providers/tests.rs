use super::*;
use crate::config::ProviderSettings;
use crate::error::FailureKind;
use crate::llm::classify_provider_error;
use crate::llm::prompt::CompletionRequest;
use crate::llm::register::TargetRegister;
use reqwest::Client;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One-shot HTTP stub; resolves to the raw request it received.
async fn stub_server(status: u16, extra_headers: &str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let extra_headers = extra_headers.to_string();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&raw).to_string();
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if raw.len() >= header_end + 4 + content_length {
                    break;
                }
            }
        }

        let response = format!(
            "HTTP/1.1 {} STUB\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n{}\r\n{}",
            status,
            body.len(),
            extra_headers,
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&raw).to_string()
    });

    (base_url, handle)
}

fn request_json(raw: &str) -> Value {
    let (_, body) = raw.split_once("\r\n\r\n").unwrap();
    serde_json::from_str(body).unwrap()
}

fn anthropic(base_url: &str) -> AnthropicProvider {
    let settings = ProviderSettings::anthropic()
        .with_api_key("test-anthropic-key")
        .with_base_url(base_url);
    AnthropicProvider::new(settings, Client::new())
}

fn openai(base_url: &str) -> OpenAiProvider {
    let settings = ProviderSettings::openai()
        .with_api_key("sk-test-openai-key")
        .with_base_url(format!("{}/", base_url));
    OpenAiProvider::new(settings, Client::new())
}

#[tokio::test]
async fn anthropic_sends_messages_request_and_trims_reply() {
    let reply = json!({
        "content": [{ "type": "text", "text": "  お水をぬるめでお願いします\n" }]
    });
    let (base_url, server) = stub_server(200, "", reply.to_string()).await;

    let request = CompletionRequest::conversion("水 ぬるく", TargetRegister::Normal);
    let text = anthropic(&base_url).complete(&request).await.unwrap();
    assert_eq!(text, "お水をぬるめでお願いします");

    let raw = server.await.unwrap();
    let lower = raw.to_lowercase();
    assert!(raw.starts_with("POST /v1/messages "));
    assert!(lower.contains("x-api-key: test-anthropic-key"));
    assert!(lower.contains("anthropic-version: 2023-06-01"));

    let body = request_json(&raw);
    assert_eq!(body["model"], "claude-3-5-sonnet-20241022");
    assert_eq!(body["max_tokens"], 1024);
    assert_eq!(body["messages"][0]["role"], "user");
    assert!(body["messages"][0]["content"].as_str().unwrap().contains("水 ぬるく"));
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
}

#[tokio::test]
async fn anthropic_rate_limit_carries_retry_after() {
    let (base_url, _server) = stub_server(
        429,
        "retry-after: 7\r\n",
        r#"{"type":"error","error":{"type":"rate_limit_error"}}"#.to_string(),
    )
    .await;

    let request = CompletionRequest::conversion("水 ぬるく", TargetRegister::Polite);
    let err = anthropic(&base_url).complete(&request).await.unwrap_err();

    assert!(matches!(err, ProviderError::Http { status: 429, .. }));
    assert_eq!(err.retry_after(), Some(7));
    assert_eq!(classify_provider_error(&err), FailureKind::RateLimited);
}

#[tokio::test]
async fn openai_uses_bearer_auth_and_regenerate_temperature() {
    let reply = json!({
        "choices": [{ "message": { "role": "assistant", "content": "水、ぬるめで頼むね" } }]
    });
    let (base_url, server) = stub_server(200, "", reply.to_string()).await;

    let request =
        CompletionRequest::regeneration("水 ぬるく", TargetRegister::Casual, "水ぬるめでお願い");
    let text = openai(&base_url).complete(&request).await.unwrap();
    assert_eq!(text, "水、ぬるめで頼むね");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /chat/completions "));
    assert!(raw.to_lowercase().contains("authorization: bearer sk-test-openai-key"));

    let body = request_json(&raw);
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
    assert!((body["temperature"].as_f64().unwrap() - 0.9).abs() < 1e-6);
}

#[tokio::test]
async fn openai_unparseable_body_is_malformed() {
    let (base_url, _server) = stub_server(200, "", "not json".to_string()).await;
    let request = CompletionRequest::conversion("テスト", TargetRegister::Normal);
    let err = openai(&base_url).complete(&request).await.unwrap_err();

    assert!(matches!(err, ProviderError::MalformedResponse { .. }));
    assert_eq!(classify_provider_error(&err), FailureKind::ConversionFailed);
}

#[tokio::test]
async fn openai_server_error_body_is_sanitized() {
    let (base_url, _server) = stub_server(
        500,
        "",
        r#"{"error":{"message":"boom","api_key":"sk-leaked-secret-value"}}"#.to_string(),
    )
    .await;
    let request = CompletionRequest::conversion("テスト", TargetRegister::Normal);
    let err = openai(&base_url).complete(&request).await.unwrap_err();

    assert!(!err.to_string().contains("sk-leaked-secret-value"));
    assert_eq!(classify_provider_error(&err), FailureKind::ConversionFailed);
}

#[tokio::test]
async fn refused_connection_is_provider_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let request = CompletionRequest::conversion("テスト", TargetRegister::Normal);
    let err = anthropic(&base_url).complete(&request).await.unwrap_err();

    assert!(matches!(err, ProviderError::Transport { .. }));
    assert_eq!(classify_provider_error(&err), FailureKind::ProviderUnavailable);
}

#[tokio::test]
async fn missing_key_fails_before_any_request() {
    let provider = OpenAiProvider::new(ProviderSettings::openai(), Client::new());
    let request = CompletionRequest::conversion("テスト", TargetRegister::Normal);
    let err = provider.complete(&request).await.unwrap_err();
    assert_eq!(
        err,
        ProviderError::NotConfigured {
            provider: "openai".into()
        }
    );
}

#[test]
fn anthropic_reply_shapes() {
    let ok = json!({"content": [{"type": "thinking"}, {"type": "text", "text": "はい"}]});
    assert_eq!(anthropic::extract_text(&ok).unwrap(), "はい");

    let empty = json!({"content": [{"type": "text", "text": "   "}]});
    assert!(matches!(
        anthropic::extract_text(&empty),
        Err(ProviderError::EmptyCompletion { .. })
    ));

    let missing = json!({"id": "msg_1"});
    assert!(matches!(
        anthropic::extract_text(&missing),
        Err(ProviderError::MalformedResponse { .. })
    ));
}

#[test]
fn openai_reply_shapes() {
    let null_content = json!({"choices": [{"message": {"content": null}}]});
    assert!(matches!(
        openai::extract_text(&null_content),
        Err(ProviderError::EmptyCompletion { .. })
    ));

    let no_choices = json!({"choices": []});
    assert!(matches!(
        openai::extract_text(&no_choices),
        Err(ProviderError::MalformedResponse { .. })
    ));
}
