//! Integration tests for the chat completions engine using WireMock
//!
//! These tests mock the OpenAI-compatible HTTP API to verify client behavior
//! without calling a hosted provider.

use std::time::Duration;

use ai_core::{
    ChatCompletionsEngine, InferenceConfig, InferenceEngine, InferenceError, InferenceRequest,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_partial_json, header, method, path},
};

// =============================================================================
// Test Helpers
// =============================================================================

fn config_for_mock(base_url: &str) -> InferenceConfig {
    InferenceConfig {
        base_url: format!("{base_url}/v1"),
        default_model: "test-model".to_string(),
        temperature: 0.7,
        max_tokens: 100,
        top_p: 0.9,
        timeout_ms: 5000,
        system_prompt: None,
        ..InferenceConfig::default()
    }
    .with_api_key("test-key")
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "cmpl-1",
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 12, "completion_tokens": 20, "total_tokens": 32 }
    })
}

async fn engine_for(server: &MockServer) -> ChatCompletionsEngine {
    ChatCompletionsEngine::new(config_for_mock(&server.uri())).unwrap()
}

// =============================================================================
// Generate
// =============================================================================

#[tokio::test]
async fn generate_returns_content_and_usage() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "test-model",
            "stream": false,
            "max_tokens": 100
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Irrigate early.")))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let response = engine
        .generate(InferenceRequest::simple("What now?"))
        .await
        .unwrap();

    assert_eq!(response.content, "Irrigate early.");
    assert_eq!(response.model, "test-model");
    assert_eq!(response.usage.unwrap().total_tokens, 32);
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn generate_strips_reasoning_block() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion(
            "<think>The farmer needs water.</think>\n\nShort-term:\n- Irrigate",
        )))
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let response = engine
        .generate(InferenceRequest::simple("advise"))
        .await
        .unwrap();

    assert_eq!(response.content, "Short-term:\n- Irrigate");
}

#[tokio::test]
async fn generate_sends_request_model_override() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({ "model": "other-model" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let response = engine
        .generate(InferenceRequest::simple("hi").with_model("other-model"))
        .await
        .unwrap();
    assert_eq!(response.content, "ok");
}

#[tokio::test]
async fn generate_prepends_configured_system_prompt() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({
            "messages": [
                { "role": "system", "content": "You advise businesses." },
                { "role": "user", "content": "hi" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for_mock(&server.uri());
    config.system_prompt = Some("You advise businesses.".to_string());
    let engine = ChatCompletionsEngine::new(config).unwrap();

    engine.generate(InferenceRequest::simple("hi")).await.unwrap();
}

#[tokio::test]
async fn empty_completion_is_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("<think>only thoughts</think>")),
        )
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let err = engine
        .generate(InferenceRequest::simple("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::InvalidResponse(_)));
}

#[tokio::test]
async fn missing_choices_is_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })),
        )
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let err = engine
        .generate(InferenceRequest::simple("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::InvalidResponse(_)));
}

#[tokio::test]
async fn malformed_body_is_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let err = engine
        .generate(InferenceRequest::simple("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::InvalidResponse(_)));
}

// =============================================================================
// Error mapping
// =============================================================================

#[tokio::test]
async fn unauthorized_maps_to_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let err = engine
        .generate(InferenceRequest::simple("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::Unauthorized(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let err = engine
        .generate(InferenceRequest::simple("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::RateLimited));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn unknown_model_maps_to_model_not_available() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let err = engine
        .generate(InferenceRequest::simple("hi").with_model("ghost"))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::ModelNotAvailable(ref m) if m == "ghost"));
}

#[tokio::test]
async fn server_error_maps_to_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let err = engine
        .generate(InferenceRequest::simple("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::ServerError(ref d) if d.contains("overloaded")));
}

#[tokio::test]
async fn slow_server_maps_to_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let mut config = config_for_mock(&server.uri());
    config.timeout_ms = 100;
    let engine = ChatCompletionsEngine::new(config).unwrap();

    let err = engine
        .generate(InferenceRequest::simple("hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::Timeout(100)));
}

#[tokio::test]
async fn unreachable_server_fails_to_connect() {
    let config = InferenceConfig::default().with_base_url("http://127.0.0.1:1/v1");
    let engine = ChatCompletionsEngine::new(config).unwrap();

    let err = engine
        .generate(InferenceRequest::simple("hi"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        InferenceError::ConnectionFailed(_) | InferenceError::RequestFailed(_)
    ));
}

// =============================================================================
// Models / health
// =============================================================================

#[tokio::test]
async fn list_models_reads_wrapped_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "list",
            "data": [{ "id": "model-a" }, { "id": "model-b" }]
        })))
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let models = engine.list_models().await.unwrap();
    assert_eq!(models, vec!["model-a", "model-b"]);
}

#[tokio::test]
async fn list_models_reads_bare_array() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": "model-a", "type": "chat" }
        ])))
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    let models = engine.list_models().await.unwrap();
    assert_eq!(models, vec!["model-a"]);
}

#[tokio::test]
async fn health_check_reflects_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": [] })))
        .mount(&server)
        .await;

    let engine = engine_for(&server).await;
    assert!(engine.health_check().await.unwrap());

    let down = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&down)
        .await;

    let engine = engine_for(&down).await;
    assert!(!engine.health_check().await.unwrap());
}
