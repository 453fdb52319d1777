//! OpenAI-compatible chat completions client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::ports::{
    InferenceEngine, InferenceMessage, InferenceRequest, InferenceResponse, TokenUsage,
};

/// Inference engine for hosted OpenAI-compatible APIs (Together AI by default)
pub struct ChatCompletionsEngine {
    client: Client,
    config: InferenceConfig,
}

impl std::fmt::Debug for ChatCompletionsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ChatCompletionsEngine {
    /// Create a new engine
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::ConnectionFailed(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            model = %config.default_model,
            "Initialized chat completions engine"
        );

        Ok(Self { client, config })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Get the model to use for a request
    fn resolve_model<'a>(&'a self, request: &'a InferenceRequest) -> &'a str {
        request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key.expose_secret()),
            None => builder,
        }
    }

    fn map_transport_error(&self, err: reqwest::Error) -> InferenceError {
        if err.is_timeout() {
            InferenceError::Timeout(self.config.timeout_ms)
        } else {
            err.into()
        }
    }

    /// Map a non-success status to an error
    fn status_error(status: StatusCode, body: &str, model: &str) -> InferenceError {
        let detail = if body.is_empty() {
            format!("HTTP {status}")
        } else {
            format!("HTTP {status}: {}", truncate(body, 200))
        };
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => InferenceError::Unauthorized(detail),
            StatusCode::NOT_FOUND => InferenceError::ModelNotAvailable(model.to_string()),
            StatusCode::TOO_MANY_REQUESTS => InferenceError::RateLimited,
            s if s.is_server_error() => InferenceError::ServerError(detail),
            _ => InferenceError::RequestFailed(detail),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Remove `<think>...</think>` reasoning blocks emitted by reasoning models
///
/// An unterminated block drops everything after its opening tag; a stray
/// closing tag drops everything before it.
#[must_use]
pub fn strip_reasoning(content: &str) -> String {
    const OPEN: &str = "<think>";
    const CLOSE: &str = "</think>";

    let mut rest = content;
    if let Some(close) = rest.find(CLOSE) {
        if rest.find(OPEN).is_none_or(|open| open > close) {
            rest = &rest[close + CLOSE.len()..];
        }
    }

    let mut output = String::with_capacity(rest.len());
    while let Some(open) = rest.find(OPEN) {
        output.push_str(&rest[..open]);
        match rest[open..].find(CLOSE) {
            Some(close) => rest = &rest[open + close + CLOSE.len()..],
            None => {
                rest = "";
                break;
            },
        }
    }
    output.push_str(rest);
    output.trim().to_string()
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [InferenceMessage],
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

/// Some providers answer `/models` with a bare array instead of `{ "data": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ModelsPayload {
    Wrapped(ModelsResponse),
    Bare(Vec<ModelEntry>),
}

#[async_trait]
impl InferenceEngine for ChatCompletionsEngine {
    #[instrument(skip(self, request), fields(model = %self.resolve_model(&request)))]
    async fn generate(
        &self,
        request: InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        let model = self.resolve_model(&request).to_string();

        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &self.config.system_prompt {
            if !request.messages.iter().any(|m| m.role == "system") {
                messages.push(InferenceMessage::system(system.clone()));
            }
        }
        messages.extend(request.messages.iter().cloned());

        let body = ChatRequest {
            model: &model,
            messages: &messages,
            max_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: request.temperature.unwrap_or(self.config.temperature),
            top_p: self.config.top_p,
            stream: false,
        };

        debug!(messages = messages.len(), "Sending chat completion request");

        let response = self
            .authorize(self.client.post(self.api_url("chat/completions")))
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(%status, "Chat completion request failed");
            return Err(Self::status_error(status, &error_body, &model));
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::InvalidResponse("no choices returned".to_string()))?;

        let raw = choice.message.content.unwrap_or_default();
        let content = strip_reasoning(&raw);
        if content.is_empty() {
            return Err(InferenceError::InvalidResponse(
                "completion was empty".to_string(),
            ));
        }

        debug!(
            finish_reason = ?choice.finish_reason,
            tokens = ?parsed.usage.map(|u| u.total_tokens),
            "Chat completion received"
        );

        Ok(InferenceResponse {
            content,
            model: parsed.model.unwrap_or(model),
            usage: parsed.usage,
            finish_reason: choice.finish_reason,
        })
    }

    async fn health_check(&self) -> Result<bool, InferenceError> {
        let response = self
            .authorize(self.client.get(self.api_url("models")))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        Ok(response.status().is_success())
    }

    #[instrument(skip(self))]
    async fn list_models(&self) -> Result<Vec<String>, InferenceError> {
        let response = self
            .authorize(self.client.get(self.api_url("models")))
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(
                status,
                &error_body,
                &self.config.default_model,
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(e))?;
        let payload: ModelsPayload = serde_json::from_str(&text)
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let entries = match payload {
            ModelsPayload::Wrapped(wrapped) => wrapped.data,
            ModelsPayload::Bare(entries) => entries,
        };
        Ok(entries.into_iter().map(|m| m.id).collect())
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}
