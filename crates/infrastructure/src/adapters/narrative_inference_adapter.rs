//! Narrative inference adapter - Implements InferencePort using ai_core
//!
//! Works with any OpenAI-compatible chat completions backend (Together AI by
//! default).

use std::{sync::Arc, time::Instant};

use ai_core::{ChatCompletionsEngine, InferenceConfig, InferenceEngine, InferenceRequest};
use application::{
    error::ApplicationError,
    ports::{InferencePort, InferenceResult},
};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Adapter for hosted chat completion services
pub struct NarrativeInferenceAdapter {
    engine: Arc<dyn InferenceEngine>,
    system_prompt: Option<String>,
}

impl std::fmt::Debug for NarrativeInferenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrativeInferenceAdapter")
            .field("model", &self.engine.default_model())
            .field("system_prompt", &self.system_prompt.is_some())
            .finish()
    }
}

impl NarrativeInferenceAdapter {
    /// Create a new adapter with the given configuration
    pub fn new(config: InferenceConfig) -> Result<Self, ApplicationError> {
        let engine = ChatCompletionsEngine::new(config).map_err(Self::map_error)?;
        Ok(Self::with_engine(Arc::new(engine)))
    }

    /// Create an adapter over any inference engine
    pub fn with_engine(engine: Arc<dyn InferenceEngine>) -> Self {
        Self {
            engine,
            system_prompt: None,
        }
    }

    /// Set the system prompt used by [`InferencePort::generate`]
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Convert ai_core error to application error
    fn map_error(e: ai_core::InferenceError) -> ApplicationError {
        match e {
            ai_core::InferenceError::RateLimited => {
                ApplicationError::QuotaExceeded("narrative service rate limit".to_string())
            },
            ai_core::InferenceError::Timeout(ms) => ApplicationError::Timeout(ms),
            ai_core::InferenceError::ConnectionFailed(msg) => {
                ApplicationError::ExternalService(format!("narrative service unreachable: {msg}"))
            },
            ai_core::InferenceError::ServerError(msg) => {
                ApplicationError::ExternalService(format!("narrative service error: {msg}"))
            },
            other => ApplicationError::Inference(other.to_string()),
        }
    }

    async fn run(&self, request: InferenceRequest) -> Result<InferenceResult, ApplicationError> {
        let start = Instant::now();
        let response = self
            .engine
            .generate(request)
            .await
            .map_err(Self::map_error)?;
        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        debug!(
            model = %response.model,
            tokens = ?response.usage.as_ref().map(|u| u.total_tokens),
            latency_ms,
            finish_reason = ?response.finish_reason,
            "Inference completed"
        );

        Ok(InferenceResult {
            content: response.content,
            model: response.model,
            tokens_used: response.usage.map(|u| u.total_tokens),
            latency_ms,
        })
    }
}

#[async_trait]
impl InferencePort for NarrativeInferenceAdapter {
    #[instrument(skip(self, message), fields(message_len = message.len()))]
    async fn generate(&self, message: &str) -> Result<InferenceResult, ApplicationError> {
        #[allow(clippy::option_if_let_else)]
        let request = match &self.system_prompt {
            Some(system) => InferenceRequest::with_system(system, message),
            None => InferenceRequest::simple(message),
        };
        self.run(request).await
    }

    #[instrument(skip(self, system_prompt, message), fields(message_len = message.len()))]
    async fn generate_with_system(
        &self,
        system_prompt: &str,
        message: &str,
    ) -> Result<InferenceResult, ApplicationError> {
        self.run(InferenceRequest::with_system(system_prompt, message))
            .await
    }

    async fn is_healthy(&self) -> bool {
        self.engine.health_check().await.unwrap_or(false)
    }

    #[instrument(skip(self))]
    async fn list_available_models(&self) -> Result<Vec<String>, ApplicationError> {
        self.engine.list_models().await.map_err(Self::map_error)
    }

    fn current_model(&self) -> String {
        self.engine.default_model().to_string()
    }
}
