//! Inference port - Interface for LLM inference

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Result of an inference call
#[derive(Debug, Clone)]
pub struct InferenceResult {
    /// Generated response content
    pub content: String,
    /// Model used for generation
    pub model: String,
    /// Number of tokens used (if available)
    pub tokens_used: Option<u32>,
    /// Latency in milliseconds
    pub latency_ms: u64,
}

/// Port for inference operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait InferencePort: Send + Sync {
    /// Generate a response for a single message
    async fn generate(&self, message: &str) -> Result<InferenceResult, ApplicationError>;

    /// Generate a response with a specific system prompt
    async fn generate_with_system(
        &self,
        system_prompt: &str,
        message: &str,
    ) -> Result<InferenceResult, ApplicationError>;

    /// Check if the inference backend is healthy
    async fn is_healthy(&self) -> bool;

    /// List models the backend offers
    async fn list_available_models(&self) -> Result<Vec<String>, ApplicationError>;

    /// Get the name of the current model
    fn current_model(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trait_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + ?Sized>() {}
        assert_send_sync::<dyn InferencePort>();
    }

    #[tokio::test]
    async fn mock_returns_configured_result() {
        let mut mock = MockInferencePort::new();
        mock.expect_generate().returning(|msg| {
            Ok(InferenceResult {
                content: format!("echo: {msg}"),
                model: "m".to_string(),
                tokens_used: None,
                latency_ms: 1,
            })
        });
        let result = mock.generate("hi").await.unwrap();
        assert_eq!(result.content, "echo: hi");
    }
}
