//! AI Core - Inference engine and model configuration
//!
//! Provides abstractions for LLM inference against hosted OpenAI-compatible
//! chat completion APIs, with presets for the reasoning and instruct models
//! used by the recommendation pipeline.

pub mod chat_completions;
pub mod config;
pub mod error;
pub mod ports;

pub use chat_completions::{ChatCompletionsEngine, strip_reasoning};
pub use config::{DEEPSEEK_R1_DISTILL, InferenceConfig, LLAMA_3_3_INSTRUCT};
pub use error::InferenceError;
pub use ports::{
    InferenceEngine, InferenceMessage, InferenceRequest, InferenceResponse, TokenUsage,
};
