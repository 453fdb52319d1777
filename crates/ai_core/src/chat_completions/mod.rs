//! Hosted chat completions inference engine
//!
//! Speaks the OpenAI-compatible `/chat/completions` protocol used by Together AI.

mod client;

pub use client::{ChatCompletionsEngine, strip_reasoning};
