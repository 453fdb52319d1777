//! Configuration for the inference engine

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Reasoning-distilled model, the default
pub const DEEPSEEK_R1_DISTILL: &str = "deepseek-ai/DeepSeek-R1-Distill-Llama-70B-free";

/// Instruction-tuned alternative
pub const LLAMA_3_3_INSTRUCT: &str = "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free";

/// Configuration for the inference engine
#[derive(Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL of the OpenAI-compatible API (including the version segment)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token for the API (sensitive, never serialized)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Default model to use
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Top-p (nucleus) sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// System prompt to use by default
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_base_url() -> String {
    "https://api.together.xyz/v1".to_string()
}

fn default_model() -> String {
    DEEPSEEK_R1_DISTILL.to_string()
}

const fn default_timeout_ms() -> u64 {
    60_000
}

const fn default_max_tokens() -> u32 {
    2048
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_top_p() -> f32 {
    0.9
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            default_model: default_model(),
            timeout_ms: default_timeout_ms(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            system_prompt: None,
        }
    }
}

impl InferenceConfig {
    /// Config for the DeepSeek R1 distilled Llama model
    pub fn deepseek_r1_distill() -> Self {
        Self {
            default_model: DEEPSEEK_R1_DISTILL.to_string(),
            ..Default::default()
        }
    }

    /// Config for Llama 3.3 70B Instruct Turbo
    pub fn llama_3_3_instruct() -> Self {
        Self {
            default_model: LLAMA_3_3_INSTRUCT.to_string(),
            ..Default::default()
        }
    }

    /// Set the API key
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl std::fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("default_model", &self.default_model)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}
