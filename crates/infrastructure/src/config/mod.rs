//! Application configuration
//!
//! Layered with the `config` crate, lowest priority first:
//! - built-in defaults (serde defaults on every section)
//! - the legacy `OPENWEATHER_API_KEY` / `TOGETHER_API_KEY` variables
//! - `config.toml` in the working directory, or the file given explicitly
//! - `CLIMATE_ADVISOR_*` environment variables, `__` separating sections
//!   (e.g. `CLIMATE_ADVISOR_WEATHER__API_KEY`)

mod thresholds;
mod weather;

use std::{collections::HashMap, path::Path};

use ai_core::InferenceConfig;
use application::PipelineConfig;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use thresholds::{ImpactAppConfig, load_catalog, parse_catalog};
pub use weather::WeatherAppConfig;

use crate::telemetry::TelemetryConfig;

/// Prefix of the environment variables read into the configuration
pub const ENV_PREFIX: &str = "CLIMATE_ADVISOR";

pub(crate) const WEATHER_KEY_VARS: &str = "CLIMATE_ADVISOR_WEATHER__API_KEY or OPENWEATHER_API_KEY";
pub(crate) const INFERENCE_KEY_VARS: &str =
    "CLIMATE_ADVISOR_INFERENCE__API_KEY or TOGETHER_API_KEY";

/// Legacy variable names and the keys they default
const LEGACY_SECRETS: [(&str, &str); 2] = [
    ("OPENWEATHER_API_KEY", "weather.api_key"),
    ("TOGETHER_API_KEY", "inference.api_key"),
];

/// Longest history window accepted in configuration, in days
const MAX_HISTORICAL_DAYS: u32 = 365;

/// Configuration errors, all fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A required credential is absent
    #[error("Missing {name}: set {env_vars} (or the matching key in config.toml)")]
    MissingSecret {
        name: &'static str,
        env_vars: &'static str,
    },

    /// Threshold tables could not be loaded or failed validation
    #[error("Invalid threshold tables in {path}: {reason}")]
    InvalidThresholds { path: String, reason: String },

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherAppConfig,

    /// Narrative service settings
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Pipeline tuning
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Impact evaluator settings
    #[serde(default)]
    pub impact: ImpactAppConfig,

    /// Logging and trace export
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from the process environment and an optional file
    ///
    /// Without `path`, `config.toml` in the working directory is used when it
    /// exists. An explicit `path` must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(path, std::env::vars().collect())
    }

    /// Load configuration using `env` in place of the process environment
    pub fn load_from(
        path: Option<&Path>,
        env: HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        for (var, key) in LEGACY_SECRETS {
            if let Some(value) = env.get(var).filter(|v| !v.trim().is_empty()) {
                debug!(variable = var, "Using legacy environment variable");
                builder = builder.set_default(key, value.as_str())?;
            }
        }

        builder = match path {
            Some(path) => builder.add_source(config::File::from(path).required(true)),
            None => builder.add_source(config::File::with_name("config").required(false)),
        };

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .source(Some(env)),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Check credentials and value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.weather.has_api_key() {
            return Err(ConfigError::MissingSecret {
                name: "weather API key",
                env_vars: WEATHER_KEY_VARS,
            });
        }
        let inference_key = self
            .inference
            .api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty());
        if !inference_key {
            return Err(ConfigError::MissingSecret {
                name: "narrative service API key",
                env_vars: INFERENCE_KEY_VARS,
            });
        }

        for (name, url) in [
            ("weather.api_base_url", &self.weather.api_base_url),
            ("weather.geo_base_url", &self.weather.geo_base_url),
            ("weather.history_base_url", &self.weather.history_base_url),
            ("inference.base_url", &self.inference.base_url),
        ] {
            reqwest::Url::parse(url)
                .map_err(|e| ConfigError::Invalid(format!("{name} '{url}' is not a URL: {e}")))?;
        }

        if self.weather.timeout_secs == 0 {
            return Err(invalid("weather.timeout_secs must be at least 1"));
        }
        if self.inference.timeout_ms == 0 {
            return Err(invalid("inference.timeout_ms must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.inference.temperature) {
            return Err(invalid("inference.temperature must be between 0.0 and 2.0"));
        }
        if !(self.inference.top_p > 0.0 && self.inference.top_p <= 1.0) {
            return Err(invalid("inference.top_p must be in (0.0, 1.0]"));
        }
        if self.inference.max_tokens == 0 {
            return Err(invalid("inference.max_tokens must be at least 1"));
        }

        let pipeline = &self.pipeline;
        if pipeline.historical_days == 0 || pipeline.historical_days > MAX_HISTORICAL_DAYS {
            return Err(ConfigError::Invalid(format!(
                "pipeline.historical_days must be between 1 and {MAX_HISTORICAL_DAYS}"
            )));
        }
        if pipeline.narrative_timeout_secs == 0 {
            return Err(invalid("pipeline.narrative_timeout_secs must be at least 1"));
        }
        let trend = &pipeline.trend;
        if !trend.flat_band_per_day.is_finite() || trend.flat_band_per_day < 0.0 {
            return Err(invalid("pipeline.trend.flat_band_per_day must be a non-negative number"));
        }
        if !trend.anomaly_threshold.is_finite() || trend.anomaly_threshold <= 0.0 {
            return Err(invalid("pipeline.trend.anomaly_threshold must be positive"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_string())
}
