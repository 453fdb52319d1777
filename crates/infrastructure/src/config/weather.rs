//! Weather provider configuration

use integration_weather::OpenWeatherConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// OpenWeatherMap settings
#[derive(Clone, Serialize, Deserialize)]
pub struct WeatherAppConfig {
    /// API key (sensitive, never serialized)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Base URL for current weather and forecasts
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL for direct geocoding
    #[serde(default = "default_geo_base_url")]
    pub geo_base_url: String,

    /// Base URL for statistics and hourly history
    #[serde(default = "default_history_base_url")]
    pub history_base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_geo_base_url() -> String {
    "https://api.openweathermap.org/geo/1.0".to_string()
}

fn default_history_base_url() -> String {
    "https://history.openweathermap.org/data/2.5".to_string()
}

const fn default_timeout_secs() -> u64 {
    15
}

impl Default for WeatherAppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: default_api_base_url(),
            geo_base_url: default_geo_base_url(),
            history_base_url: default_history_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl WeatherAppConfig {
    /// Whether a non-blank API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_ref()
            .is_some_and(|k| !k.expose_secret().trim().is_empty())
    }

    /// Client configuration for the integration crate
    pub fn client_config(&self) -> Result<OpenWeatherConfig, ConfigError> {
        let api_key = self
            .api_key
            .clone()
            .filter(|_| self.has_api_key())
            .ok_or(ConfigError::MissingSecret {
                name: "weather API key",
                env_vars: super::WEATHER_KEY_VARS,
            })?;

        let mut config = OpenWeatherConfig::new(api_key);
        config.api_base_url.clone_from(&self.api_base_url);
        config.geo_base_url.clone_from(&self.geo_base_url);
        config.history_base_url.clone_from(&self.history_base_url);
        config.timeout_secs = self.timeout_secs;
        Ok(config)
    }
}

impl std::fmt::Debug for WeatherAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherAppConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base_url", &self.api_base_url)
            .field("geo_base_url", &self.geo_base_url)
            .field("history_base_url", &self.history_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_copies_endpoints() {
        let config = WeatherAppConfig {
            api_key: Some(SecretString::from("owm-key")),
            api_base_url: "http://localhost:1/data/2.5".to_string(),
            timeout_secs: 3,
            ..WeatherAppConfig::default()
        };
        let client = config.client_config().unwrap();
        assert_eq!(client.api_base_url, "http://localhost:1/data/2.5");
        assert_eq!(client.geo_base_url, "https://api.openweathermap.org/geo/1.0");
        assert_eq!(client.timeout_secs, 3);
        assert_eq!(client.api_key.expose_secret(), "owm-key");
    }

    #[test]
    fn blank_key_is_missing() {
        let config = WeatherAppConfig {
            api_key: Some(SecretString::from("   ")),
            ..WeatherAppConfig::default()
        };
        assert!(!config.has_api_key());
        assert!(matches!(
            config.client_config(),
            Err(ConfigError::MissingSecret { .. })
        ));
    }

    #[test]
    fn debug_redacts_key() {
        let config = WeatherAppConfig {
            api_key: Some(SecretString::from("owm-secret")),
            ..WeatherAppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("owm-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
