//! OpenWeatherMap client configuration

use secrecy::{ExposeSecret, SecretString};

/// Connection settings for the OpenWeatherMap APIs
///
/// The provider spreads its products across three hosts: the classic data
/// API, the geocoding API and the history/statistics API.
#[derive(Clone)]
pub struct OpenWeatherConfig {
    /// API key sent as the `appid` query parameter
    pub api_key: SecretString,

    /// Base URL for current weather and forecasts
    pub api_base_url: String,

    /// Base URL for direct geocoding
    pub geo_base_url: String,

    /// Base URL for statistical aggregates and hourly history
    pub history_base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

pub(crate) const DEFAULT_API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub(crate) const DEFAULT_GEO_BASE_URL: &str = "https://api.openweathermap.org/geo/1.0";
pub(crate) const DEFAULT_HISTORY_BASE_URL: &str = "https://history.openweathermap.org/data/2.5";
pub(crate) const DEFAULT_TIMEOUT_SECS: u64 = 15;

impl OpenWeatherConfig {
    /// Configuration against the public endpoints
    #[must_use]
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            geo_base_url: DEFAULT_GEO_BASE_URL.to_string(),
            history_base_url: DEFAULT_HISTORY_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Point every endpoint at one base URL (used against mock servers)
    #[must_use]
    pub fn with_single_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.api_base_url = format!("{base}/data/2.5");
        self.geo_base_url = format!("{base}/geo/1.0");
        self.history_base_url = format!("{base}/history/2.5");
        self
    }

    /// Whether an API key was supplied
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().trim().is_empty()
    }
}

impl std::fmt::Debug for OpenWeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .field("geo_base_url", &self.geo_base_url)
            .field("history_base_url", &self.history_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
