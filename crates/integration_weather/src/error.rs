//! Weather client error types

use thiserror::Error;

/// Errors returned by the OpenWeatherMap client
///
/// The client makes a single attempt per call; [`WeatherError::is_retryable`]
/// tells callers which failures are worth retrying on their side.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Coordinates outside the valid ranges, rejected before any request
    #[error("Invalid coordinates: latitude must be -90 to 90, longitude must be -180 to 180")]
    InvalidCoordinates,

    /// The geocoder had no match for the query
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    /// Transport failure, timeout, rejected credentials or a server error
    #[error("Weather service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The provider's rate limit or subscription quota was hit
    #[error("Weather API quota exceeded")]
    QuotaExceeded,

    /// The response body did not have the expected shape
    #[error("Malformed weather response: {0}")]
    MalformedResponse(String),
}

impl WeatherError {
    /// Returns true if a later attempt may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable(_) | Self::QuotaExceeded)
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key
        let err = err.without_url();
        if err.is_timeout() {
            Self::UpstreamUnavailable("request timed out".to_string())
        } else if err.is_decode() {
            Self::MalformedResponse(err.to_string())
        } else {
            Self::UpstreamUnavailable(err.to_string())
        }
    }
}
