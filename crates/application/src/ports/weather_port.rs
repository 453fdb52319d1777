//! Weather service port
//!
//! Defines the interface for climate data retrieval.

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{ClimateRecord, LocationQuery, ResolvedLocation};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Kind of climate data to retrieve for a location
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    /// A single snapshot of current conditions
    Current,
    /// Long-term monthly statistics for the trailing twelve months
    #[default]
    Statistical,
    /// Hourly observations over the last N days
    Historical,
    /// Daily means of the short-range forecast
    Forecast,
}

impl DataKind {
    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Statistical => "statistical",
            Self::Historical => "historical",
            Self::Forecast => "forecast",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DataKind {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(Self::Current),
            "statistical" | "statistics" => Ok(Self::Statistical),
            "historical" | "history" => Ok(Self::Historical),
            "forecast" => Ok(Self::Forecast),
            other => Err(ApplicationError::InvalidInput(format!(
                "unknown data kind '{other}', expected current, statistical, historical or forecast"
            ))),
        }
    }
}

/// Snapshot of the weather right now, richer than a current-granularity record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Temperature in Celsius
    pub temperature_c: Option<f64>,
    /// Apparent/feels-like temperature in Celsius
    pub feels_like_c: Option<f64>,
    /// Relative humidity in percent (0-100)
    pub humidity_pct: Option<f64>,
    /// Wind speed in m/s
    pub wind_speed_ms: Option<f64>,
    /// Precipitation over the last hour in mm
    pub precipitation_mm: Option<f64>,
    /// Sea-level pressure in hPa
    pub pressure_hpa: Option<f64>,
    /// Short condition group, e.g. "Rain"
    pub condition: Option<String>,
    /// Longer condition description, e.g. "light rain"
    pub description: Option<String>,
    /// When this data was observed
    pub observed_at: DateTime<Utc>,
}

/// Port for weather service operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherPort: Send + Sync {
    /// Resolve a free-text location to coordinates
    async fn resolve_location(
        &self,
        query: &LocationQuery,
    ) -> Result<ResolvedLocation, ApplicationError>;

    /// Fetch a normalized climate record for a resolved location
    ///
    /// `history_days` is only consulted for [`DataKind::Historical`].
    async fn fetch_record(
        &self,
        location: &ResolvedLocation,
        kind: DataKind,
        history_days: u32,
    ) -> Result<ClimateRecord, ApplicationError>;

    /// Current conditions including the textual condition
    async fn current_weather(
        &self,
        location: &ResolvedLocation,
    ) -> Result<CurrentWeather, ApplicationError>;

    /// Check if the weather service is available
    async fn is_available(&self) -> bool;
}
