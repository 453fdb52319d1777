//! OpenWeatherMap client
//!
//! HTTP client for the OpenWeatherMap geocoding, current weather, forecast,
//! statistics and history APIs. Every call is a single attempt bounded by
//! the configured timeout; retrying is left to the caller.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::config::OpenWeatherConfig;
use crate::error::WeatherError;
use crate::models::{
    AggregatedMonthResponse, AggregatedYearResponse, CurrentConditions, CurrentResponse, GeoPlace,
    GeoResult, ListResponse, MonthlyStatistics, Observation, StatisticalClimate, StatisticsSource,
    TimedEntry, daily_aggregates, observation_from_entry,
};

/// Trait for weather data clients
#[async_trait]
pub trait WeatherClient: Send + Sync {
    /// Resolve a free-text place name to its best match
    async fn geocode(&self, query: &str) -> Result<GeoPlace, WeatherError>;

    /// Current conditions at a location
    async fn current(&self, latitude: f64, longitude: f64)
    -> Result<CurrentConditions, WeatherError>;

    /// Long-term statistics for one calendar month
    ///
    /// Returns `Ok(None)` when the provider has no statistics for that month.
    async fn monthly_statistics(
        &self,
        latitude: f64,
        longitude: f64,
        period_start: NaiveDate,
    ) -> Result<Option<MonthlyStatistics>, WeatherError>;

    /// Statistics for all months from the yearly aggregate, attributed to the
    /// twelve months ending with `today`'s month
    async fn yearly_statistics(
        &self,
        latitude: f64,
        longitude: f64,
        today: NaiveDate,
    ) -> Result<Vec<MonthlyStatistics>, WeatherError>;

    /// Hourly observations between `start` and `end`
    async fn history(
        &self,
        latitude: f64,
        longitude: f64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Observation>, WeatherError>;

    /// Short-range forecast aggregated per day
    async fn forecast(&self, latitude: f64, longitude: f64)
    -> Result<Vec<Observation>, WeatherError>;

    /// Check if the weather service is reachable
    async fn is_healthy(&self) -> bool;

    /// Statistics for the twelve months ending with `today`'s month, oldest first
    ///
    /// Months without statistics are skipped. If none of the twelve monthly
    /// requests returned data, the yearly aggregate is used instead.
    async fn statistical_window(
        &self,
        latitude: f64,
        longitude: f64,
        today: NaiveDate,
    ) -> Result<StatisticalClimate, WeatherError> {
        let mut months = Vec::with_capacity(12);
        for period_start in trailing_months(today) {
            if let Some(stats) = self
                .monthly_statistics(latitude, longitude, period_start)
                .await?
            {
                months.push(stats);
            }
        }

        if !months.is_empty() {
            return Ok(StatisticalClimate {
                source: StatisticsSource::Monthly,
                months,
            });
        }

        debug!("No monthly statistics available, falling back to yearly aggregate");
        let mut months = self.yearly_statistics(latitude, longitude, today).await?;
        months.sort_by_key(|m| m.period_start);
        Ok(StatisticalClimate {
            source: StatisticsSource::Yearly,
            months,
        })
    }
}

/// First days of the twelve months ending with `today`'s month, oldest first
#[must_use]
pub fn trailing_months(today: NaiveDate) -> Vec<NaiveDate> {
    (0..12)
        .rev()
        .filter_map(|back| month_back(today, back))
        .collect()
}

/// Most recent first-of-month (within the trailing window) for a calendar month
#[must_use]
pub fn attribute_month(today: NaiveDate, month: u32) -> Option<NaiveDate> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let year = if month <= today.month() {
        today.year()
    } else {
        today.year() - 1
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

fn month_back(today: NaiveDate, back: u32) -> Option<NaiveDate> {
    let total = i64::from(today.year()) * 12 + i64::from(today.month0()) - i64::from(back);
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month0 = u32::try_from(total.rem_euclid(12)).ok()?;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1)
}

/// OpenWeatherMap HTTP client implementation
#[derive(Debug)]
pub struct OpenWeatherMapClient {
    client: Client,
    config: OpenWeatherConfig,
}

impl OpenWeatherMapClient {
    /// Create a new client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: OpenWeatherConfig) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WeatherError::UpstreamUnavailable(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Validate coordinates
    fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), WeatherError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::InvalidCoordinates);
        }
        Ok(())
    }

    /// Map a non-success status to an error
    ///
    /// 404 is not handled here because its meaning depends on the endpoint.
    fn status_error(status: StatusCode) -> WeatherError {
        match status {
            StatusCode::TOO_MANY_REQUESTS => WeatherError::QuotaExceeded,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => WeatherError::UpstreamUnavailable(
                format!("HTTP {status}: API key rejected or not entitled to this product"),
            ),
            s => WeatherError::UpstreamUnavailable(format!("HTTP {s}")),
        }
    }

    /// GET a JSON document; `Ok(None)` on 404
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, WeatherError> {
        debug!(url = %url, "Requesting weather data");

        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("appid", self.config.api_key.expose_secret())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::status_error(status));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| WeatherError::MalformedResponse(e.to_string()))
    }

    fn coordinate_params(latitude: f64, longitude: f64) -> Vec<(&'static str, String)> {
        vec![("lat", latitude.to_string()), ("lon", longitude.to_string())]
    }

    fn observations(entries: &[TimedEntry], kelvin: bool) -> Vec<Observation> {
        entries
            .iter()
            .filter_map(|entry| observation_from_entry(entry, kelvin))
            .collect()
    }
}

#[async_trait]
impl WeatherClient for OpenWeatherMapClient {
    #[instrument(skip(self))]
    async fn geocode(&self, query: &str) -> Result<GeoPlace, WeatherError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(WeatherError::LocationNotFound(
                "location must not be empty".to_string(),
            ));
        }

        let url = format!("{}/direct", self.config.geo_base_url);
        let params = [("q", query.to_string()), ("limit", "1".to_string())];
        let results: Vec<GeoResult> = self
            .get_json(&url, &params)
            .await?
            .unwrap_or_default();

        let place: GeoPlace = results
            .into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| WeatherError::LocationNotFound(query.to_string()))?;

        if Self::validate_coordinates(place.latitude, place.longitude).is_err() {
            return Err(WeatherError::MalformedResponse(format!(
                "geocoder returned invalid coordinates for '{query}'"
            )));
        }

        debug!(name = %place.name, lat = place.latitude, lon = place.longitude, "Location resolved");
        Ok(place)
    }

    #[instrument(skip(self), fields(lat = %latitude, lon = %longitude))]
    async fn current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentConditions, WeatherError> {
        Self::validate_coordinates(latitude, longitude)?;

        let url = format!("{}/weather", self.config.api_base_url);
        let mut params = Self::coordinate_params(latitude, longitude);
        params.push(("units", "metric".to_string()));

        let raw: CurrentResponse = self.get_json(&url, &params).await?.ok_or_else(|| {
            WeatherError::UpstreamUnavailable(format!(
                "current weather endpoint returned 404 for {latitude}, {longitude}"
            ))
        })?;

        let entry = TimedEntry {
            dt: raw.dt,
            main: raw.main,
            wind: raw.wind,
            rain: raw.rain,
        };
        let observation = observation_from_entry(&entry, false).ok_or_else(|| {
            WeatherError::MalformedResponse(format!("invalid timestamp {}", entry.dt))
        })?;
        let main = entry.main.as_ref();
        let condition = raw.weather.into_iter().next();

        Ok(CurrentConditions {
            observation,
            feels_like_c: main.and_then(|m| m.feels_like),
            pressure_hpa: main.and_then(|m| m.pressure),
            condition: condition.as_ref().and_then(|c| c.main.clone()),
            description: condition.and_then(|c| c.description),
        })
    }

    #[instrument(skip(self), fields(lat = %latitude, lon = %longitude, month = %period_start.month()))]
    async fn monthly_statistics(
        &self,
        latitude: f64,
        longitude: f64,
        period_start: NaiveDate,
    ) -> Result<Option<MonthlyStatistics>, WeatherError> {
        Self::validate_coordinates(latitude, longitude)?;

        let url = format!("{}/aggregated/month", self.config.history_base_url);
        let mut params = Self::coordinate_params(latitude, longitude);
        params.push(("month", period_start.month().to_string()));

        let raw: Option<AggregatedMonthResponse> = self.get_json(&url, &params).await?;
        let stats = raw
            .and_then(|r| r.result)
            .map(|result| result.normalize(period_start));

        if stats.is_none() {
            warn!(month = %period_start.format("%b %Y"), "No statistical data for month");
        }
        Ok(stats)
    }

    #[instrument(skip(self), fields(lat = %latitude, lon = %longitude))]
    async fn yearly_statistics(
        &self,
        latitude: f64,
        longitude: f64,
        today: NaiveDate,
    ) -> Result<Vec<MonthlyStatistics>, WeatherError> {
        Self::validate_coordinates(latitude, longitude)?;

        let url = format!("{}/aggregated/year", self.config.history_base_url);
        let params = Self::coordinate_params(latitude, longitude);

        let raw: Option<AggregatedYearResponse> = self.get_json(&url, &params).await?;
        Ok(raw
            .map(|r| r.result)
            .unwrap_or_default()
            .iter()
            .filter_map(|entry| {
                let period_start = attribute_month(today, entry.month?)?;
                Some(entry.normalize(period_start))
            })
            .collect())
    }

    #[instrument(skip(self), fields(lat = %latitude, lon = %longitude, start = %start, end = %end))]
    async fn history(
        &self,
        latitude: f64,
        longitude: f64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Observation>, WeatherError> {
        Self::validate_coordinates(latitude, longitude)?;

        let url = format!("{}/history/city", self.config.history_base_url);
        let mut params = Self::coordinate_params(latitude, longitude);
        params.push(("type", "hour".to_string()));
        params.push(("start", start.timestamp().to_string()));
        params.push(("end", end.timestamp().to_string()));

        let raw: ListResponse = self.get_json(&url, &params).await?.ok_or_else(|| {
            WeatherError::UpstreamUnavailable(format!(
                "history endpoint returned 404 for {latitude}, {longitude}"
            ))
        })?;

        Ok(Self::observations(&raw.list, true))
    }

    #[instrument(skip(self), fields(lat = %latitude, lon = %longitude))]
    async fn forecast(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<Observation>, WeatherError> {
        Self::validate_coordinates(latitude, longitude)?;

        let url = format!("{}/forecast", self.config.api_base_url);
        let mut params = Self::coordinate_params(latitude, longitude);
        params.push(("units", "metric".to_string()));

        let raw: ListResponse = self.get_json(&url, &params).await?.ok_or_else(|| {
            WeatherError::UpstreamUnavailable(format!(
                "forecast endpoint returned 404 for {latitude}, {longitude}"
            ))
        })?;

        Ok(daily_aggregates(&Self::observations(&raw.list, false)))
    }

    async fn is_healthy(&self) -> bool {
        // Null Island is always covered by the current-weather product
        self.current(0.0, 0.0).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn trailing_months_cross_year_boundary() {
        let months = trailing_months(date(2024, 3, 17));
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], date(2023, 4, 1));
        assert_eq!(months[11], date(2024, 3, 1));
        assert!(months.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn trailing_months_in_december() {
        let months = trailing_months(date(2024, 12, 31));
        assert_eq!(months[0], date(2024, 1, 1));
        assert_eq!(months[11], date(2024, 12, 1));
    }

    #[test]
    fn attribute_month_uses_previous_year_for_later_months() {
        let today = date(2024, 3, 17);
        assert_eq!(attribute_month(today, 1), Some(date(2024, 1, 1)));
        assert_eq!(attribute_month(today, 3), Some(date(2024, 3, 1)));
        assert_eq!(attribute_month(today, 11), Some(date(2023, 11, 1)));
        assert_eq!(attribute_month(today, 0), None);
        assert_eq!(attribute_month(today, 13), None);
    }

    #[test]
    fn coordinate_validation() {
        assert!(OpenWeatherMapClient::validate_coordinates(52.5, 13.4).is_ok());
        assert!(OpenWeatherMapClient::validate_coordinates(90.1, 0.0).is_err());
        assert!(OpenWeatherMapClient::validate_coordinates(0.0, -180.5).is_err());
    }

    #[test]
    fn status_mapping() {
        assert!(matches!(
            OpenWeatherMapClient::status_error(StatusCode::TOO_MANY_REQUESTS),
            WeatherError::QuotaExceeded
        ));
        assert!(matches!(
            OpenWeatherMapClient::status_error(StatusCode::UNAUTHORIZED),
            WeatherError::UpstreamUnavailable(ref msg) if msg.contains("API key")
        ));
        assert!(matches!(
            OpenWeatherMapClient::status_error(StatusCode::BAD_GATEWAY),
            WeatherError::UpstreamUnavailable(_)
        ));
    }

    #[test]
    fn client_creation() {
        let config = OpenWeatherConfig::new(SecretString::from("key"));
        assert!(OpenWeatherMapClient::new(config).is_ok());
    }

    #[tokio::test]
    async fn invalid_coordinates_rejected_before_request() {
        let config = OpenWeatherConfig::new(SecretString::from("key"))
            .with_single_base_url("http://127.0.0.1:1");
        let client = OpenWeatherMapClient::new(config).unwrap();
        let result = client.current(100.0, 0.0).await;
        assert!(matches!(result, Err(WeatherError::InvalidCoordinates)));
    }
}
