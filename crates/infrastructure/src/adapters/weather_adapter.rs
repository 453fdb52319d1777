//! Weather adapter - Implements WeatherPort using integration_weather

use std::sync::Arc;

use application::{
    error::ApplicationError,
    ports::{CurrentWeather, DataKind, WeatherPort},
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use domain::{
    ClimateRecord, ClimateRecordBuilder, GeoLocation, Granularity, LocationQuery, Metric,
    ResolvedLocation,
};
use integration_weather::{
    CurrentConditions, Observation, OpenWeatherConfig, OpenWeatherMapClient, StatisticsSource,
    WeatherClient, WeatherError,
};
use tracing::{debug, instrument};

/// Longest history window a single request may ask for
pub const MAX_HISTORY_DAYS: u32 = 365;

/// Adapter for the OpenWeatherMap APIs
pub struct WeatherAdapter {
    client: Arc<dyn WeatherClient>,
}

impl std::fmt::Debug for WeatherAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherAdapter")
            .field("client", &"WeatherClient")
            .finish()
    }
}

impl WeatherAdapter {
    /// Create an adapter over the OpenWeatherMap client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn new(config: OpenWeatherConfig) -> Result<Self, ApplicationError> {
        let client = OpenWeatherMapClient::new(config).map_err(Self::map_error)?;
        Ok(Self::with_client(Arc::new(client)))
    }

    /// Create an adapter over any weather client
    pub fn with_client(client: Arc<dyn WeatherClient>) -> Self {
        Self { client }
    }

    /// Map integration weather error to application error
    fn map_error(err: WeatherError) -> ApplicationError {
        match err {
            WeatherError::LocationNotFound(place) => ApplicationError::LocationNotFound(place),
            WeatherError::QuotaExceeded => {
                ApplicationError::QuotaExceeded("weather API rate limit or plan quota".into())
            },
            WeatherError::InvalidCoordinates => {
                ApplicationError::InvalidInput(WeatherError::InvalidCoordinates.to_string())
            },
            e @ (WeatherError::UpstreamUnavailable(_) | WeatherError::MalformedResponse(_)) => {
                ApplicationError::ExternalService(e.to_string())
            },
        }
    }

    fn map_current(current: CurrentConditions) -> CurrentWeather {
        let observation = current.observation;
        CurrentWeather {
            temperature_c: observation.temperature_c,
            feels_like_c: current.feels_like_c,
            humidity_pct: observation.humidity_pct,
            wind_speed_ms: observation.wind_speed_ms,
            precipitation_mm: observation.precipitation_mm,
            pressure_hpa: current.pressure_hpa,
            condition: current.condition,
            description: current.description,
            observed_at: observation.timestamp,
        }
    }

    fn push_observation(builder: &mut ClimateRecordBuilder, observation: &Observation) {
        let ts = observation.timestamp;
        builder.push(Metric::Temperature, ts, observation.temperature_c);
        builder.push(Metric::Precipitation, ts, observation.precipitation_mm);
        builder.push(Metric::Humidity, ts, observation.humidity_pct);
        builder.push(Metric::Wind, ts, observation.wind_speed_ms);
    }

    fn observations_record(
        location: &ResolvedLocation,
        granularity: Granularity,
        observations: &[Observation],
    ) -> ClimateRecord {
        let mut builder = ClimateRecord::builder(location.clone(), granularity);
        for observation in observations {
            Self::push_observation(&mut builder, observation);
        }
        builder.build()
    }

    async fn statistical_record(
        &self,
        location: &ResolvedLocation,
    ) -> Result<ClimateRecord, ApplicationError> {
        let (lat, lon) = coordinates(location);
        let climate = self
            .client
            .statistical_window(lat, lon, Utc::now().date_naive())
            .await
            .map_err(Self::map_error)?;

        let granularity = match climate.source {
            StatisticsSource::Monthly => Granularity::Monthly,
            StatisticsSource::Yearly => Granularity::Yearly,
        };
        let mut builder = ClimateRecord::builder(location.clone(), granularity);
        for month in &climate.months {
            let ts = month.timestamp();
            builder.push(Metric::Temperature, ts, month.temperature_mean_c);
            builder.push(Metric::Precipitation, ts, month.precipitation_total_mm);
            builder.push(Metric::Humidity, ts, month.humidity_mean_pct);
            builder.push(Metric::Wind, ts, month.wind_mean_ms);
        }
        debug!(months = climate.months.len(), source = ?climate.source, "Statistical window fetched");
        Ok(builder.build())
    }
}

fn coordinates(location: &ResolvedLocation) -> (f64, f64) {
    (
        location.coordinates.latitude(),
        location.coordinates.longitude(),
    )
}

#[async_trait]
impl WeatherPort for WeatherAdapter {
    #[instrument(skip(self, query), fields(query = %query))]
    async fn resolve_location(
        &self,
        query: &LocationQuery,
    ) -> Result<ResolvedLocation, ApplicationError> {
        let place = self
            .client
            .geocode(query.as_str())
            .await
            .map_err(Self::map_error)?;
        let coordinates = GeoLocation::new(place.latitude, place.longitude)?;

        let mut resolved = ResolvedLocation::new(query.clone(), coordinates, place.name);
        if let Some(country) = place.country {
            resolved = resolved.with_country(country);
        }
        if let Some(state) = place.state {
            resolved = resolved.with_state(state);
        }
        debug!(resolved = %resolved, "Location resolved");
        Ok(resolved)
    }

    #[instrument(skip(self, location), fields(location = %location.coordinates))]
    async fn fetch_record(
        &self,
        location: &ResolvedLocation,
        kind: DataKind,
        history_days: u32,
    ) -> Result<ClimateRecord, ApplicationError> {
        let (lat, lon) = coordinates(location);
        let record = match kind {
            DataKind::Current => {
                let current = self.client.current(lat, lon).await.map_err(Self::map_error)?;
                Self::observations_record(location, Granularity::Current, &[current.observation])
            },
            DataKind::Statistical => self.statistical_record(location).await?,
            DataKind::Historical => {
                if history_days == 0 || history_days > MAX_HISTORY_DAYS {
                    return Err(ApplicationError::InvalidInput(format!(
                        "history days must be between 1 and {MAX_HISTORY_DAYS}"
                    )));
                }
                let end = Utc::now();
                let start = end - Duration::days(i64::from(history_days));
                let observations = self
                    .client
                    .history(lat, lon, start, end)
                    .await
                    .map_err(Self::map_error)?;
                Self::observations_record(location, Granularity::Historical, &observations)
            },
            DataKind::Forecast => {
                let observations = self.client.forecast(lat, lon).await.map_err(Self::map_error)?;
                Self::observations_record(location, Granularity::Forecast, &observations)
            },
        };

        let dropped: usize = record.iter().map(|(_, s)| s.dropped_points).sum();
        debug!(
            points = record.total_points(),
            dropped,
            granularity = %record.granularity(),
            "Climate record built"
        );
        Ok(record)
    }

    #[instrument(skip(self, location), fields(location = %location.coordinates))]
    async fn current_weather(
        &self,
        location: &ResolvedLocation,
    ) -> Result<CurrentWeather, ApplicationError> {
        let (lat, lon) = coordinates(location);
        let result = self.client.current(lat, lon).await;

        match &result {
            Ok(current) => {
                debug!(
                    temperature = ?current.observation.temperature_c,
                    condition = ?current.condition,
                    "Retrieved current weather"
                );
            },
            Err(e) => {
                debug!(error = %e, "Failed to get current weather");
            },
        }

        result.map(Self::map_current).map_err(Self::map_error)
    }

    #[instrument(skip(self))]
    async fn is_available(&self) -> bool {
        self.client.is_healthy().await
    }
}
