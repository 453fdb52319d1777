//! Weather data models
//!
//! Wire types for the OpenWeatherMap responses and the normalized types the
//! client hands out. All normalized values are metric: °C, mm, %, m/s.
//! Provider fields that are absent or `null` stay `None`.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Absolute zero offset used by the statistics and history APIs
pub const KELVIN_OFFSET: f64 = 273.15;

/// Convert a Kelvin reading to Celsius
#[must_use]
pub fn kelvin_to_celsius(kelvin: f64) -> f64 {
    kelvin - KELVIN_OFFSET
}

/// Number of days in the month starting at `first_of_month`
#[must_use]
pub fn days_in_month(first_of_month: NaiveDate) -> u32 {
    let (year, month) = if first_of_month.month() == 12 {
        (first_of_month.year() + 1, 1)
    } else {
        (first_of_month.year(), first_of_month.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| u32::try_from((next - first_of_month).num_days()).ok())
        .unwrap_or(30)
}

// ============================================================================
// Normalized output types
// ============================================================================

/// A geocoding match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPlace {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub state: Option<String>,
}

/// One normalized observation or aggregate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub temperature_c: Option<f64>,
    pub precipitation_mm: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub wind_speed_ms: Option<f64>,
}

/// Current conditions at a location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub observation: Observation,
    pub feels_like_c: Option<f64>,
    pub pressure_hpa: Option<f64>,
    /// Condition group such as "Rain" or "Clear"
    pub condition: Option<String>,
    /// Free-text description such as "light rain"
    pub description: Option<String>,
}

/// Where a set of monthly statistics came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatisticsSource {
    /// One aggregated-month request per month
    Monthly,
    /// The yearly aggregate, used when no monthly request had data
    Yearly,
}

/// Long-term statistics for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStatistics {
    /// First day of the month these statistics are attributed to
    pub period_start: NaiveDate,
    pub temperature_mean_c: Option<f64>,
    pub temperature_record_min_c: Option<f64>,
    pub temperature_record_max_c: Option<f64>,
    pub temperature_average_min_c: Option<f64>,
    pub temperature_average_max_c: Option<f64>,
    /// Mean daily precipitation scaled to the month's length
    pub precipitation_total_mm: Option<f64>,
    pub humidity_mean_pct: Option<f64>,
    pub wind_mean_ms: Option<f64>,
    pub sunshine_hours: Option<f64>,
}

impl MonthlyStatistics {
    /// Midnight UTC of the first day of the month
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.period_start
            .and_hms_opt(0, 0, 0)
            .map_or_else(Utc::now, |dt| dt.and_utc())
    }
}

/// A window of monthly statistics, oldest month first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalClimate {
    pub source: StatisticsSource,
    pub months: Vec<MonthlyStatistics>,
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
pub(crate) struct GeoResult {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

impl From<GeoResult> for GeoPlace {
    fn from(raw: GeoResult) -> Self {
        Self {
            name: raw.name,
            latitude: raw.lat,
            longitude: raw.lon,
            country: raw.country,
            state: raw.state,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MainBlock {
    #[serde(default)]
    pub temp: Option<f64>,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub pressure: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WindBlock {
    #[serde(default)]
    pub speed: Option<f64>,
}

/// Rain volume; the provider omits the whole block when it is dry
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RainBlock {
    #[serde(default, rename = "1h")]
    pub one_hour: Option<f64>,
    #[serde(default, rename = "3h")]
    pub three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ConditionBlock {
    #[serde(default)]
    pub main: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CurrentResponse {
    pub dt: i64,
    #[serde(default)]
    pub main: Option<MainBlock>,
    #[serde(default)]
    pub wind: Option<WindBlock>,
    #[serde(default)]
    pub rain: Option<RainBlock>,
    #[serde(default)]
    pub weather: Vec<ConditionBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimedEntry {
    pub dt: i64,
    #[serde(default)]
    pub main: Option<MainBlock>,
    #[serde(default)]
    pub wind: Option<WindBlock>,
    #[serde(default)]
    pub rain: Option<RainBlock>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default)]
    pub list: Vec<TimedEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatBlock {
    #[serde(default)]
    pub mean: Option<f64>,
    #[serde(default)]
    pub record_min: Option<f64>,
    #[serde(default)]
    pub record_max: Option<f64>,
    #[serde(default)]
    pub average_min: Option<f64>,
    #[serde(default)]
    pub average_max: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MonthStats {
    #[serde(default)]
    pub month: Option<u32>,
    #[serde(default)]
    pub temp: Option<StatBlock>,
    #[serde(default)]
    pub humidity: Option<StatBlock>,
    #[serde(default)]
    pub wind: Option<StatBlock>,
    #[serde(default)]
    pub precipitation: Option<StatBlock>,
    #[serde(default)]
    pub sunshine_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AggregatedMonthResponse {
    #[serde(default)]
    pub result: Option<MonthStats>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AggregatedYearResponse {
    #[serde(default)]
    pub result: Vec<MonthStats>,
}

// ============================================================================
// Normalization
// ============================================================================

pub(crate) fn timestamp_from_unix(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

impl MonthStats {
    /// Normalize aggregated statistics (temperatures arrive in Kelvin,
    /// precipitation as a mean daily amount)
    pub(crate) fn normalize(&self, period_start: NaiveDate) -> MonthlyStatistics {
        let temp = self.temp.as_ref();
        let kelvin = |pick: fn(&StatBlock) -> Option<f64>| temp.and_then(pick).map(kelvin_to_celsius);
        let days = f64::from(days_in_month(period_start));

        MonthlyStatistics {
            period_start,
            temperature_mean_c: kelvin(|b| b.mean),
            temperature_record_min_c: kelvin(|b| b.record_min),
            temperature_record_max_c: kelvin(|b| b.record_max),
            temperature_average_min_c: kelvin(|b| b.average_min),
            temperature_average_max_c: kelvin(|b| b.average_max),
            precipitation_total_mm: self
                .precipitation
                .as_ref()
                .and_then(|b| b.mean)
                .map(|daily| daily * days),
            humidity_mean_pct: self.humidity.as_ref().and_then(|b| b.mean),
            wind_mean_ms: self.wind.as_ref().and_then(|b| b.mean),
            sunshine_hours: self.sunshine_hours,
        }
    }
}

/// Convert a timed entry into an observation
///
/// `kelvin` selects whether `main.temp` needs conversion (history API) or is
/// already metric (`units=metric` requests). A missing rain block means no
/// rain fell, so it becomes 0 mm.
pub(crate) fn observation_from_entry(entry: &TimedEntry, kelvin: bool) -> Option<Observation> {
    let timestamp = timestamp_from_unix(entry.dt)?;
    let main = entry.main.as_ref();
    let temperature = main.and_then(|m| m.temp);
    Some(Observation {
        timestamp,
        temperature_c: if kelvin {
            temperature.map(kelvin_to_celsius)
        } else {
            temperature
        },
        precipitation_mm: Some(
            entry
                .rain
                .as_ref()
                .and_then(|r| r.one_hour.or(r.three_hours))
                .unwrap_or(0.0),
        ),
        humidity_pct: main.and_then(|m| m.humidity),
        wind_speed_ms: entry.wind.as_ref().and_then(|w| w.speed),
    })
}

/// Collapse 3-hourly forecast steps into one observation per UTC day
///
/// Temperature, humidity and wind are averaged over the reported steps;
/// precipitation is summed.
pub(crate) fn daily_aggregates(steps: &[Observation]) -> Vec<Observation> {
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct Acc {
        temp: Vec<f64>,
        humidity: Vec<f64>,
        wind: Vec<f64>,
        precip: Vec<f64>,
    }

    fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            None
        } else {
            #[allow(clippy::cast_precision_loss)]
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    let mut days: BTreeMap<NaiveDate, Acc> = BTreeMap::new();
    for step in steps {
        let acc = days.entry(step.timestamp.date_naive()).or_default();
        acc.temp.extend(step.temperature_c);
        acc.humidity.extend(step.humidity_pct);
        acc.wind.extend(step.wind_speed_ms);
        acc.precip.extend(step.precipitation_mm);
    }

    days.into_iter()
        .filter_map(|(date, acc)| {
            let timestamp = date.and_hms_opt(0, 0, 0)?.and_utc();
            Some(Observation {
                timestamp,
                temperature_c: mean(&acc.temp),
                precipitation_mm: if acc.precip.is_empty() {
                    None
                } else {
                    Some(acc.precip.iter().sum())
                },
                humidity_pct: mean(&acc.humidity),
                wind_speed_ms: mean(&acc.wind),
            })
        })
        .collect()
}
