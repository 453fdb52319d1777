//! Normalized climate time series for one location

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Metric, MetricUnit, ResolvedLocation};

/// Where a record's points came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// A single current observation
    Current,
    /// Per-month aggregates for the last twelve months
    Monthly,
    /// Per-month aggregates taken from the provider's yearly statistics
    Yearly,
    /// Hourly observations over a past window
    Historical,
    /// Daily aggregates of the short-range forecast
    Forecast,
}

impl Granularity {
    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Historical => "historical",
            Self::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One timestamped measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl DataPoint {
    /// Create a data point
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Time-ordered values of a single metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSeries {
    /// Unit every value is expressed in
    pub unit: MetricUnit,
    /// Points sorted by timestamp
    pub points: Vec<DataPoint>,
    /// Provider values that were missing or implausible and got dropped
    pub dropped_points: usize,
}

impl MetricSeries {
    /// The most recent point
    #[must_use]
    pub fn latest(&self) -> Option<DataPoint> {
        self.points.last().copied()
    }

    /// Arithmetic mean of all values
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        if self.points.is_empty() {
            return None;
        }
        let sum: f64 = self.points.iter().map(|p| p.value).sum();
        #[allow(clippy::cast_precision_loss)]
        Some(sum / self.points.len() as f64)
    }

    /// Number of usable points
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no usable points remain
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Normalized weather data for one location and one source granularity
///
/// Values are already converted to the metric's canonical unit (see
/// [`Metric::unit`]). Missing or implausible provider values never appear
/// as points; they are only counted in [`MetricSeries::dropped_points`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateRecord {
    location: ResolvedLocation,
    granularity: Granularity,
    series: BTreeMap<Metric, MetricSeries>,
    retrieved_at: DateTime<Utc>,
}

impl ClimateRecord {
    /// Start building a record
    #[must_use]
    pub fn builder(location: ResolvedLocation, granularity: Granularity) -> ClimateRecordBuilder {
        ClimateRecordBuilder::new(location, granularity)
    }

    /// Location the data belongs to
    #[must_use]
    pub const fn location(&self) -> &ResolvedLocation {
        &self.location
    }

    /// Source granularity
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// When the data was fetched
    #[must_use]
    pub const fn retrieved_at(&self) -> DateTime<Utc> {
        self.retrieved_at
    }

    /// Series for a metric, if the provider reported it at all
    #[must_use]
    pub fn series(&self, metric: Metric) -> Option<&MetricSeries> {
        self.series.get(&metric)
    }

    /// Iterate over all series in metric order
    pub fn iter(&self) -> impl Iterator<Item = (Metric, &MetricSeries)> {
        self.series.iter().map(|(metric, series)| (*metric, series))
    }

    /// Most recent value of a metric
    #[must_use]
    pub fn latest(&self, metric: Metric) -> Option<DataPoint> {
        self.series(metric).and_then(MetricSeries::latest)
    }

    /// Total number of usable points across all metrics
    #[must_use]
    pub fn total_points(&self) -> usize {
        self.series.values().map(MetricSeries::len).sum()
    }

    /// Whether the record holds no usable point for any metric
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_points() == 0
    }
}

/// Incremental constructor for [`ClimateRecord`]
///
/// Applies the normalization rules: absent, non-finite and implausible
/// values are dropped and counted, points are sorted on `build`.
#[derive(Debug)]
pub struct ClimateRecordBuilder {
    location: ResolvedLocation,
    granularity: Granularity,
    series: BTreeMap<Metric, MetricSeries>,
    retrieved_at: DateTime<Utc>,
}

impl ClimateRecordBuilder {
    /// Create an empty builder
    #[must_use]
    pub fn new(location: ResolvedLocation, granularity: Granularity) -> Self {
        Self {
            location,
            granularity,
            series: BTreeMap::new(),
            retrieved_at: Utc::now(),
        }
    }

    /// Override the retrieval instant
    #[must_use]
    pub const fn retrieved_at(mut self, at: DateTime<Utc>) -> Self {
        self.retrieved_at = at;
        self
    }

    /// Record a provider value for a metric
    ///
    /// `None` stands for a missing provider value.
    pub fn push(&mut self, metric: Metric, timestamp: DateTime<Utc>, value: Option<f64>) {
        let series = self.series.entry(metric).or_insert_with(|| MetricSeries {
            unit: metric.unit(),
            points: Vec::new(),
            dropped_points: 0,
        });
        match value {
            Some(v) if metric.is_plausible(v) => series.points.push(DataPoint::new(timestamp, v)),
            _ => series.dropped_points += 1,
        }
    }

    /// Chaining variant of [`push`](Self::push)
    #[must_use]
    pub fn with(mut self, metric: Metric, timestamp: DateTime<Utc>, value: Option<f64>) -> Self {
        self.push(metric, timestamp, value);
        self
    }

    /// Finish the record
    #[must_use]
    pub fn build(mut self) -> ClimateRecord {
        for series in self.series.values_mut() {
            series.points.sort_by_key(|p| p.timestamp);
        }
        ClimateRecord {
            location: self.location,
            granularity: self.granularity,
            series: self.series,
            retrieved_at: self.retrieved_at,
        }
    }
}
