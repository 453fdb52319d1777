//! Statistical trend summaries

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Metric;

/// Sign of a series' regression slope after the flat band is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Flat,
}

impl TrendDirection {
    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Increasing => "increasing",
            Self::Decreasing => "decreasing",
            Self::Flat => "flat",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A point that lies unusually far from the window mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    /// Signed distance from the mean in standard deviations
    pub z_score: f64,
}

/// Statistics of a series with at least two points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendStatistics {
    pub points: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Least-squares slope in units per day
    pub slope_per_day: f64,
    pub direction: TrendDirection,
    /// Change from first to last value relative to the first; absent when the first value is zero
    pub change_percent: Option<f64>,
    pub anomalies: Vec<Anomaly>,
}

/// Trend outcome for one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricTrend {
    /// Fewer than two usable points; no trend is reported
    InsufficientData { points: usize },
    /// Statistics over the window
    Computed(TrendStatistics),
}

impl MetricTrend {
    /// Statistics, if enough data was available
    #[must_use]
    pub const fn statistics(&self) -> Option<&TrendStatistics> {
        match self {
            Self::Computed(stats) => Some(stats),
            Self::InsufficientData { .. } => None,
        }
    }

    /// Trend direction, if enough data was available
    #[must_use]
    pub fn direction(&self) -> Option<TrendDirection> {
        self.statistics().map(|stats| stats.direction)
    }
}

/// Per-metric trends over one climate record window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub metrics: BTreeMap<Metric, MetricTrend>,
}

impl TrendSummary {
    /// Trend for a metric
    #[must_use]
    pub fn get(&self, metric: Metric) -> Option<&MetricTrend> {
        self.metrics.get(&metric)
    }

    /// Direction for a metric, if computed
    #[must_use]
    pub fn direction(&self, metric: Metric) -> Option<TrendDirection> {
        self.get(metric).and_then(MetricTrend::direction)
    }

    /// Whether any metric has flagged anomalies
    #[must_use]
    pub fn has_anomalies(&self) -> bool {
        self.metrics
            .values()
            .filter_map(MetricTrend::statistics)
            .any(|stats| !stats.anomalies.is_empty())
    }
}
