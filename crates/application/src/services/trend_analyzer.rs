//! Trend analyzer - descriptive statistics over a climate window
//!
//! Pure computation: least-squares slope, population standard deviation and
//! z-score anomalies. Nothing here performs I/O or keeps state between calls.

use domain::{
    Anomaly, ClimateRecord, DataPoint, Metric, MetricTrend, TrendDirection, TrendStatistics,
    TrendSummary,
};
use serde::{Deserialize, Serialize};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Tuning for trend classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendConfig {
    /// Slopes whose magnitude stays within this band (units per day) are flat
    #[serde(default = "default_flat_band")]
    pub flat_band_per_day: f64,
    /// Points further than this many standard deviations from the mean are anomalies
    #[serde(default = "default_anomaly_threshold")]
    pub anomaly_threshold: f64,
}

const fn default_flat_band() -> f64 {
    0.01
}

const fn default_anomaly_threshold() -> f64 {
    2.0
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            flat_band_per_day: default_flat_band(),
            anomaly_threshold: default_anomaly_threshold(),
        }
    }
}

/// Computes per-metric trends
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendAnalyzer {
    config: TrendConfig,
}

impl TrendAnalyzer {
    /// Create an analyzer with the given tuning
    pub const fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    /// Active tuning
    pub const fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// Analyze one time-ordered series
    ///
    /// Fewer than two points yields [`MetricTrend::InsufficientData`].
    #[allow(clippy::cast_precision_loss)]
    pub fn analyze(&self, series: &[DataPoint]) -> MetricTrend {
        if series.len() < 2 {
            return MetricTrend::InsufficientData {
                points: series.len(),
            };
        }

        let count = series.len() as f64;
        let values: Vec<f64> = series.iter().map(|p| p.value).collect();
        let mean = values.iter().sum::<f64>() / count;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count;
        let std_dev = variance.sqrt();

        let slope_per_day = least_squares_slope(series);
        let direction = self.direction(&values, slope_per_day);

        let first = values[0];
        let last = values[values.len() - 1];
        let change_percent = (first != 0.0).then(|| (last - first) / first.abs() * 100.0);

        let anomalies = if std_dev > 0.0 {
            series
                .iter()
                .filter_map(|p| {
                    let z_score = (p.value - mean) / std_dev;
                    (z_score.abs() > self.config.anomaly_threshold).then_some(Anomaly {
                        timestamp: p.timestamp,
                        value: p.value,
                        z_score,
                    })
                })
                .collect()
        } else {
            Vec::new()
        };

        MetricTrend::Computed(TrendStatistics {
            points: series.len(),
            min,
            max,
            mean,
            std_dev,
            slope_per_day,
            direction,
            change_percent,
            anomalies,
        })
    }

    /// Analyze every metric of a record
    ///
    /// Metrics absent from the record are reported with zero points.
    pub fn summarize(&self, record: &ClimateRecord) -> TrendSummary {
        let metrics = Metric::ALL
            .iter()
            .map(|&metric| {
                let trend = record.series(metric).map_or(
                    MetricTrend::InsufficientData { points: 0 },
                    |series| self.analyze(&series.points),
                );
                (metric, trend)
            })
            .collect();
        TrendSummary { metrics }
    }

    fn direction(&self, values: &[f64], slope_per_day: f64) -> TrendDirection {
        if values.windows(2).all(|w| w[1] > w[0]) {
            return TrendDirection::Increasing;
        }
        if values.windows(2).all(|w| w[1] < w[0]) {
            return TrendDirection::Decreasing;
        }
        if slope_per_day > self.config.flat_band_per_day {
            TrendDirection::Increasing
        } else if slope_per_day < -self.config.flat_band_per_day {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Flat
        }
    }
}

/// Ordinary least-squares slope in value units per day
///
/// Returns 0 when all timestamps coincide.
#[allow(clippy::cast_precision_loss)]
fn least_squares_slope(series: &[DataPoint]) -> f64 {
    let origin = series[0].timestamp;
    let xs: Vec<f64> = series
        .iter()
        .map(|p| (p.timestamp - origin).num_seconds() as f64 / SECONDS_PER_DAY)
        .collect();
    let count = series.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / count;
    let mean_y = series.iter().map(|p| p.value).sum::<f64>() / count;

    let (mut numerator, mut denominator) = (0.0, 0.0);
    for (x, point) in xs.iter().zip(series) {
        numerator += (x - mean_x) * (point.value - mean_y);
        denominator += (x - mean_x).powi(2);
    }

    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
