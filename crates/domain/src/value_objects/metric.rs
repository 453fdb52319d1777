//! Weather metrics and their normalized units

use serde::{Deserialize, Serialize};
use std::fmt;

/// A weather quantity tracked in a climate record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Temperature,
    Precipitation,
    Humidity,
    Wind,
}

impl Metric {
    /// All metrics in canonical order
    pub const ALL: [Self; 4] = [
        Self::Temperature,
        Self::Precipitation,
        Self::Humidity,
        Self::Wind,
    ];

    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Precipitation => "precipitation",
            Self::Humidity => "humidity",
            Self::Wind => "wind",
        }
    }

    /// The unit every value of this metric is normalized to
    #[must_use]
    pub const fn unit(&self) -> MetricUnit {
        match self {
            Self::Temperature => MetricUnit::Celsius,
            Self::Precipitation => MetricUnit::Millimeters,
            Self::Humidity => MetricUnit::Percent,
            Self::Wind => MetricUnit::MetersPerSecond,
        }
    }

    /// Physically plausible range (inclusive) for a normalized value
    #[must_use]
    pub const fn plausible_range(&self) -> (f64, f64) {
        match self {
            Self::Temperature => (-90.0, 60.0),
            Self::Precipitation => (0.0, 10_000.0),
            Self::Humidity => (0.0, 100.0),
            Self::Wind => (0.0, 120.0),
        }
    }

    /// Whether a normalized value is finite and inside the plausible range
    #[must_use]
    pub fn is_plausible(&self, value: f64) -> bool {
        let (min, max) = self.plausible_range();
        value.is_finite() && (min..=max).contains(&value)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized measurement unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    Celsius,
    Millimeters,
    Percent,
    MetersPerSecond,
}

impl MetricUnit {
    /// Short unit symbol
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Millimeters => "mm",
            Self::Percent => "%",
            Self::MetersPerSecond => "m/s",
        }
    }
}

impl fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
