//! Impact severity and concern categories

use serde::{Deserialize, Serialize};
use std::fmt;

/// How strongly a weather condition affects a concern
///
/// `DataUnavailable` is not part of the low..critical scale; it marks a
/// concern that could not be judged because the underlying metric was
/// missing or implausible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Moderate,
    High,
    Critical,
    DataUnavailable,
}

impl Severity {
    /// Position on the low..critical scale, `None` for missing data
    #[must_use]
    pub const fn rank(&self) -> Option<u8> {
        match self {
            Self::Low => Some(0),
            Self::Moderate => Some(1),
            Self::High => Some(2),
            Self::Critical => Some(3),
            Self::DataUnavailable => None,
        }
    }

    /// Whether the severity was derived from actual data
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.rank().is_some()
    }

    /// The more severe of two judged severities
    ///
    /// A judged severity always wins over `DataUnavailable`.
    #[must_use]
    pub fn worst(self, other: Self) -> Self {
        match (self.rank(), other.rank()) {
            (Some(a), Some(b)) if b > a => other,
            (None, Some(_)) => other,
            _ => self,
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Critical => "critical",
            Self::DataUnavailable => "data unavailable",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Category of business concern an impact is reported under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcernCategory {
    Operational,
    Safety,
    Economic,
    ResourceEfficiency,
}

impl ConcernCategory {
    /// All categories in report order
    pub const ALL: [Self; 4] = [
        Self::Operational,
        Self::Safety,
        Self::Economic,
        Self::ResourceEfficiency,
    ];

    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Operational => "operational",
            Self::Safety => "safety",
            Self::Economic => "economic",
            Self::ResourceEfficiency => "resource efficiency",
        }
    }
}

impl fmt::Display for ConcernCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
