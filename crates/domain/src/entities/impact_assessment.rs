//! Sector impact assessment

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value_objects::{ConcernCategory, IndustrySector, Metric, Severity};

/// Severity and explanation for one concern category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryImpact {
    pub severity: Severity,
    pub rationale: String,
}

/// Verbal band for an overall impact score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImpactInterpretation {
    VeryNegative,
    Negative,
    SlightlyNegative,
    Neutral,
    Positive,
    VeryPositive,
}

impl ImpactInterpretation {
    /// Band for a score in [-10, 10]
    ///
    /// Bands: < -7, < -3, < 0, < 3, < 7, and everything above.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score < -7.0 {
            Self::VeryNegative
        } else if score < -3.0 {
            Self::Negative
        } else if score < 0.0 {
            Self::SlightlyNegative
        } else if score < 3.0 {
            Self::Neutral
        } else if score < 7.0 {
            Self::Positive
        } else {
            Self::VeryPositive
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::VeryNegative => "very negative",
            Self::Negative => "negative",
            Self::SlightlyNegative => "slightly negative",
            Self::Neutral => "neutral",
            Self::Positive => "positive",
            Self::VeryPositive => "very positive",
        }
    }
}

impl fmt::Display for ImpactInterpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Weighted overall score of how current conditions deviate from the norm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactScore {
    /// Score in [-10, 10]; negative means adverse for the sector
    pub value: f64,
    pub interpretation: ImpactInterpretation,
    /// Metrics that could not contribute because their data was missing
    pub unavailable: Vec<Metric>,
}

/// How the weather in a record affects one industry sector
///
/// Created once by the impact evaluator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactAssessment {
    pub sector: IndustrySector,
    pub impacts: BTreeMap<ConcernCategory, CategoryImpact>,
    pub score: Option<ImpactScore>,
}

impl ImpactAssessment {
    /// Impact for a category, if the sector's table covers it
    #[must_use]
    pub fn get(&self, category: ConcernCategory) -> Option<&CategoryImpact> {
        self.impacts.get(&category)
    }

    /// Severity for a category, `DataUnavailable` when not covered
    #[must_use]
    pub fn severity(&self, category: ConcernCategory) -> Severity {
        self.get(category)
            .map_or(Severity::DataUnavailable, |impact| impact.severity)
    }

    /// Worst judged severity across all categories
    #[must_use]
    pub fn highest_severity(&self) -> Severity {
        self.impacts
            .values()
            .map(|impact| impact.severity)
            .fold(Severity::DataUnavailable, Severity::worst)
    }
}
