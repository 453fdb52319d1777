//! Horizon-tagged recommendations

use std::fmt;

use serde::{Deserialize, Serialize};

/// Planning horizon a suggestion targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Horizon {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl Horizon {
    /// All horizons, nearest first
    pub const ALL: [Self; 3] = [Self::ShortTerm, Self::MediumTerm, Self::LongTerm];

    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ShortTerm => "short-term",
            Self::MediumTerm => "medium-term",
            Self::LongTerm => "long-term",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single actionable suggestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub horizon: Horizon,
    pub text: String,
}

/// Final artifact of an analysis: ordered suggestions plus risk notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    suggestions: Vec<Suggestion>,
    risk_mitigation: Vec<String>,
    model: String,
}

impl Recommendation {
    /// Create a recommendation; suggestions are ordered by horizon, keeping
    /// their relative order within a horizon
    #[must_use]
    pub fn new(
        mut suggestions: Vec<Suggestion>,
        risk_mitigation: Vec<String>,
        model: impl Into<String>,
    ) -> Self {
        suggestions.sort_by_key(|s| s.horizon);
        Self {
            suggestions,
            risk_mitigation,
            model: model.into(),
        }
    }

    /// All suggestions, nearest horizon first
    #[must_use]
    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// Suggestions for one horizon
    pub fn for_horizon(&self, horizon: Horizon) -> impl Iterator<Item = &Suggestion> {
        self.suggestions.iter().filter(move |s| s.horizon == horizon)
    }

    /// Risk-mitigation notes
    #[must_use]
    pub fn risk_mitigation(&self) -> &[String] {
        &self.risk_mitigation
    }

    /// Model that wrote the narrative
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}
