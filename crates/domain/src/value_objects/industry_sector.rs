//! Industry sector value object

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::errors::DomainError;

/// Industry whose exposure to weather is being assessed
///
/// Selects the threshold table the impact evaluator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndustrySector {
    Agriculture,
    Energy,
    Transportation,
    Tourism,
    Construction,
    Retail,
}

impl IndustrySector {
    /// Every supported sector, in display order
    pub const ALL: [Self; 6] = [
        Self::Agriculture,
        Self::Energy,
        Self::Transportation,
        Self::Tourism,
        Self::Construction,
        Self::Retail,
    ];

    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Agriculture => "Agriculture",
            Self::Energy => "Energy",
            Self::Transportation => "Transportation",
            Self::Tourism => "Tourism",
            Self::Construction => "Construction",
            Self::Retail => "Retail",
        }
    }

    /// Labels of all supported sectors
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::label).collect()
    }
}

impl fmt::Display for IndustrySector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for IndustrySector {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|sector| sector.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::UnsupportedSector(wanted.to_string()))
    }
}
