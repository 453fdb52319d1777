//! Location lookup value objects

use serde::{Deserialize, Serialize};
use std::fmt;

use super::GeoLocation;
use crate::errors::DomainError;

/// Longest place name accepted for lookup
pub const MAX_LOCATION_LEN: usize = 200;

/// A free-text place name supplied by the user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocationQuery(String);

impl LocationQuery {
    /// Create a query from user input
    ///
    /// # Errors
    ///
    /// Returns `EmptyLocation` for blank input and `ValidationError` when the
    /// text exceeds [`MAX_LOCATION_LEN`] characters.
    pub fn new(text: impl AsRef<str>) -> Result<Self, DomainError> {
        let trimmed = text.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyLocation);
        }
        if trimmed.chars().count() > MAX_LOCATION_LEN {
            return Err(DomainError::validation(format!(
                "location exceeds {MAX_LOCATION_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The trimmed query text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LocationQuery {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LocationQuery> for String {
    fn from(query: LocationQuery) -> Self {
        query.0
    }
}

/// A query after geocoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    /// What the user asked for
    pub query: LocationQuery,
    /// Coordinates returned by the geocoder
    pub coordinates: GeoLocation,
    /// Place name as reported by the geocoder
    pub name: String,
    /// ISO country code, if known
    pub country: Option<String>,
    /// State or region, if known
    pub state: Option<String>,
}

impl ResolvedLocation {
    /// Create a resolved location
    #[must_use]
    pub fn new(query: LocationQuery, coordinates: GeoLocation, name: impl Into<String>) -> Self {
        Self {
            query,
            coordinates,
            name: name.into(),
            country: None,
            state: None,
        }
    }

    /// Attach a country code
    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Attach a state or region
    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Name, state and country joined for display, e.g. "Springfield, Illinois, US"
    #[must_use]
    pub fn display_name(&self) -> String {
        [Some(self.name.as_str()), self.state.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ResolvedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name(), self.coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_trimmed() {
        let query = LocationQuery::new("  Nairobi ").unwrap();
        assert_eq!(query.as_str(), "Nairobi");
    }

    #[test]
    fn blank_query_rejected() {
        assert!(matches!(
            LocationQuery::new("   "),
            Err(DomainError::EmptyLocation)
        ));
    }

    #[test]
    fn overlong_query_rejected() {
        let text = "x".repeat(MAX_LOCATION_LEN + 1);
        assert!(matches!(
            LocationQuery::new(text),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn query_deserialization_validates() {
        let ok: LocationQuery = serde_json::from_str("\" Lima \"").unwrap();
        assert_eq!(ok.as_str(), "Lima");
        assert!(serde_json::from_str::<LocationQuery>("\"\"").is_err());
    }

    #[test]
    fn display_name_skips_missing_parts() {
        let coords = GeoLocation::new(39.78, -89.65).unwrap();
        let query = LocationQuery::new("Springfield").unwrap();
        let plain = ResolvedLocation::new(query.clone(), coords, "Springfield");
        assert_eq!(plain.display_name(), "Springfield");

        let full = ResolvedLocation::new(query, coords, "Springfield")
            .with_state("Illinois")
            .with_country("US");
        assert_eq!(full.display_name(), "Springfield, Illinois, US");
        assert!(full.to_string().contains("39.7800"));
    }
}
