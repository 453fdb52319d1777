//! Threshold tables for the impact evaluator
//!
//! The tables are plain data: the built-in catalog below can be replaced
//! wholesale by a TOML file loaded in the infrastructure layer, and both go
//! through [`ThresholdCatalog::validate`] before use.

use std::collections::BTreeMap;

use domain::{ConcernCategory, IndustrySector, Metric};
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Which reading of a metric a rule judges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    /// Most recent value in the window
    Level,
    /// Most recent value minus the window mean
    Deviation,
}

/// One metric check contributing to a concern category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub metric: Metric,
    pub category: ConcernCategory,
    pub measure: Measure,
    /// Lower edge of the comfortable range; absent means unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comfort_min: Option<f64>,
    /// Upper edge of the comfortable range; absent means unbounded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comfort_max: Option<f64>,
    /// Distances outside the range for moderate, high and critical
    pub steps: [f64; 3],
    /// What the rule protects against, used in rationales
    pub concern: String,
}

impl ThresholdRule {
    /// How far `value` lies outside the comfortable range, 0 inside it
    #[must_use]
    pub fn distance(&self, value: f64) -> f64 {
        if let Some(min) = self.comfort_min {
            if value < min {
                return min - value;
            }
        }
        if let Some(max) = self.comfort_max {
            if value > max {
                return value - max;
            }
        }
        0.0
    }
}

/// Multiplier applied to a deviation depending on its sign
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignedFactor {
    /// Factor for deviations above the norm
    pub above: f64,
    /// Factor for deviations at or below the norm
    pub below: f64,
}

impl SignedFactor {
    /// Factor that ignores the sign
    pub const fn uniform(factor: f64) -> Self {
        Self {
            above: factor,
            below: factor,
        }
    }

    /// Apply to a deviation
    #[must_use]
    pub fn apply(&self, deviation: f64) -> f64 {
        if deviation > 0.0 {
            deviation * self.above
        } else {
            deviation * self.below
        }
    }
}

/// Factors for the overall impact score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreFactors {
    pub temperature: SignedFactor,
    pub humidity: SignedFactor,
    pub wind: SignedFactor,
}

impl Default for ScoreFactors {
    fn default() -> Self {
        Self {
            temperature: SignedFactor::uniform(-1.0),
            humidity: SignedFactor::uniform(-0.5),
            wind: SignedFactor::uniform(-1.0),
        }
    }
}

/// Everything the evaluator knows about one sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorTable {
    #[serde(default)]
    pub rules: Vec<ThresholdRule>,
    #[serde(default)]
    pub score: ScoreFactors,
    /// Outlook text keyed by weather condition group ("Rain", "Clear", ...)
    #[serde(default)]
    pub conditions: BTreeMap<String, String>,
}

impl SectorTable {
    /// Rules contributing to one category
    pub fn rules_for(&self, category: ConcernCategory) -> impl Iterator<Item = &ThresholdRule> {
        self.rules.iter().filter(move |r| r.category == category)
    }
}

/// Threshold tables for every sector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdCatalog {
    pub sectors: BTreeMap<IndustrySector, SectorTable>,
}

impl Default for ThresholdCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ThresholdCatalog {
    /// Table for a sector
    #[must_use]
    pub fn table(&self, sector: IndustrySector) -> Option<&SectorTable> {
        self.sectors.get(&sector)
    }

    /// Outlook text for a weather condition in a sector
    #[must_use]
    pub fn condition_outlook(&self, sector: IndustrySector, condition: &str) -> Option<&str> {
        self.table(sector)?
            .conditions
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(condition))
            .map(|(_, text)| text.as_str())
    }

    /// Check that the catalog is usable
    ///
    /// Every sector needs a table; steps must be finite, non-negative and
    /// non-decreasing; comfort bounds must be ordered.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        for sector in IndustrySector::ALL {
            let table = self.table(sector).ok_or_else(|| {
                ApplicationError::Configuration(format!("no threshold table for sector {sector}"))
            })?;

            for (index, rule) in table.rules.iter().enumerate() {
                let invalid = |reason: &str| {
                    ApplicationError::Configuration(format!(
                        "{sector} rule {} ({} / {}): {reason}",
                        index + 1,
                        rule.metric,
                        rule.category
                    ))
                };

                if rule.steps.iter().any(|s| !s.is_finite() || *s < 0.0) {
                    return Err(invalid("steps must be finite and non-negative"));
                }
                if rule.steps.windows(2).any(|w| w[1] < w[0]) {
                    return Err(invalid("steps must be non-decreasing"));
                }
                if rule.comfort_min.is_some_and(|v| !v.is_finite())
                    || rule.comfort_max.is_some_and(|v| !v.is_finite())
                {
                    return Err(invalid("comfort bounds must be finite"));
                }
                if let (Some(min), Some(max)) = (rule.comfort_min, rule.comfort_max) {
                    if min > max {
                        return Err(invalid("comfort_min must not exceed comfort_max"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Built-in tables covering every sector and concern category
    #[must_use]
    #[rustfmt::skip]
    pub fn builtin() -> Self {
        use ConcernCategory::{Economic, Operational, ResourceEfficiency, Safety};
        use Measure::{Deviation, Level};
        use Metric::{Humidity, Precipitation, Temperature, Wind};

        let mut sectors = BTreeMap::new();

        sectors.insert(
            IndustrySector::Agriculture,
            SectorTable {
                rules: vec![
                    rule(Temperature, Operational, Level, Some(10.0), Some(30.0), [1.0, 4.0, 8.0], "heat or frost stress on crops and field work"),
                    rule(Wind, Operational, Level, None, Some(10.0), [1.0, 4.0, 8.0], "wind damage and spray drift"),
                    rule(Temperature, Safety, Level, None, Some(35.0), [1.0, 3.0, 6.0], "heat exposure of field workers"),
                    rule(Precipitation, Economic, Deviation, Some(-40.0), Some(40.0), [1.0, 30.0, 80.0], "drought or flooding affecting yields"),
                    rule(Humidity, ResourceEfficiency, Level, Some(40.0), Some(80.0), [1.0, 10.0, 20.0], "irrigation demand and plant disease pressure"),
                ],
                score: ScoreFactors {
                    temperature: SignedFactor { above: -2.5, below: -1.5 },
                    humidity: SignedFactor { above: -1.8, below: -1.2 },
                    wind: SignedFactor { above: -1.5, below: 0.8 },
                },
                conditions: conditions(&[
                    ("Clear", "optimal conditions for field operations"),
                    ("Clouds", "suitable conditions for most agricultural activities"),
                    ("Rain", "beneficial for crop growth but may limit field operations"),
                    ("Snow", "risk of frost damage to crops"),
                    ("Thunderstorm", "risk of crop damage and unsafe for field operations"),
                    ("Mist", "increased disease risk for sensitive crops"),
                    ("Fog", "limited visibility for agricultural operations"),
                ]),
            },
        );

        sectors.insert(
            IndustrySector::Energy,
            SectorTable {
                rules: vec![
                    rule(Temperature, Operational, Deviation, Some(-3.0), Some(3.0), [1.0, 4.0, 8.0], "heating and cooling demand swings"),
                    rule(Wind, Safety, Level, None, Some(20.0), [1.0, 5.0, 10.0], "storm load on grid infrastructure"),
                    rule(Temperature, Economic, Level, Some(0.0), Some(30.0), [1.0, 5.0, 10.0], "peak load pricing"),
                    rule(Wind, ResourceEfficiency, Level, Some(3.0), Some(25.0), [0.5, 1.5, 2.5], "wind generation output"),
                    rule(Humidity, ResourceEfficiency, Level, None, Some(85.0), [1.0, 5.0, 10.0], "cooling efficiency"),
                ],
                score: ScoreFactors {
                    temperature: SignedFactor::uniform(0.5),
                    humidity: SignedFactor::uniform(-0.5),
                    wind: SignedFactor { above: 1.5, below: -0.5 },
                },
                conditions: conditions(&[
                    ("Clear", "optimal for solar energy production"),
                    ("Clouds", "reduced solar energy generation"),
                    ("Rain", "reduced solar efficiency, normal wind operations"),
                    ("Snow", "potential system stress, reduced efficiency"),
                    ("Thunderstorm", "risk to infrastructure, emergency protocols needed"),
                    ("Mist", "reduced solar generation efficiency"),
                    ("Fog", "significant reduction in solar energy production"),
                ]),
            },
        );

        sectors.insert(
            IndustrySector::Transportation,
            SectorTable {
                rules: vec![
                    rule(Precipitation, Operational, Deviation, None, Some(30.0), [1.0, 30.0, 60.0], "wet roads and schedule delays"),
                    rule(Wind, Safety, Level, None, Some(15.0), [1.0, 5.0, 10.0], "crosswinds and debris"),
                    rule(Temperature, Safety, Level, Some(0.0), None, [0.5, 3.0, 8.0], "ice on roads and rails"),
                    rule(Temperature, Economic, Level, Some(-5.0), Some(35.0), [1.0, 5.0, 10.0], "fuel use and service disruption"),
                    rule(Humidity, ResourceEfficiency, Level, None, Some(90.0), [1.0, 5.0, 10.0], "fog and reduced visibility"),
                ],
                score: ScoreFactors::default(),
                conditions: generic_conditions(IndustrySector::Transportation),
            },
        );

        sectors.insert(
            IndustrySector::Tourism,
            SectorTable {
                rules: vec![
                    rule(Precipitation, Operational, Deviation, None, Some(20.0), [1.0, 20.0, 50.0], "outdoor activity cancellations"),
                    rule(Temperature, Safety, Level, None, Some(33.0), [1.0, 4.0, 8.0], "heat illness among visitors"),
                    rule(Temperature, Economic, Level, Some(15.0), Some(30.0), [1.0, 5.0, 10.0], "visitor demand"),
                    rule(Humidity, ResourceEfficiency, Level, Some(30.0), Some(70.0), [1.0, 10.0, 20.0], "cooling and water use in facilities"),
                ],
                score: ScoreFactors::default(),
                conditions: generic_conditions(IndustrySector::Tourism),
            },
        );

        sectors.insert(
            IndustrySector::Construction,
            SectorTable {
                rules: vec![
                    rule(Precipitation, Operational, Deviation, None, Some(20.0), [1.0, 20.0, 50.0], "site stoppages and concrete curing"),
                    rule(Wind, Safety, Level, None, Some(12.0), [1.0, 4.0, 8.0], "crane and scaffold operations"),
                    rule(Temperature, Safety, Level, Some(0.0), Some(32.0), [1.0, 4.0, 8.0], "worker heat and cold exposure"),
                    rule(Temperature, Economic, Level, Some(5.0), None, [1.0, 5.0, 10.0], "cold-weather work premiums"),
                    rule(Humidity, ResourceEfficiency, Level, None, Some(85.0), [1.0, 5.0, 10.0], "drying times for materials"),
                ],
                score: ScoreFactors::default(),
                conditions: generic_conditions(IndustrySector::Construction),
            },
        );

        sectors.insert(
            IndustrySector::Retail,
            SectorTable {
                rules: vec![
                    rule(Precipitation, Operational, Deviation, None, Some(30.0), [1.0, 30.0, 60.0], "store footfall and deliveries"),
                    rule(Wind, Safety, Level, None, Some(18.0), [1.0, 5.0, 10.0], "storefront and signage damage"),
                    rule(Temperature, Economic, Deviation, Some(-4.0), Some(4.0), [1.0, 3.0, 6.0], "seasonal demand shifts"),
                    rule(Temperature, ResourceEfficiency, Level, Some(5.0), Some(28.0), [1.0, 5.0, 10.0], "store heating and cooling energy"),
                ],
                score: ScoreFactors::default(),
                conditions: generic_conditions(IndustrySector::Retail),
            },
        );

        Self { sectors }
    }
}

fn rule(
    metric: Metric,
    category: ConcernCategory,
    measure: Measure,
    comfort_min: Option<f64>,
    comfort_max: Option<f64>,
    steps: [f64; 3],
    concern: &str,
) -> ThresholdRule {
    ThresholdRule {
        metric,
        category,
        measure,
        comfort_min,
        comfort_max,
        steps,
        concern: concern.to_string(),
    }
}

fn conditions(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(name, text)| ((*name).to_string(), (*text).to_string()))
        .collect()
}

fn generic_conditions(sector: IndustrySector) -> BTreeMap<String, String> {
    let name = sector.label();
    conditions(&[
        ("Clear", &format!("optimal conditions for {name} operations")),
        ("Clouds", &format!("normal operating conditions for {name}")),
        ("Rain", &format!("some operational adjustments needed in {name}")),
        ("Snow", &format!("significant impact on {name} operations")),
        ("Thunderstorm", &format!("severe disruption to {name} operations")),
        ("Mist", &format!("minor impacts on {name} visibility")),
        ("Fog", &format!("reduced visibility affecting {name} operations")),
    ])
}
