//! Impact evaluator - maps a climate record onto a sector's threshold table
//!
//! Evaluation is a pure function of the record, the sector and the catalog.
//! Missing data never raises an error; it surfaces as
//! [`Severity::DataUnavailable`] with a rationale saying what was missing.

use std::{collections::BTreeMap, sync::Arc};

use domain::{
    CategoryImpact, ClimateRecord, ConcernCategory, ImpactAssessment, ImpactInterpretation,
    ImpactScore, IndustrySector, Metric, Severity,
};

use super::thresholds::{Measure, ScoreFactors, SignedFactor, ThresholdCatalog, ThresholdRule};

/// Components of the overall score bounded to this magnitude
const COMPONENT_LIMIT: f64 = 10.0;

/// Evaluates sector impact from static threshold tables
#[derive(Debug, Clone)]
pub struct ImpactEvaluator {
    catalog: Arc<ThresholdCatalog>,
}

impl Default for ImpactEvaluator {
    fn default() -> Self {
        Self::new(Arc::new(ThresholdCatalog::builtin()))
    }
}

impl ImpactEvaluator {
    /// Create an evaluator over a validated catalog
    pub const fn new(catalog: Arc<ThresholdCatalog>) -> Self {
        Self { catalog }
    }

    /// The catalog in use
    pub fn catalog(&self) -> &ThresholdCatalog {
        &self.catalog
    }

    /// Assess how the record's weather affects a sector
    pub fn evaluate(&self, record: &ClimateRecord, sector: IndustrySector) -> ImpactAssessment {
        let Some(table) = self.catalog.table(sector) else {
            return ImpactAssessment {
                sector,
                impacts: ConcernCategory::ALL
                    .iter()
                    .map(|&category| {
                        (
                            category,
                            CategoryImpact {
                                severity: Severity::DataUnavailable,
                                rationale: format!("No threshold table for {sector}."),
                            },
                        )
                    })
                    .collect(),
                score: None,
            };
        };

        let impacts = ConcernCategory::ALL
            .iter()
            .map(|&category| {
                let mut severity = Severity::DataUnavailable;
                let mut outcomes = Vec::new();
                for rule in table.rules_for(category) {
                    let (judged, sentence) = judge(rule, measure(record, rule.metric, rule.measure));
                    severity = severity.worst(judged);
                    outcomes.push(sentence);
                }

                let rationale = if outcomes.is_empty() {
                    format!("No thresholds configured for {category}.")
                } else {
                    outcomes.join(" ")
                };

                (category, CategoryImpact { severity, rationale })
            })
            .collect::<BTreeMap<_, _>>();

        ImpactAssessment {
            sector,
            impacts,
            score: overall_score(record, &table.score),
        }
    }

    /// Outlook for a weather condition group in a sector
    pub fn condition_outlook(&self, sector: IndustrySector, condition: &str) -> Option<String> {
        self.catalog
            .condition_outlook(sector, condition)
            .map(str::to_string)
    }
}

/// Read the value a rule judges, `None` when the data is missing
fn measure(record: &ClimateRecord, metric: Metric, measure: Measure) -> Option<f64> {
    let series = record.series(metric)?;
    let latest = series.latest()?.value;
    if !metric.is_plausible(latest) {
        return None;
    }
    let value = match measure {
        Measure::Level => latest,
        Measure::Deviation => latest - series.mean()?,
    };
    value.is_finite().then_some(value)
}

/// Severity for a distance outside the comfortable range
fn severity_for(rule: &ThresholdRule, distance: f64) -> Severity {
    let [moderate, high, critical] = rule.steps;
    if distance <= 0.0 {
        Severity::Low
    } else if distance >= critical {
        Severity::Critical
    } else if distance >= high {
        Severity::High
    } else if distance >= moderate {
        Severity::Moderate
    } else {
        Severity::Low
    }
}

fn judge(rule: &ThresholdRule, value: Option<f64>) -> (Severity, String) {
    let metric = capitalize(rule.metric.label());
    let unit = rule.metric.unit().symbol();

    let Some(value) = value else {
        return (
            Severity::DataUnavailable,
            format!("No usable {} data ({}).", rule.metric, rule.concern),
        );
    };

    let subject = match rule.measure {
        Measure::Level => format!("{metric} at {value:.1} {unit}"),
        Measure::Deviation => {
            format!("{metric} deviation of {value:+.1} {unit} from the window mean")
        },
    };

    let distance = rule.distance(value);
    let severity = severity_for(rule, distance);

    let position = match (rule.comfort_min, rule.comfort_max) {
        _ if distance <= 0.0 => "is within the comfortable range".to_string(),
        (_, Some(max)) if value > max => {
            format!("is {distance:.1} {unit} above the comfortable maximum of {max:.1} {unit}")
        },
        (Some(min), _) => {
            format!("is {distance:.1} {unit} below the comfortable minimum of {min:.1} {unit}")
        },
        (None, _) => format!("is {distance:.1} {unit} outside the comfortable range"),
    };

    (
        severity,
        format!("{subject} {position} ({}): {severity}.", rule.concern),
    )
}

/// Weighted deviation score; components without data contribute 0
fn overall_score(record: &ClimateRecord, factors: &ScoreFactors) -> Option<ImpactScore> {
    let components: [(Metric, SignedFactor, f64); 3] = [
        (Metric::Temperature, factors.temperature, 0.5),
        (Metric::Humidity, factors.humidity, 0.3),
        (Metric::Wind, factors.wind, 0.2),
    ];

    let mut value = 0.0;
    let mut unavailable = Vec::new();
    for (metric, factor, weight) in components {
        match measure(record, metric, Measure::Deviation) {
            Some(deviation) => {
                value += weight * factor.apply(deviation).clamp(-COMPONENT_LIMIT, COMPONENT_LIMIT);
            },
            None => unavailable.push(metric),
        }
    }

    (unavailable.len() < components.len()).then(|| ImpactScore {
        value,
        interpretation: ImpactInterpretation::from_score(value),
        unavailable,
    })
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
