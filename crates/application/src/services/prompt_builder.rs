//! Prompt construction for the narrative stages
//!
//! Prompts are assembled from already-computed structured results so the
//! model only has to write prose; it never sees raw provider payloads.

use std::fmt::Write as _;

use domain::{
    ClimateRecord, ImpactAssessment, IndustrySector, Metric, MetricTrend, ResolvedLocation,
    TrendSummary,
};

use crate::ports::CurrentWeather;

/// System prompt for the impact narrative
pub const IMPACT_ANALYST_SYSTEM: &str = "You are an impact assessment specialist. You explain \
how weather conditions affect specific business sectors in clear, factual language. Base every \
statement on the data provided and do not invent measurements.";

/// System prompt for the recommendation stage
pub const ADVISOR_SYSTEM: &str = "You are a weather advisory specialist. You turn climate \
analyses and impact assessments into practical, actionable recommendations that help \
organizations adapt their operations and mitigate weather-related risks.";

/// Heading lines the recommendation parser recognises, in prompt order
pub const SECTION_HEADINGS: [&str; 4] = [
    "Short-term:",
    "Medium-term:",
    "Long-term:",
    "Risk mitigation:",
];

/// Structured results of the first two stages
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub location: &'a ResolvedLocation,
    pub sector: IndustrySector,
    pub record: &'a ClimateRecord,
    pub current: &'a CurrentWeather,
    pub trends: &'a TrendSummary,
    pub assessment: &'a ImpactAssessment,
    pub condition_outlook: Option<&'a str>,
    pub concerns: Option<&'a str>,
}

/// Prompt asking for a short narrative about the impact assessment
pub fn impact_prompt(ctx: &PromptContext<'_>) -> String {
    let mut prompt = String::new();
    write_data_sections(&mut prompt, ctx);
    if let Some(concerns) = ctx.concerns {
        let _ = writeln!(prompt, "Specific concerns: {concerns}\n");
    }
    let _ = writeln!(
        prompt,
        "In one or two short paragraphs, explain what these conditions mean for the {} sector \
         in {}: operational impacts, resource efficiency, safety and economic implications. \
         Do not give recommendations yet.",
        ctx.sector,
        ctx.location.display_name()
    );
    prompt
}

/// Prompt asking for horizon-tagged recommendations
pub fn recommendation_prompt(ctx: &PromptContext<'_>, impact_narrative: Option<&str>) -> String {
    let mut prompt = String::new();
    write_data_sections(&mut prompt, ctx);

    if let Some(narrative) = impact_narrative {
        let _ = writeln!(prompt, "Impact analysis:\n{}\n", narrative.trim());
    }
    match ctx.concerns {
        Some(concerns) => {
            let _ = writeln!(prompt, "Specific concerns to address: {concerns}\n");
        },
        None => {
            let _ = writeln!(prompt, "No specific concerns were given.\n");
        },
    }

    let _ = writeln!(
        prompt,
        "Provide specific, actionable recommendations for the {} sector in {}. \
         Answer with exactly these four sections, each heading on its own line and followed \
         by bullet points starting with \"- \":",
        ctx.sector,
        ctx.location.display_name()
    );
    for heading in SECTION_HEADINGS {
        let _ = writeln!(prompt, "{heading}");
    }
    prompt
}

fn write_data_sections(prompt: &mut String, ctx: &PromptContext<'_>) {
    let _ = writeln!(
        prompt,
        "Location: {} ({})",
        ctx.location.display_name(),
        ctx.location.coordinates
    );
    let _ = writeln!(prompt, "Sector: {}", ctx.sector);
    let _ = writeln!(
        prompt,
        "Data window: {} data, {} points\n",
        ctx.record.granularity(),
        ctx.record.total_points()
    );

    prompt.push_str("Current conditions:\n");
    write_reading(prompt, "Temperature", ctx.current.temperature_c, Metric::Temperature);
    write_reading(prompt, "Feels like", ctx.current.feels_like_c, Metric::Temperature);
    write_reading(prompt, "Humidity", ctx.current.humidity_pct, Metric::Humidity);
    write_reading(prompt, "Wind speed", ctx.current.wind_speed_ms, Metric::Wind);
    write_reading(prompt, "Precipitation (1h)", ctx.current.precipitation_mm, Metric::Precipitation);
    if let Some(condition) = &ctx.current.condition {
        match &ctx.current.description {
            Some(description) => {
                let _ = writeln!(prompt, "- Condition: {condition} ({description})");
            },
            None => {
                let _ = writeln!(prompt, "- Condition: {condition}");
            },
        }
    }
    if let Some(outlook) = ctx.condition_outlook {
        let _ = writeln!(prompt, "- Sector outlook for this condition: {outlook}");
    }

    prompt.push_str("\nTrends over the window:\n");
    for (metric, trend) in &ctx.trends.metrics {
        let _ = writeln!(prompt, "- {}", describe_trend(*metric, trend));
    }

    prompt.push_str("\nImpact assessment:\n");
    for (category, impact) in &ctx.assessment.impacts {
        let _ = writeln!(
            prompt,
            "- {category}: {}. {}",
            impact.severity, impact.rationale
        );
    }
    if let Some(score) = &ctx.assessment.score {
        let _ = write!(
            prompt,
            "Overall impact score: {:+.1} on a -10 to 10 scale ({})",
            score.value, score.interpretation
        );
        if !score.unavailable.is_empty() {
            let missing: Vec<&str> = score.unavailable.iter().map(Metric::label).collect();
            let _ = write!(prompt, "; no data for {}", missing.join(", "));
        }
        prompt.push('\n');
    }
    prompt.push('\n');
}

fn write_reading(prompt: &mut String, label: &str, value: Option<f64>, metric: Metric) {
    if let Some(value) = value {
        let _ = writeln!(prompt, "- {label}: {value:.1} {}", metric.unit());
    }
}

/// One-line description of a metric trend
pub fn describe_trend(metric: Metric, trend: &MetricTrend) -> String {
    let unit = metric.unit();
    match trend {
        MetricTrend::InsufficientData { points } => {
            format!("{metric}: insufficient data ({points} points)")
        },
        MetricTrend::Computed(stats) => {
            let mut line = format!(
                "{metric}: {}, mean {:.1} {unit}, range {:.1} to {:.1} {unit}, slope {:+.3} {unit}/day",
                stats.direction, stats.mean, stats.min, stats.max, stats.slope_per_day
            );
            if let Some(change) = stats.change_percent {
                let _ = write!(line, ", change {change:+.1}%");
            }
            if !stats.anomalies.is_empty() {
                let _ = write!(line, ", {} anomalous point(s)", stats.anomalies.len());
            }
            line
        },
    }
}
