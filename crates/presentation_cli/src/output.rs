//! Text and JSON rendering of results

use application::{AnalysisReport, CurrentWeather, RecommendationOutcome};
use domain::{
    ConcernCategory, Horizon, ImpactAssessment, IndustrySector, Metric, MetricTrend,
    ResolvedLocation, TrendSummary,
};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Render any serializable value in the requested format
pub fn render<T: Serialize>(
    value: &T,
    format: OutputFormat,
    text: impl FnOnce(&T) -> String,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value),
        OutputFormat::Text => Ok(text(value)),
    }
}

/// Human-readable analysis report
pub fn report_text(report: &AnalysisReport) -> String {
    let climate = &report.climate;
    let mut out = String::new();

    out.push_str(&format!("Climate analysis: {}\n", climate.location));
    out.push_str(&format!(
        "Sector: {} | Window: {} | Analysis: {}\n",
        report.request.sector, report.window, report.id
    ));

    out.push_str("\nCurrent conditions\n");
    out.push_str(&format!("  {}\n", current_line(&climate.current)));

    out.push_str("\nTrends\n");
    out.push_str(&trends_text(&climate.trends));

    out.push_str("\nImpact\n");
    out.push_str(&impact_text(&report.impact.assessment));
    if let Some(outlook) = &report.impact.condition_outlook {
        out.push_str(&format!("  Outlook: {outlook}\n"));
    }
    if let Some(narrative) = &report.impact.narrative {
        out.push_str("\nImpact narrative\n");
        out.push_str(&indent(narrative, 2));
    }

    match &report.recommendation {
        RecommendationOutcome::Available { recommendation } => {
            out.push_str(&format!("\nRecommendations ({})\n", recommendation.model()));
            for horizon in Horizon::ALL {
                let items: Vec<_> = recommendation.for_horizon(horizon).collect();
                if items.is_empty() {
                    continue;
                }
                out.push_str(&format!("  {}:\n", horizon.label()));
                for item in items {
                    out.push_str(&format!("    - {}\n", item.text));
                }
            }
            if !recommendation.risk_mitigation().is_empty() {
                out.push_str("  Risk mitigation:\n");
                for item in recommendation.risk_mitigation() {
                    out.push_str(&format!("    - {item}\n"));
                }
            }
        },
        RecommendationOutcome::Unavailable { reason } => {
            out.push_str(&format!("\nRecommendations unavailable: {reason}\n"));
        },
    }

    out
}

/// Human-readable current conditions
pub fn current_text(location: &ResolvedLocation, current: &CurrentWeather) -> String {
    format!(
        "{location}\n  {}\n  Observed at {}\n",
        current_line(current),
        current.observed_at.format("%Y-%m-%d %H:%M UTC")
    )
}

/// Supported sectors, one per line
pub fn sectors_text() -> String {
    IndustrySector::ALL
        .iter()
        .map(|sector| format!("{:<16}{}\n", sector.label().to_lowercase(), sector.label()))
        .collect()
}

fn current_line(current: &CurrentWeather) -> String {
    let mut parts = Vec::new();
    match (&current.condition, &current.description) {
        (Some(condition), Some(description)) => parts.push(format!("{condition} ({description})")),
        (Some(condition), None) => parts.push(condition.clone()),
        (None, Some(description)) => parts.push(description.clone()),
        (None, None) => {},
    }
    if let Some(t) = current.temperature_c {
        parts.push(format!("{t:.1} °C"));
    }
    if let Some(t) = current.feels_like_c {
        parts.push(format!("feels like {t:.1} °C"));
    }
    if let Some(h) = current.humidity_pct {
        parts.push(format!("humidity {h:.0}%"));
    }
    if let Some(w) = current.wind_speed_ms {
        parts.push(format!("wind {w:.1} m/s"));
    }
    if let Some(p) = current.precipitation_mm {
        parts.push(format!("precipitation {p:.1} mm"));
    }
    if parts.is_empty() {
        "no data".to_string()
    } else {
        parts.join(", ")
    }
}

fn trends_text(trends: &TrendSummary) -> String {
    let mut out = String::new();
    for metric in Metric::ALL {
        let Some(trend) = trends.get(metric) else {
            continue;
        };
        let unit = metric.unit().symbol();
        match trend {
            MetricTrend::Computed(stats) => {
                out.push_str(&format!(
                    "  {metric}: {} (mean {:.1} {unit}, range {:.1}..{:.1}, slope {:+.3}/day",
                    stats.direction.label(),
                    stats.mean,
                    stats.min,
                    stats.max,
                    stats.slope_per_day
                ));
                if let Some(change) = stats.change_percent {
                    out.push_str(&format!(", change {change:+.1}%"));
                }
                out.push(')');
                if !stats.anomalies.is_empty() {
                    out.push_str(&format!(", {} anomalies", stats.anomalies.len()));
                }
                out.push('\n');
            },
            MetricTrend::InsufficientData { points } => {
                out.push_str(&format!("  {metric}: insufficient data ({points} points)\n"));
            },
        }
    }
    if out.is_empty() {
        out.push_str("  none\n");
    }
    out
}

fn impact_text(assessment: &ImpactAssessment) -> String {
    let mut out = String::new();
    for category in ConcernCategory::ALL {
        let Some(impact) = assessment.get(category) else {
            continue;
        };
        out.push_str(&format!(
            "  {}: {} - {}\n",
            category.label(),
            impact.severity,
            impact.rationale
        ));
    }
    if let Some(score) = &assessment.score {
        out.push_str(&format!(
            "  Overall score: {:+.1} ({})\n",
            score.value,
            score.interpretation.label()
        ));
        if !score.unavailable.is_empty() {
            let missing: Vec<_> = score.unavailable.iter().map(Metric::label).collect();
            out.push_str(&format!("  Not scored: {}\n", missing.join(", ")));
        }
    }
    out
}

fn indent(text: &str, width: usize) -> String {
    text.lines()
        .map(|line| format!("{:width$}{line}\n", ""))
        .collect()
}
