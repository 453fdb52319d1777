//! Climate Advisor CLI
//!
//! Analyzes weather impact on an industry sector and asks a hosted model
//! for recommendations.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::{process::ExitCode, sync::Arc};

use anyhow::Context;
use application::{
    AnalysisRequest, ApplicationError, ErrorKind, ImpactEvaluator, InferencePort,
    RecommendationPipeline,
};
use clap::Parser;
use domain::LocationQuery;
use infrastructure::{
    AppConfig, ConfigError, NarrativeInferenceAdapter, WeatherAdapter, init_telemetry,
};
use presentation_cli::{AnalyzeArgs, Cli, Commands, OutputFormat, log_filter_from_verbosity, output};
use tracing::info;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_status(&e))
        },
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if matches!(cli.command, Commands::Sectors) {
        print!("{}", output::sectors_text());
        return Ok(());
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(filter) = log_filter_from_verbosity(cli.verbose) {
        config.telemetry.log_filter = filter.to_string();
    }
    let _telemetry = init_telemetry(&config.telemetry).context("failed to set up logging")?;
    config.validate()?;

    match cli.command {
        Commands::Analyze(args) => analyze(&config, args).await,
        Commands::Weather { location, format } => weather(&config, &location, format).await,
        Commands::CheckConfig => check_config(&config),
        Commands::Models => models(&config).await,
        Commands::Sectors => Ok(()),
    }
}

fn build_pipeline(config: &AppConfig) -> anyhow::Result<RecommendationPipeline> {
    let weather = WeatherAdapter::new(config.weather.client_config()?)?;
    let inference = NarrativeInferenceAdapter::new(config.inference.clone())?;
    let evaluator = ImpactEvaluator::new(Arc::new(config.impact.catalog()?));

    Ok(RecommendationPipeline::new(
        Arc::new(weather),
        Arc::new(inference),
        evaluator,
        config.pipeline.clone(),
    ))
}

async fn analyze(config: &AppConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;

    let query = LocationQuery::new(&args.location).map_err(ApplicationError::from)?;
    let mut request = AnalysisRequest::new(query, args.sector);
    if let Some(concerns) = &args.concerns {
        request = request.with_concerns(concerns)?;
    }
    if let Some(window) = args.window {
        request = request.with_window(window.into());
    }
    if let Some(days) = args.days {
        request = request.with_history_days(days)?;
    }

    let report = pipeline.run(request).await?;
    if report.recommendation.is_unavailable() {
        info!(analysis = %report.id, "Recommendation unavailable, reporting partial analysis");
    }
    println!("{}", output::render(&report, args.format, output::report_text)?);
    Ok(())
}

async fn weather(config: &AppConfig, location: &str, format: OutputFormat) -> anyhow::Result<()> {
    let pipeline = build_pipeline(config)?;
    let query = LocationQuery::new(location).map_err(ApplicationError::from)?;
    let (location, current) = pipeline.current_weather(&query).await?;

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&serde_json::json!({
            "location": location,
            "current": current,
        }))?,
        OutputFormat::Text => output::current_text(&location, &current),
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

fn check_config(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = config.impact.catalog()?;
    let thresholds = config
        .impact
        .thresholds_path
        .as_ref()
        .map_or_else(|| "built-in".to_string(), |p| p.display().to_string());

    println!("Configuration OK");
    println!("  Weather API:      {}", config.weather.api_base_url);
    println!("  Geocoding API:    {}", config.weather.geo_base_url);
    println!("  History API:      {}", config.weather.history_base_url);
    println!("  Narrative API:    {}", config.inference.base_url);
    println!("  Model:            {}", config.inference.default_model);
    println!("  Default window:   {}", config.pipeline.default_window);
    println!("  History days:     {}", config.pipeline.historical_days);
    println!(
        "  Narrative timeout: {}s",
        config.pipeline.narrative_timeout_secs
    );
    println!(
        "  Thresholds:       {thresholds} ({} sectors)",
        catalog.sectors.len()
    );
    Ok(())
}

async fn models(config: &AppConfig) -> anyhow::Result<()> {
    let adapter = NarrativeInferenceAdapter::new(config.inference.clone())?;
    let healthy = adapter.is_healthy().await;
    println!(
        "Narrative service: {} ({})",
        config.inference.base_url,
        if healthy { "healthy" } else { "unreachable" }
    );

    let current = adapter.current_model();
    let models = adapter
        .list_available_models()
        .await
        .context("failed to list models")?;
    for model in models {
        let marker = if model == current { "*" } else { " " };
        println!("{marker} {model}");
    }
    Ok(())
}

/// Process exit status for a failed run
fn exit_status(error: &anyhow::Error) -> u8 {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<ApplicationError>() {
            return match e.kind() {
                ErrorKind::Input => 2,
                ErrorKind::Upstream => 3,
                ErrorKind::Data => 4,
                ErrorKind::Config => 5,
                ErrorKind::Internal => 1,
            };
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return 5;
        }
    }
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_errors_map_to_kind_codes() {
        let err = anyhow::Error::from(ApplicationError::LocationNotFound("Atlantis".into()));
        assert_eq!(exit_status(&err), 2);

        let err = anyhow::Error::from(ApplicationError::ExternalService("502".into()))
            .context("analysis failed");
        assert_eq!(exit_status(&err), 3);

        let err = anyhow::Error::from(ApplicationError::Data("empty".into()));
        assert_eq!(exit_status(&err), 4);
    }

    #[test]
    fn config_errors_exit_with_config_code() {
        let err = anyhow::Error::from(ConfigError::Invalid("bad".into()));
        assert_eq!(exit_status(&err), 5);
    }

    #[test]
    fn other_errors_are_generic_failures() {
        assert_eq!(exit_status(&anyhow::anyhow!("boom")), 1);
    }
}
