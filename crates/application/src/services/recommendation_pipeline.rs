//! Recommendation pipeline - climate analysis, impact assessment, recommendation
//!
//! The three stages run strictly in [`PipelineStage::ORDER`], each consuming
//! the typed output of the previous one. A failure while gathering climate
//! data aborts the run; a failure while writing the recommendation only
//! degrades the report to an explicit "unavailable" outcome.

use std::{fmt, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use domain::{
    AnalysisId, ClimateRecord, ImpactAssessment, IndustrySector, LocationQuery, Recommendation,
    ResolvedLocation, TrendSummary,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::{
    impact_evaluator::ImpactEvaluator,
    prompt_builder::{self, PromptContext},
    recommendation_parser::parse_recommendation,
    trend_analyzer::{TrendAnalyzer, TrendConfig},
};
use crate::{
    error::ApplicationError,
    ports::{CurrentWeather, DataKind, InferencePort, WeatherPort},
};

/// Longest accepted free-text concerns, in characters
pub const MAX_CONCERNS_LEN: usize = 2000;

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    ClimateAnalysis,
    ImpactAssessment,
    Recommendation,
}

impl PipelineStage {
    /// The order stages run in
    pub const ORDER: [Self; 3] = [
        Self::ClimateAnalysis,
        Self::ImpactAssessment,
        Self::Recommendation,
    ];

    /// Human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ClimateAnalysis => "climate analysis",
            Self::ImpactAssessment => "impact assessment",
            Self::Recommendation => "recommendation",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pipeline tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Window used when a request does not name one
    #[serde(default)]
    pub default_window: DataKind,
    /// Days of hourly history for the historical window
    #[serde(default = "default_historical_days")]
    pub historical_days: u32,
    /// Upper bound for each narrative call, in seconds
    #[serde(default = "default_narrative_timeout_secs")]
    pub narrative_timeout_secs: u64,
    /// Ask the narrative service for an impact narrative in stage 2
    #[serde(default = "default_true")]
    pub impact_narrative: bool,
    #[serde(default)]
    pub trend: TrendConfig,
}

const fn default_historical_days() -> u32 {
    30
}

const fn default_narrative_timeout_secs() -> u64 {
    60
}

const fn default_true() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_window: DataKind::default(),
            historical_days: default_historical_days(),
            narrative_timeout_secs: default_narrative_timeout_secs(),
            impact_narrative: true,
            trend: TrendConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Narrative call timeout
    pub const fn narrative_timeout(&self) -> Duration {
        Duration::from_secs(self.narrative_timeout_secs)
    }
}

/// Input for one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub location: LocationQuery,
    pub sector: IndustrySector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concerns: Option<String>,
    /// Data window; the pipeline default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<DataKind>,
    /// History depth for the historical window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history_days: Option<u32>,
}

impl AnalysisRequest {
    /// Create a request for a location and sector
    pub const fn new(location: LocationQuery, sector: IndustrySector) -> Self {
        Self {
            location,
            sector,
            concerns: None,
            window: None,
            history_days: None,
        }
    }

    /// Parse raw user input
    pub fn parse(location: &str, sector: &str) -> Result<Self, ApplicationError> {
        Ok(Self::new(LocationQuery::new(location)?, sector.parse()?))
    }

    /// Attach free-text concerns; blank text is treated as none
    pub fn with_concerns(mut self, concerns: impl AsRef<str>) -> Result<Self, ApplicationError> {
        let concerns: String = concerns
            .as_ref()
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        let concerns = concerns.trim();
        if concerns.chars().count() > MAX_CONCERNS_LEN {
            return Err(ApplicationError::InvalidInput(format!(
                "concerns must be at most {MAX_CONCERNS_LEN} characters"
            )));
        }
        self.concerns = (!concerns.is_empty()).then(|| concerns.to_string());
        Ok(self)
    }

    /// Choose the data window
    #[must_use]
    pub const fn with_window(mut self, window: DataKind) -> Self {
        self.window = Some(window);
        self
    }

    /// Choose the history depth
    pub fn with_history_days(mut self, days: u32) -> Result<Self, ApplicationError> {
        if days == 0 {
            return Err(ApplicationError::InvalidInput(
                "history days must be at least 1".to_string(),
            ));
        }
        self.history_days = Some(days);
        Ok(self)
    }
}

/// Output of stage 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateAnalysis {
    pub location: ResolvedLocation,
    pub record: ClimateRecord,
    pub current: CurrentWeather,
    pub trends: TrendSummary,
}

/// Output of stage 2
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactStage {
    pub assessment: ImpactAssessment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_outlook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
}

/// Output of stage 3
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationOutcome {
    Available { recommendation: Recommendation },
    Unavailable { reason: String },
}

impl RecommendationOutcome {
    /// The recommendation, if one was produced
    pub const fn recommendation(&self) -> Option<&Recommendation> {
        match self {
            Self::Available { recommendation } => Some(recommendation),
            Self::Unavailable { .. } => None,
        }
    }

    /// Whether stage 3 degraded
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// Complete result of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub id: AnalysisId,
    pub generated_at: DateTime<Utc>,
    pub request: AnalysisRequest,
    pub window: DataKind,
    pub climate: ClimateAnalysis,
    pub impact: ImpactStage,
    pub recommendation: RecommendationOutcome,
}

/// Typed progress through the stages
enum PipelineState {
    Start,
    Analyzed(ClimateAnalysis),
    Assessed(ClimateAnalysis, ImpactStage),
    Done(ClimateAnalysis, ImpactStage, RecommendationOutcome),
}

/// Runs analyses end to end
pub struct RecommendationPipeline {
    weather: Arc<dyn WeatherPort>,
    inference: Arc<dyn InferencePort>,
    evaluator: ImpactEvaluator,
    analyzer: TrendAnalyzer,
    config: PipelineConfig,
}

impl fmt::Debug for RecommendationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecommendationPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RecommendationPipeline {
    /// Create a pipeline over the given ports
    pub fn new(
        weather: Arc<dyn WeatherPort>,
        inference: Arc<dyn InferencePort>,
        evaluator: ImpactEvaluator,
        config: PipelineConfig,
    ) -> Self {
        Self {
            weather,
            inference,
            evaluator,
            analyzer: TrendAnalyzer::new(config.trend),
            config,
        }
    }

    /// Active configuration
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run all stages for one request
    #[instrument(skip(self, request), fields(location = %request.location, sector = %request.sector))]
    pub async fn run(&self, request: AnalysisRequest) -> Result<AnalysisReport, ApplicationError> {
        let window = request.window.unwrap_or(self.config.default_window);
        let mut state = PipelineState::Start;

        for stage in PipelineStage::ORDER {
            debug!(%stage, "Running pipeline stage");
            state = match (stage, state) {
                (PipelineStage::ClimateAnalysis, PipelineState::Start) => {
                    PipelineState::Analyzed(self.analyze_climate(&request, window).await?)
                },
                (PipelineStage::ImpactAssessment, PipelineState::Analyzed(climate)) => {
                    let impact = self.assess_impact(&request, &climate).await;
                    PipelineState::Assessed(climate, impact)
                },
                (PipelineStage::Recommendation, PipelineState::Assessed(climate, impact)) => {
                    let outcome = self.recommend(&request, &climate, &impact).await;
                    PipelineState::Done(climate, impact, outcome)
                },
                (stage, _) => {
                    return Err(ApplicationError::Internal(format!(
                        "pipeline stage {stage} reached out of order"
                    )));
                },
            };
        }

        let PipelineState::Done(climate, impact, recommendation) = state else {
            return Err(ApplicationError::Internal(
                "pipeline finished without a recommendation stage".to_string(),
            ));
        };

        info!(
            severity = %impact.assessment.highest_severity(),
            recommendation_available = !recommendation.is_unavailable(),
            "Analysis complete"
        );

        Ok(AnalysisReport {
            id: AnalysisId::new(),
            generated_at: Utc::now(),
            request,
            window,
            climate,
            impact,
            recommendation,
        })
    }

    /// Current conditions only, without analysis
    #[instrument(skip(self), fields(location = %query))]
    pub async fn current_weather(
        &self,
        query: &LocationQuery,
    ) -> Result<(ResolvedLocation, CurrentWeather), ApplicationError> {
        let location = self.weather.resolve_location(query).await?;
        let current = self.weather.current_weather(&location).await?;
        Ok((location, current))
    }

    /// Stage 1: resolve, fetch and summarise
    async fn analyze_climate(
        &self,
        request: &AnalysisRequest,
        window: DataKind,
    ) -> Result<ClimateAnalysis, ApplicationError> {
        let location = self.weather.resolve_location(&request.location).await?;
        debug!(coordinates = %location.coordinates, "Location resolved");

        let history_days = request.history_days.unwrap_or(self.config.historical_days);
        let record = self
            .weather
            .fetch_record(&location, window, history_days)
            .await?;
        if record.is_empty() {
            return Err(ApplicationError::Data(format!(
                "no usable {window} data for {}; try another window or location",
                location.display_name()
            )));
        }

        let current = self.weather.current_weather(&location).await?;
        let trends = self.analyzer.summarize(&record);

        debug!(
            points = record.total_points(),
            anomalies = trends.has_anomalies(),
            "Climate analysis complete"
        );

        Ok(ClimateAnalysis {
            location,
            record,
            current,
            trends,
        })
    }

    /// Stage 2: evaluate thresholds, optionally narrate
    async fn assess_impact(&self, request: &AnalysisRequest, climate: &ClimateAnalysis) -> ImpactStage {
        let assessment = self.evaluator.evaluate(&climate.record, request.sector);
        let condition_outlook = climate
            .current
            .condition
            .as_deref()
            .and_then(|condition| self.evaluator.condition_outlook(request.sector, condition));

        let mut stage = ImpactStage {
            assessment,
            condition_outlook,
            narrative: None,
        };

        if self.config.impact_narrative {
            let prompt = prompt_builder::impact_prompt(&context(request, climate, &stage));
            match self
                .narrate(prompt_builder::IMPACT_ANALYST_SYSTEM, &prompt)
                .await
            {
                Ok((narrative, _)) => stage.narrative = Some(narrative),
                Err(e) => warn!(error = %e, "Impact narrative unavailable"),
            }
        }

        stage
    }

    /// Stage 3: ask for and parse the recommendation
    async fn recommend(
        &self,
        request: &AnalysisRequest,
        climate: &ClimateAnalysis,
        impact: &ImpactStage,
    ) -> RecommendationOutcome {
        let prompt = prompt_builder::recommendation_prompt(
            &context(request, climate, impact),
            impact.narrative.as_deref(),
        );

        let (text, model) = match self.narrate(prompt_builder::ADVISOR_SYSTEM, &prompt).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "Recommendation stage failed");
                return RecommendationOutcome::Unavailable {
                    reason: e.to_string(),
                };
            },
        };

        match parse_recommendation(&text, &model) {
            Ok(recommendation) => RecommendationOutcome::Available { recommendation },
            Err(e) => {
                warn!(error = %e, "Recommendation could not be parsed");
                RecommendationOutcome::Unavailable {
                    reason: format!("narrative service response unusable: {e}"),
                }
            },
        }
    }

    /// One bounded narrative call, returning the text and the model that wrote it
    async fn narrate(&self, system: &str, prompt: &str) -> Result<(String, String), ApplicationError> {
        let timeout = self.config.narrative_timeout();
        let call = self.inference.generate_with_system(system, prompt);
        let result = tokio::time::timeout(timeout, call)
            .await
            .map_err(|_| {
                ApplicationError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
            })??;

        debug!(
            model = %result.model,
            tokens = ?result.tokens_used,
            latency_ms = result.latency_ms,
            "Narrative generated"
        );
        Ok((result.content, result.model))
    }
}

fn context<'a>(
    request: &'a AnalysisRequest,
    climate: &'a ClimateAnalysis,
    impact: &'a ImpactStage,
) -> PromptContext<'a> {
    PromptContext {
        location: &climate.location,
        sector: request.sector,
        record: &climate.record,
        current: &climate.current,
        trends: &climate.trends,
        assessment: &impact.assessment,
        condition_outlook: impact.condition_outlook.as_deref(),
        concerns: request.concerns.as_deref(),
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use domain::{
        ConcernCategory, GeoLocation, Granularity, Horizon, Metric, Severity, TrendDirection,
    };
    use mockall::predicate::*;

    use super::*;
    use crate::ports::{InferenceResult, MockInferencePort, MockWeatherPort};

    const RECOMMENDATION_TEXT: &str = "Short-term:\n- Irrigate at dawn\n\
        Medium-term:\n- Install drip lines\n\
        Long-term:\n- Diversify crops\n\
        Risk mitigation:\n- Crop insurance";

    fn resolved() -> ResolvedLocation {
        ResolvedLocation::new(
            LocationQuery::new("Fresno").unwrap(),
            GeoLocation::new(36.74, -119.79).unwrap(),
            "Fresno",
        )
        .with_country("US")
    }

    fn flat_record(value: f64) -> ClimateRecord {
        let start = Utc.with_ymd_and_hms(2023, 11, 1, 0, 0, 0).unwrap();
        let mut builder = ClimateRecord::builder(resolved(), Granularity::Monthly);
        for month in 0..12 {
            builder.push(
                Metric::Temperature,
                start + ChronoDuration::days(30 * month),
                Some(value),
            );
        }
        builder.build()
    }

    fn current() -> CurrentWeather {
        CurrentWeather {
            temperature_c: Some(21.0),
            feels_like_c: Some(20.5),
            humidity_pct: Some(40.0),
            wind_speed_ms: Some(2.0),
            precipitation_mm: None,
            pressure_hpa: Some(1012.0),
            condition: Some("Clear".to_string()),
            description: Some("clear sky".to_string()),
            observed_at: Utc::now(),
        }
    }

    fn result(content: &str) -> InferenceResult {
        InferenceResult {
            content: content.to_string(),
            model: "test-model".to_string(),
            tokens_used: Some(64),
            latency_ms: 5,
        }
    }

    fn healthy_weather(record: ClimateRecord) -> MockWeatherPort {
        let mut weather = MockWeatherPort::new();
        weather
            .expect_resolve_location()
            .returning(|_| Ok(resolved()));
        weather
            .expect_fetch_record()
            .returning(move |_, _, _| Ok(record.clone()));
        weather.expect_current_weather().returning(|_| Ok(current()));
        weather
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest::parse("Fresno", "agriculture")
            .unwrap()
            .with_concerns("water rights")
            .unwrap()
    }

    fn pipeline(
        weather: MockWeatherPort,
        inference: impl InferencePort + 'static,
        config: PipelineConfig,
    ) -> RecommendationPipeline {
        RecommendationPipeline::new(
            Arc::new(weather),
            Arc::new(inference),
            ImpactEvaluator::default(),
            config,
        )
    }

    #[test]
    fn stage_order_is_fixed() {
        assert_eq!(
            PipelineStage::ORDER,
            [
                PipelineStage::ClimateAnalysis,
                PipelineStage::ImpactAssessment,
                PipelineStage::Recommendation
            ]
        );
    }

    #[test]
    fn request_validation() {
        assert!(AnalysisRequest::parse("  ", "energy").is_err());
        assert!(AnalysisRequest::parse("Oslo", "mining").is_err());
        let req = AnalysisRequest::parse("Oslo", "ENERGY").unwrap();
        assert_eq!(req.sector, IndustrySector::Energy);
        assert!(req.clone().with_history_days(0).is_err());
        assert!(req.clone().with_concerns("x".repeat(MAX_CONCERNS_LEN + 1)).is_err());
        assert_eq!(req.with_concerns("  \n ").unwrap().concerns, None);
    }

    #[tokio::test]
    async fn full_run_produces_recommendation() {
        let mut inference = MockInferencePort::new();
        inference
            .expect_generate_with_system()
            .with(eq(prompt_builder::IMPACT_ANALYST_SYSTEM), always())
            .times(1)
            .returning(|_, _| Ok(result("Conditions are mild.")));
        inference
            .expect_generate_with_system()
            .with(eq(prompt_builder::ADVISOR_SYSTEM), always())
            .times(1)
            .returning(|_, prompt| {
                assert!(prompt.contains("water rights"));
                assert!(prompt.contains("Conditions are mild."));
                Ok(result(RECOMMENDATION_TEXT))
            });

        let report = pipeline(healthy_weather(flat_record(20.0)), inference, PipelineConfig::default())
            .run(request())
            .await
            .unwrap();

        assert_eq!(report.window, DataKind::Statistical);
        assert_eq!(report.impact.narrative.as_deref(), Some("Conditions are mild."));
        assert_eq!(
            report.impact.condition_outlook.as_deref(),
            Some("optimal conditions for field operations")
        );
        let recommendation = report.recommendation.recommendation().unwrap();
        assert_eq!(recommendation.for_horizon(Horizon::ShortTerm).count(), 1);
        assert_eq!(recommendation.risk_mitigation(), ["Crop insurance"]);
        assert_eq!(recommendation.model(), "test-model");
    }

    #[tokio::test]
    async fn flat_twenty_degrees_agriculture() {
        let mut inference = MockInferencePort::new();
        inference
            .expect_generate_with_system()
            .returning(|_, _| Ok(result(RECOMMENDATION_TEXT)));
        let config = PipelineConfig {
            impact_narrative: false,
            ..PipelineConfig::default()
        };

        let report = pipeline(healthy_weather(flat_record(20.0)), inference, config)
            .run(request())
            .await
            .unwrap();

        assert_eq!(
            report.climate.trends.direction(Metric::Temperature),
            Some(TrendDirection::Flat)
        );
        assert_eq!(
            report.impact.assessment.severity(ConcernCategory::Operational),
            Severity::Low
        );
        assert!(report.impact.narrative.is_none());
    }

    #[tokio::test]
    async fn weather_outage_aborts_without_partial_result() {
        let mut weather = MockWeatherPort::new();
        weather
            .expect_resolve_location()
            .returning(|_| Ok(resolved()));
        weather.expect_fetch_record().returning(|_, _, _| {
            Err(ApplicationError::ExternalService(
                "weather service unavailable".to_string(),
            ))
        });
        let mut inference = MockInferencePort::new();
        inference.expect_generate_with_system().never();

        let err = pipeline(weather, inference, PipelineConfig::default())
            .run(request())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ExternalService(_)));
    }

    #[tokio::test]
    async fn unknown_location_aborts_as_input_error() {
        let mut weather = MockWeatherPort::new();
        weather
            .expect_resolve_location()
            .returning(|q| Err(ApplicationError::LocationNotFound(q.to_string())));
        weather.expect_fetch_record().never();
        let inference = MockInferencePort::new();

        let err = pipeline(weather, inference, PipelineConfig::default())
            .run(request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Input);
    }

    #[tokio::test]
    async fn empty_window_is_data_error() {
        let empty = ClimateRecord::builder(resolved(), Granularity::Monthly).build();
        let mut inference = MockInferencePort::new();
        inference.expect_generate_with_system().never();

        let err = pipeline(healthy_weather(empty), inference, PipelineConfig::default())
            .run(request())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::Data(_)));
    }

    #[tokio::test]
    async fn requested_window_and_days_reach_the_port() {
        let mut weather = MockWeatherPort::new();
        weather
            .expect_resolve_location()
            .returning(|_| Ok(resolved()));
        weather
            .expect_fetch_record()
            .with(always(), eq(DataKind::Historical), eq(7))
            .times(1)
            .returning(|_, _, _| Ok(flat_record(12.0)));
        weather.expect_current_weather().returning(|_| Ok(current()));
        let mut inference = MockInferencePort::new();
        inference
            .expect_generate_with_system()
            .returning(|_, _| Ok(result(RECOMMENDATION_TEXT)));

        let req = request()
            .with_window(DataKind::Historical)
            .with_history_days(7)
            .unwrap();
        let report = pipeline(weather, inference, PipelineConfig::default())
            .run(req)
            .await
            .unwrap();
        assert_eq!(report.window, DataKind::Historical);
    }

    #[tokio::test]
    async fn narrative_error_degrades_recommendation() {
        let mut inference = MockInferencePort::new();
        inference
            .expect_generate_with_system()
            .returning(|_, _| Err(ApplicationError::Inference("rate limited".to_string())));

        let report = pipeline(healthy_weather(flat_record(20.0)), inference, PipelineConfig::default())
            .run(request())
            .await
            .unwrap();

        assert!(report.impact.narrative.is_none());
        assert_eq!(
            report.impact.assessment.severity(ConcernCategory::Operational),
            Severity::Low
        );
        match &report.recommendation {
            RecommendationOutcome::Unavailable { reason } => assert!(reason.contains("rate limited")),
            RecommendationOutcome::Available { .. } => panic!("expected degraded outcome"),
        }
    }

    #[tokio::test]
    async fn unparseable_text_degrades_recommendation() {
        let mut inference = MockInferencePort::new();
        inference
            .expect_generate_with_system()
            .returning(|_, _| Ok(result("All good, nothing to do.")));
        let config = PipelineConfig {
            impact_narrative: false,
            ..PipelineConfig::default()
        };

        let report = pipeline(healthy_weather(flat_record(20.0)), inference, config)
            .run(request())
            .await
            .unwrap();
        match &report.recommendation {
            RecommendationOutcome::Unavailable { reason } => {
                assert!(reason.contains("no horizon-tagged suggestions"));
            },
            RecommendationOutcome::Available { .. } => panic!("expected degraded outcome"),
        }
    }

    /// Inference port that never answers in time
    struct StalledInference;

    #[async_trait]
    impl InferencePort for StalledInference {
        async fn generate(&self, _message: &str) -> Result<InferenceResult, ApplicationError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(result("late"))
        }

        async fn generate_with_system(
            &self,
            _system_prompt: &str,
            _message: &str,
        ) -> Result<InferenceResult, ApplicationError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(result(RECOMMENDATION_TEXT))
        }

        async fn is_healthy(&self) -> bool {
            true
        }

        async fn list_available_models(&self) -> Result<Vec<String>, ApplicationError> {
            Ok(vec![])
        }

        fn current_model(&self) -> String {
            "stalled".to_string()
        }
    }

    #[tokio::test]
    async fn narrative_timeout_degrades_with_valid_stages() {
        let config = PipelineConfig {
            narrative_timeout_secs: 0,
            ..PipelineConfig::default()
        };

        let report = pipeline(healthy_weather(flat_record(20.0)), StalledInference, config)
            .run(request())
            .await
            .unwrap();

        assert_eq!(report.climate.record.total_points(), 12);
        assert!(report.impact.assessment.highest_severity().is_available());
        assert!(report.impact.narrative.is_none());
        match &report.recommendation {
            RecommendationOutcome::Unavailable { reason } => assert!(reason.contains("Timed out")),
            RecommendationOutcome::Available { .. } => panic!("expected degraded outcome"),
        }
    }

    #[test]
    fn report_serializes_outcome_status() {
        let outcome = RecommendationOutcome::Unavailable {
            reason: "timeout".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "unavailable");
        assert_eq!(json["reason"], "timeout");
    }
}
