//! Integration tests for the infrastructure adapters
//!
//! Tests cover:
//! - Weather adapter over the real OpenWeatherMap client
//! - Narrative adapter over the real chat completions engine
//! - A full pipeline run with both services mocked over HTTP

use std::sync::Arc;

use ai_core::InferenceConfig;
use application::{
    AnalysisRequest, ApplicationError, DataKind, ErrorKind, ImpactEvaluator, InferencePort,
    PipelineConfig, RecommendationPipeline, ThresholdCatalog, WeatherPort,
};
use domain::{ConcernCategory, Granularity, LocationQuery, Metric, Severity, TrendDirection};
use infrastructure::{NarrativeInferenceAdapter, WeatherAdapter};
use integration_weather::OpenWeatherConfig;
use secrecy::SecretString;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

const RECOMMENDATION_TEXT: &str = "Short-term:\n- Irrigate at dawn\n\
    Medium-term:\n- Install drip lines\n\
    Long-term:\n- Diversify crops\n\
    Risk mitigation:\n- Crop insurance";

fn weather_adapter(server: &MockServer) -> WeatherAdapter {
    let config =
        OpenWeatherConfig::new(SecretString::from("owm-key")).with_single_base_url(&server.uri());
    WeatherAdapter::new(config).unwrap()
}

fn narrative_adapter(server: &MockServer) -> NarrativeInferenceAdapter {
    let config = InferenceConfig {
        base_url: format!("{}/v1", server.uri()),
        default_model: "test-model".to_string(),
        timeout_ms: 5000,
        ..InferenceConfig::default()
    }
    .with_api_key("together-key");
    NarrativeInferenceAdapter::new(config).unwrap()
}

fn month_stats(month: u32, mean_kelvin: f64) -> serde_json::Value {
    serde_json::json!({
        "month": month,
        "temp": {
            "mean": mean_kelvin,
            "record_min": mean_kelvin - 20.0,
            "record_max": mean_kelvin + 20.0,
            "average_min": mean_kelvin - 5.0,
            "average_max": mean_kelvin + 5.0
        },
        "humidity": { "mean": 60.0, "min": 20.0, "max": 100.0 },
        "wind": { "mean": 3.0, "min": 0.0, "max": 12.0 },
        "precipitation": { "mean": 1.0, "min": 0.0, "max": 20.0 },
        "sunshine_hours": 200.0
    })
}

fn completion(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "cmpl-1",
        "model": "test-model",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 400, "completion_tokens": 80, "total_tokens": 480 }
    })
}

async fn mount_fresno(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "Fresno", "lat": 36.7378, "lon": -119.7871, "country": "US", "state": "California" }
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "dt": 1_710_669_600,
            "main": { "temp": 21.0, "feels_like": 20.5, "humidity": 40, "pressure": 1015 },
            "wind": { "speed": 2.1 },
            "weather": [{ "main": "Clear", "description": "clear sky" }]
        })))
        .mount(server)
        .await;
}

/// Every month of the trailing year at 20 °C
async fn mount_flat_statistics(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/history/2.5/aggregated/month"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "result": month_stats(6, 293.15) })),
        )
        .mount(server)
        .await;
}

// ============================================================================
// Weather adapter
// ============================================================================

mod weather_adapter_tests {
    use super::*;

    #[tokio::test]
    async fn resolves_and_fetches_statistics() {
        let server = MockServer::start().await;
        mount_fresno(&server).await;
        mount_flat_statistics(&server).await;

        let adapter = weather_adapter(&server);
        let location = adapter
            .resolve_location(&LocationQuery::new("Fresno, US").unwrap())
            .await
            .unwrap();
        assert_eq!(location.name, "Fresno");
        assert_eq!(location.state.as_deref(), Some("California"));

        let record = adapter
            .fetch_record(&location, DataKind::Statistical, 30)
            .await
            .unwrap();
        assert_eq!(record.granularity(), Granularity::Monthly);
        let temperature = record.series(Metric::Temperature).unwrap();
        assert_eq!(temperature.len(), 12);
        assert!(
            temperature
                .points
                .iter()
                .all(|p| (p.value - 20.0).abs() < 1e-9)
        );
    }

    #[tokio::test]
    async fn unknown_location_is_input_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let err = weather_adapter(&server)
            .resolve_location(&LocationQuery::new("Atlantis").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::LocationNotFound(_)));
        assert_eq!(err.kind(), ErrorKind::Input);
    }

    #[tokio::test]
    async fn rate_limit_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = weather_adapter(&server)
            .resolve_location(&LocationQuery::new("Fresno").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::QuotaExceeded(_)));
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }

    #[tokio::test]
    async fn current_weather_carries_condition() {
        let server = MockServer::start().await;
        mount_fresno(&server).await;

        let adapter = weather_adapter(&server);
        let location = adapter
            .resolve_location(&LocationQuery::new("Fresno").unwrap())
            .await
            .unwrap();
        let current = adapter.current_weather(&location).await.unwrap();
        assert_eq!(current.condition.as_deref(), Some("Clear"));
        assert_eq!(current.pressure_hpa, Some(1015.0));
        assert!(adapter.is_available().await);
    }
}

// ============================================================================
// Narrative adapter
// ============================================================================

mod narrative_adapter_tests {
    use super::*;

    #[tokio::test]
    async fn generate_with_system_strips_reasoning() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer together-key"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("<think>hmm</think>Plant earlier.")),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = narrative_adapter(&server)
            .generate_with_system("advisor", "what now?")
            .await
            .unwrap();
        assert_eq!(result.content, "Plant earlier.");
        assert_eq!(result.tokens_used, Some(480));
    }

    #[tokio::test]
    async fn server_error_is_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = narrative_adapter(&server)
            .generate("what now?")
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::ExternalService(_)));
    }

    #[tokio::test]
    async fn rate_limit_is_quota_exceeded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = narrative_adapter(&server)
            .generate("what now?")
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::QuotaExceeded(_)));
    }

    #[tokio::test]
    async fn lists_models_and_health() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    { "id": "deepseek-ai/DeepSeek-R1-Distill-Llama-70B-free" },
                    { "id": "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free" }
                ]
            })))
            .mount(&server)
            .await;

        let adapter = narrative_adapter(&server);
        assert!(adapter.is_healthy().await);
        let models = adapter.list_available_models().await.unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(adapter.current_model(), "test-model");
    }
}

// ============================================================================
// Full pipeline
// ============================================================================

mod pipeline_tests {
    use super::*;

    fn pipeline(weather: &MockServer, narrative: &MockServer) -> RecommendationPipeline {
        RecommendationPipeline::new(
            Arc::new(weather_adapter(weather)),
            Arc::new(narrative_adapter(narrative)),
            ImpactEvaluator::new(Arc::new(ThresholdCatalog::builtin())),
            PipelineConfig::default(),
        )
    }

    fn request() -> AnalysisRequest {
        AnalysisRequest::parse("Fresno, US", "agriculture")
            .unwrap()
            .with_concerns("water rights")
            .unwrap()
    }

    #[tokio::test]
    async fn flat_year_produces_recommendation() {
        let weather = MockServer::start().await;
        mount_fresno(&weather).await;
        mount_flat_statistics(&weather).await;

        let narrative = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(RECOMMENDATION_TEXT)))
            .expect(2)
            .mount(&narrative)
            .await;

        let report = pipeline(&weather, &narrative).run(request()).await.unwrap();

        assert_eq!(report.window, DataKind::Statistical);
        assert_eq!(
            report.climate.trends.direction(Metric::Temperature),
            Some(TrendDirection::Flat)
        );
        assert_eq!(
            report.impact.assessment.severity(ConcernCategory::Operational),
            Severity::Low
        );
        let recommendation = report.recommendation.recommendation().unwrap();
        assert_eq!(recommendation.risk_mitigation(), ["Crop insurance"]);
    }

    #[tokio::test]
    async fn narrative_outage_degrades() {
        let weather = MockServer::start().await;
        mount_fresno(&weather).await;
        mount_flat_statistics(&weather).await;

        let narrative = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&narrative)
            .await;

        let report = pipeline(&weather, &narrative).run(request()).await.unwrap();

        assert!(report.recommendation.is_unavailable());
        assert!(report.impact.narrative.is_none());
        assert_eq!(
            report.climate.record.series(Metric::Temperature).unwrap().len(),
            12
        );
    }

    #[tokio::test]
    async fn weather_outage_aborts_before_narration() {
        let weather = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&weather)
            .await;

        let narrative = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(RECOMMENDATION_TEXT)))
            .expect(0)
            .mount(&narrative)
            .await;

        let err = pipeline(&weather, &narrative)
            .run(request())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
    }
}
