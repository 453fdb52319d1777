//! Application services - Use case implementations

mod impact_evaluator;
pub mod prompt_builder;
mod recommendation_parser;
mod recommendation_pipeline;
mod thresholds;
mod trend_analyzer;

pub use impact_evaluator::ImpactEvaluator;
pub use prompt_builder::PromptContext;
pub use recommendation_parser::{ParseError, parse_recommendation};
pub use recommendation_pipeline::{
    AnalysisReport, AnalysisRequest, ClimateAnalysis, ImpactStage, MAX_CONCERNS_LEN,
    PipelineConfig, PipelineStage, RecommendationOutcome, RecommendationPipeline,
};
pub use thresholds::{
    Measure, ScoreFactors, SectorTable, SignedFactor, ThresholdCatalog, ThresholdRule,
};
pub use trend_analyzer::{TrendAnalyzer, TrendConfig};
