//! Domain entities - Records and derived artifacts of an analysis

mod climate_record;
mod impact_assessment;
mod recommendation;
mod trend_summary;

pub use climate_record::{ClimateRecord, ClimateRecordBuilder, DataPoint, Granularity, MetricSeries};
pub use impact_assessment::{CategoryImpact, ImpactAssessment, ImpactInterpretation, ImpactScore};
pub use recommendation::{Horizon, Recommendation, Suggestion};
pub use trend_summary::{Anomaly, MetricTrend, TrendDirection, TrendStatistics, TrendSummary};
