//! Value objects - Immutable domain primitives

pub mod analysis_id;
pub mod geo_location;
pub mod industry_sector;
pub mod location;
pub mod metric;
pub mod severity;

pub use analysis_id::AnalysisId;
pub use geo_location::GeoLocation;
pub use industry_sector::IndustrySector;
pub use location::{LocationQuery, MAX_LOCATION_LEN, ResolvedLocation};
pub use metric::{Metric, MetricUnit};
pub use severity::{ConcernCategory, Severity};
