//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports over the weather and narrative clients,
//! and owns configuration loading and telemetry setup.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, ConfigError, ImpactAppConfig, WeatherAppConfig};
pub use telemetry::{TelemetryConfig, TelemetryError, TelemetryGuard, init_telemetry};
