//! Telemetry and distributed tracing infrastructure
//!
//! Console logging through `tracing-subscriber`, with optional OTLP export.

mod otel;

pub use otel::{TelemetryConfig, TelemetryError, TelemetryGuard, init_telemetry};
