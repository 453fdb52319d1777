//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod narrative_inference_adapter;
mod weather_adapter;

pub use narrative_inference_adapter::NarrativeInferenceAdapter;
pub use weather_adapter::{MAX_HISTORY_DAYS, WeatherAdapter};
