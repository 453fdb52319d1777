//! Application layer - Use cases and orchestration
//!
//! Contains trend analysis, impact evaluation, the recommendation pipeline,
//! and the port definitions adapters implement.

pub mod error;
pub mod ports;
pub mod services;

pub use error::{ApplicationError, ErrorKind};
pub use ports::*;
pub use services::*;
