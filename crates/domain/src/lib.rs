//! Domain layer for the climate advisor
//!
//! Contains the climate data model, sector and severity vocabulary, and
//! domain errors. This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
