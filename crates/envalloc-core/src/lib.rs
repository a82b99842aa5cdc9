#![allow(missing_docs)]
//! Recomputation pipeline for the envalloc allocation engine.
//!
//! This crate wires the calculators into a per-resource pipeline: it resolves
//! the measurement scope, corrects aggregate usage against measurements,
//! allocates the result across the selected unit processes and distributes
//! usage back onto them. Derived values are memoized per resource and rebuilt
//! from the inputs after every mutation.

/// Engine configuration loaded from TOML
pub mod config;
/// Memoized per-resource pipeline
pub mod engine;
/// Error types for pipeline boundaries
pub mod error;
/// Measurement scope derivation
pub mod scope_resolution;
/// Input validation for form providers
pub mod validation;
/// Multi-resource workbooks
pub mod workbook;

pub use config::EngineConfig;
pub use engine::{Derived, ResourceEngine, ResourceInputs, compute};
pub use error::{EnvallocError, EnvallocResult, ErrorSeverity};
pub use scope_resolution::{MeasurementScopeState, resolve_measurement_scope};
pub use validation::ValidationError;
pub use workbook::{ResourceIssue, Workbook};
