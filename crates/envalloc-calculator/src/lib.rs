//! The calculator layer of the envalloc allocation engine.
//!
//! This crate turns a resource's usage into unit-process allocation tables:
//! [`MeasurementCorrector`] redistributes aggregate usage onto physical
//! measurement points, and [`AllocationCalculator`] derives normalized
//! per-unit-process ratios through a pluggable [`RatioStrategy`].
//!
//! Nothing in here returns an error for numeric edge cases. Zero denominators,
//! empty selections and empty scope lists all degrade to zero or empty outputs
//! so data entry is never blocked.

pub mod built_in;
pub mod calculator;
pub mod correction;
pub mod distribution;
pub mod ratio_check;
pub mod registry;
pub mod rounding;
pub mod strategy;
pub mod types;

pub use built_in::direct_input::{DirectRatioKey, DirectRatios};
pub use calculator::{AllocationCalculator, AllocationRequest};
pub use correction::MeasurementCorrector;
pub use distribution::{DistributedUsage, UsageDistribution, distribute, scope_total};
pub use ratio_check::RatioCheck;
pub use registry::StrategyRegistry;
pub use strategy::RatioStrategy;
pub use types::{CalculatorSettings, ResidualStrategy, ZeroMeasurementPolicy};
