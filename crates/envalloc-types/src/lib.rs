//! Envalloc Types
//!
//! This crate defines the core types and data structures shared by the envalloc
//! crates (`envalloc-calculator`, `envalloc-core` and the CLI). Keeping them here
//! lets the calculator stay free of pipeline concerns and avoids circular
//! dependencies between crates.

#![deny(clippy::all)]

mod allocation;
mod usage;

pub use allocation::{
    AllocationCandidate, AllocationMethod, AllocationResult, AllocationScope, ScopeInstance,
    UnitProcessAllocation, UnitProcessCandidate,
};
pub use usage::{
    CorrectedEntry, DataQuality, MONTHS_PER_YEAR, MeasurementEntry, MonthlyValue, ResourceKind,
    ScopeKind, ScopeRef, UsageEntry, monthly_sum, zero_months,
};
