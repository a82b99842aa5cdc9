//! Ratios from each unit process's production volume.

use super::proportional_allocator::ProportionalAllocator;
use crate::strategy::RatioStrategy;
use envalloc_types::{AllocationCandidate, AllocationMethod};

#[derive(Debug, Default)]
pub struct ProductionVolumeStrategy;

impl RatioStrategy for ProductionVolumeStrategy {
    fn method(&self) -> AllocationMethod {
        AllocationMethod::ProductionVolume
    }

    fn derive(&self, candidates: &[&dyn AllocationCandidate]) -> Vec<f64> {
        let weights: Vec<f64> =
            candidates.iter().map(|c| c.production_volume().unwrap_or(0.0)).collect();
        ProportionalAllocator::shares(&weights, 100.0)
    }
}
