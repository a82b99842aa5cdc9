//! Ratios from each unit process's estimated equipment consumption.

use super::proportional_allocator::ProportionalAllocator;
use crate::strategy::RatioStrategy;
use envalloc_types::{AllocationCandidate, AllocationMethod};

/// `ratio[i] = 100 * estimated[i] / Σ estimated`. Missing estimates count as 0.
#[derive(Debug, Default)]
pub struct EquipmentInfoStrategy;

impl RatioStrategy for EquipmentInfoStrategy {
    fn method(&self) -> AllocationMethod {
        AllocationMethod::EquipmentInfo
    }

    fn derive(&self, candidates: &[&dyn AllocationCandidate]) -> Vec<f64> {
        let weights: Vec<f64> =
            candidates.iter().map(|c| c.estimated_consumption().unwrap_or(0.0)).collect();
        ProportionalAllocator::shares(&weights, 100.0)
    }
}
