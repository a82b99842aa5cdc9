use envalloc_types::AllocationResult;
use serde::Serialize;

/// Advisory check of an allocation table against its target total.
///
/// Consumers use this to flag direct-input tables that do not add up; it
/// never rejects a table.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatioCheck {
    pub total_ratio: f64,
    pub deviation: f64,
    pub is_balanced: bool,
}

impl RatioCheck {
    pub fn evaluate(result: &AllocationResult, target_total: f64, tolerance: f64) -> Self {
        let total_ratio = result.total_ratio();
        let deviation = total_ratio - target_total;
        Self { total_ratio, deviation, is_balanced: deviation.abs() < tolerance }
    }
}
