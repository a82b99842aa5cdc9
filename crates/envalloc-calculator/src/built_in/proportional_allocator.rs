//! Proportional Allocator
//!
//! Distributes `total_amount` proportionally based on an `individual_value`
//! relative to a `total_value`.
//!
//! result = total_amount * (individual_value / total_value)
//!
//! Returns 0 when `total_value` is 0.

#[derive(Debug, Default, Clone, Copy)]
pub struct ProportionalAllocator;

impl ProportionalAllocator {
    pub fn allocate(total_amount: f64, individual_value: f64, total_value: f64) -> f64 {
        if total_value == 0.0 {
            return 0.0;
        }
        total_amount * (individual_value / total_value)
    }

    /// Splits `scale` across `weights` in proportion to each weight.
    /// Every share is 0 when the weights sum to 0.
    pub fn shares(weights: &[f64], scale: f64) -> Vec<f64> {
        let total: f64 = weights.iter().sum();
        weights.iter().map(|&w| Self::allocate(scale, w, total)).collect()
    }
}
