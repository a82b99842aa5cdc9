use envalloc_types::{AllocationCandidate, AllocationMethod};

/// A ratio-derivation strategy.
///
/// Strategies are stateless and thread-safe. `derive` returns one raw
/// (unrounded) percentage per candidate, in candidate order; rounding and
/// normalization are applied afterwards by the calculator.
pub trait RatioStrategy: Send + Sync {
    /// The allocation method this strategy implements.
    fn method(&self) -> AllocationMethod;

    /// Derives raw ratios for the candidates.
    fn derive(&self, candidates: &[&dyn AllocationCandidate]) -> Vec<f64>;
}
