use serde::{Deserialize, Serialize};

/// Where the rounding residual goes after per-candidate rounding.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResidualStrategy {
    /// Add the whole residual to the last candidate and re-round it.
    #[default]
    LastCandidate,
    /// Spread the residual one rounding unit at a time over the candidates
    /// whose rounding discarded the most.
    LargestRemainder,
}

/// What happens to a month whose measurement total is zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ZeroMeasurementPolicy {
    /// Every corrected amount for the month is zero; the business total for
    /// that month is not carried over.
    #[default]
    Drop,
    /// The business total is split evenly across all measurement entries.
    EvenSplit,
}

/// Numeric knobs shared by the allocation and correction calculators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CalculatorSettings {
    /// Decimal places every derived ratio is rounded to.
    pub decimals: u32,
    /// Sum derived ratios are normalized to.
    pub target_total: f64,
    /// Residuals at or below this are left alone.
    pub tolerance: f64,
    pub residual: ResidualStrategy,
    pub zero_measurement: ZeroMeasurementPolicy,
}

impl Default for CalculatorSettings {
    fn default() -> Self {
        Self {
            decimals: 1,
            target_total: 100.0,
            tolerance: 0.01,
            residual: ResidualStrategy::LastCandidate,
            zero_measurement: ZeroMeasurementPolicy::Drop,
        }
    }
}
