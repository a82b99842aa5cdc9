//! Measurement correction.
//!
//! Aggregate usage has a reliable total but no spatial detail; measurements
//! have spatial detail but need not add up to the aggregate. Correction keeps
//! the aggregate total for each month and splits it across the measurement
//! points in proportion to each point's measured share of that month.

use crate::built_in::proportional_allocator::ProportionalAllocator;
use crate::types::ZeroMeasurementPolicy;
use envalloc_types::{
    CorrectedEntry, MONTHS_PER_YEAR, MeasurementEntry, MonthlyValue, UsageEntry, monthly_sum,
};
use tracing::{debug, instrument};

#[derive(Debug, Default, Clone, Copy)]
pub struct MeasurementCorrector {
    zero_policy: ZeroMeasurementPolicy,
}

impl MeasurementCorrector {
    pub fn new(zero_policy: ZeroMeasurementPolicy) -> Self {
        Self { zero_policy }
    }

    /// Redistributes the monthly business totals onto the measurement entries.
    ///
    /// Returns one corrected entry per measurement, in input order. An empty
    /// `aggregate` yields all-zero entries; an empty `measurements` list
    /// yields nothing.
    #[instrument(skip_all, fields(aggregate = aggregate.len(), measurements = measurements.len()))]
    pub fn correct(
        &self,
        aggregate: &[UsageEntry],
        measurements: &[MeasurementEntry],
    ) -> Vec<CorrectedEntry> {
        if measurements.is_empty() {
            return Vec::new();
        }

        let months: Vec<MonthTotals> = (1..=MONTHS_PER_YEAR)
            .map(|month| MonthTotals {
                month,
                business: monthly_sum(aggregate.iter().map(|e| e.monthly.as_slice()), month),
                measured: monthly_sum(measurements.iter().map(|m| m.monthly.as_slice()), month),
            })
            .collect();

        let dropped: Vec<u8> = months
            .iter()
            .filter(|t| t.measured == 0.0 && t.business > 0.0)
            .map(|t| t.month)
            .collect();
        if !dropped.is_empty() {
            debug!(
                months = ?dropped,
                policy = ?self.zero_policy,
                "Months with usage but no measured amount"
            );
        }

        let count = measurements.len() as f64;
        measurements
            .iter()
            .map(|measurement| {
                let monthly = months
                    .iter()
                    .map(|t| {
                        let amount = if t.measured > 0.0 {
                            ProportionalAllocator::allocate(
                                t.business,
                                measurement.amount_for(t.month),
                                t.measured,
                            )
                        } else {
                            match self.zero_policy {
                                ZeroMeasurementPolicy::Drop => 0.0,
                                ZeroMeasurementPolicy::EvenSplit => {
                                    ProportionalAllocator::allocate(t.business, 1.0, count)
                                }
                            }
                        };
                        MonthlyValue::new(t.month, amount)
                    })
                    .collect();
                CorrectedEntry::new(measurement.id.clone(), measurement.scope.clone(), monthly)
            })
            .collect()
    }
}

struct MonthTotals {
    month: u8,
    business: f64,
    measured: f64,
}
