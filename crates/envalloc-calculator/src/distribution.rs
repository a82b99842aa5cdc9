//! Turning an allocation table back into usage amounts.
//!
//! Each unit process receives `scope_total[k] * ratio / target_total` for
//! every month `k`. Direct-input tables that do not add up to the target are
//! distributed as entered; the shortfall or excess is left visible.

use crate::built_in::proportional_allocator::ProportionalAllocator;
use envalloc_types::{
    AllocationResult, AllocationScope, CorrectedEntry, MONTHS_PER_YEAR, MonthlyValue, ScopeKind,
    UsageEntry, monthly_sum,
};
use serde::Serialize;

/// Usage attributed to one unit process.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DistributedUsage {
    pub unit_process_id: String,
    pub unit_process_name: String,
    pub ratio: f64,
    pub monthly: Vec<MonthlyValue>,
    pub total_amount: f64,
}

/// Usage attributed to every unit process of one allocation table.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UsageDistribution {
    pub scope: AllocationScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_instance_id: Option<String>,
    pub rows: Vec<DistributedUsage>,
    pub total_amount: f64,
}

/// Monthly usage a table distributes: the business aggregate for the site
/// table, otherwise the corrected entries measured at that building or
/// process.
pub fn scope_total(
    result: &AllocationResult,
    aggregate: &[UsageEntry],
    corrected: &[CorrectedEntry],
) -> Vec<MonthlyValue> {
    let kind = match result.scope() {
        AllocationScope::Site => {
            return (1..=MONTHS_PER_YEAR)
                .map(|month| {
                    let amount = monthly_sum(aggregate.iter().map(|e| e.monthly.as_slice()), month);
                    MonthlyValue::new(month, amount)
                })
                .collect();
        }
        AllocationScope::Building => ScopeKind::Building,
        AllocationScope::Process => ScopeKind::Process,
    };

    let matching: Vec<&CorrectedEntry> = corrected
        .iter()
        .filter(|entry| {
            entry.scope().kind() == kind && entry.scope().id() == result.scope_instance_id()
        })
        .collect();

    (1..=MONTHS_PER_YEAR)
        .map(|month| {
            let amount = monthly_sum(matching.iter().map(|e| e.monthly()), month);
            MonthlyValue::new(month, amount)
        })
        .collect()
}

pub fn distribute(
    result: &AllocationResult,
    scope_total: &[MonthlyValue],
    target_total: f64,
) -> UsageDistribution {
    let rows: Vec<DistributedUsage> = result
        .allocations()
        .iter()
        .map(|allocation| {
            let monthly: Vec<MonthlyValue> = scope_total
                .iter()
                .map(|total| {
                    let amount =
                        ProportionalAllocator::allocate(total.amount, allocation.ratio, target_total);
                    MonthlyValue::new(total.month, amount)
                })
                .collect();
            DistributedUsage {
                unit_process_id: allocation.unit_process_id.clone(),
                unit_process_name: allocation.unit_process_name.clone(),
                ratio: allocation.ratio,
                total_amount: monthly.iter().map(|v| v.amount).sum(),
                monthly,
            }
        })
        .collect();

    UsageDistribution {
        scope: result.scope(),
        scope_instance_id: result.scope_instance_id().map(str::to_string),
        total_amount: rows.iter().map(|r| r.total_amount).sum(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envalloc_types::{ScopeInstance, ScopeRef, UnitProcessAllocation};

    fn row(id: &str, ratio: f64) -> UnitProcessAllocation {
        UnitProcessAllocation {
            unit_process_id: id.to_string(),
            unit_process_name: id.to_uppercase(),
            ratio,
        }
    }

    #[test]
    fn site_total_comes_from_aggregate() {
        let aggregate = vec![
            UsageEntry::with_monthly("grid", [100.0; 12]),
            UsageEntry::with_monthly("solar", [20.0; 12]),
        ];
        let result = AllocationResult::site(vec![row("u1", 100.0)]);
        let total = scope_total(&result, &aggregate, &[]);
        assert_eq!(total.len(), 12);
        assert!(total.iter().all(|v| v.amount == 120.0));
    }

    #[test]
    fn building_total_comes_from_matching_corrected_entries() {
        let corrected = vec![
            CorrectedEntry::new(
                "m1",
                ScopeRef::Building("b1".into()),
                vec![MonthlyValue::new(1, 40.0)],
            ),
            CorrectedEntry::new(
                "m2",
                ScopeRef::Building("b2".into()),
                vec![MonthlyValue::new(1, 60.0)],
            ),
            CorrectedEntry::new(
                "m3",
                ScopeRef::Process("b1".into()),
                vec![MonthlyValue::new(1, 99.0)],
            ),
        ];
        let building = ScopeInstance::building("b1", "Plant 1");
        let result = AllocationResult::for_instance(&building, vec![row("u1", 100.0)]);

        let total = scope_total(&result, &[], &corrected);
        assert_eq!(total[0].amount, 40.0);
        assert_eq!(total[1].amount, 0.0);
    }

    #[test]
    fn distributes_by_ratio() {
        let result = AllocationResult::site(vec![row("u1", 25.0), row("u2", 75.0)]);
        let total: Vec<MonthlyValue> = (1..=12).map(|m| MonthlyValue::new(m, 400.0)).collect();

        let distribution = distribute(&result, &total, 100.0);
        assert_eq!(distribution.rows[0].monthly[0].amount, 100.0);
        assert_eq!(distribution.rows[1].monthly[0].amount, 300.0);
        assert_eq!(distribution.rows[1].total_amount, 3600.0);
        assert_eq!(distribution.total_amount, 4800.0);
    }
}
