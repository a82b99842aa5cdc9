use serde::{Deserialize, Serialize};
use std::fmt;

/// Anything that can receive an allocated share of a resource.
///
/// The automatic ratio strategies only ever look at the two optional
/// attributes, so resource modules can implement this for their own
/// unit-process rows without converting them first.
pub trait AllocationCandidate {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn estimated_consumption(&self) -> Option<f64>;
    fn production_volume(&self) -> Option<f64>;
}

/// A unit process that may be selected for allocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnitProcessCandidate {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_consumption: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_volume: Option<f64>,
}

impl UnitProcessCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            estimated_consumption: None,
            production_volume: None,
        }
    }

    pub fn with_estimated_consumption(mut self, value: f64) -> Self {
        self.estimated_consumption = Some(value);
        self
    }

    pub fn with_production_volume(mut self, value: f64) -> Self {
        self.production_volume = Some(value);
        self
    }
}

impl AllocationCandidate for UnitProcessCandidate {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn estimated_consumption(&self) -> Option<f64> {
        self.estimated_consumption
    }

    fn production_volume(&self) -> Option<f64> {
        self.production_volume
    }
}

/// How per-unit-process ratios are derived.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AllocationMethod {
    #[default]
    EquipmentInfo,
    ProductionVolume,
    DirectInput,
}

impl AllocationMethod {
    /// Derived methods are normalized so their ratios sum to 100.
    pub fn is_derived(self) -> bool {
        !matches!(self, AllocationMethod::DirectInput)
    }

    pub fn name(self) -> &'static str {
        match self {
            AllocationMethod::EquipmentInfo => "equipment_info",
            AllocationMethod::ProductionVolume => "production_volume",
            AllocationMethod::DirectInput => "direct_input",
        }
    }
}

impl fmt::Display for AllocationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Granularity at which an independent allocation table is produced.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum AllocationScope {
    #[default]
    Site,
    Building,
    Process,
}

/// A concrete building or process that receives its own allocation table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScopeInstance {
    pub id: String,
    pub name: String,
    pub scope: AllocationScope,
}

impl ScopeInstance {
    pub fn building(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), scope: AllocationScope::Building }
    }

    pub fn process(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), scope: AllocationScope::Process }
    }
}

/// One row of an allocation table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UnitProcessAllocation {
    pub unit_process_id: String,
    pub unit_process_name: String,
    pub ratio: f64,
}

impl UnitProcessAllocation {
    pub fn new(candidate: &dyn AllocationCandidate, ratio: f64) -> Self {
        Self {
            unit_process_id: candidate.id().to_string(),
            unit_process_name: candidate.name().to_string(),
            ratio,
        }
    }
}

/// Allocation table for one scope instance.
///
/// `total_ratio` always equals the sum of the row ratios; every mutation goes
/// through [`AllocationResult::set_ratio`], which recomputes it.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    scope: AllocationScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope_instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope_instance_name: Option<String>,
    allocations: Vec<UnitProcessAllocation>,
    total_ratio: f64,
}

impl AllocationResult {
    pub fn site(allocations: Vec<UnitProcessAllocation>) -> Self {
        Self::build(AllocationScope::Site, None, None, allocations)
    }

    pub fn for_instance(instance: &ScopeInstance, allocations: Vec<UnitProcessAllocation>) -> Self {
        Self::build(
            instance.scope,
            Some(instance.id.clone()),
            Some(instance.name.clone()),
            allocations,
        )
    }

    fn build(
        scope: AllocationScope,
        scope_instance_id: Option<String>,
        scope_instance_name: Option<String>,
        allocations: Vec<UnitProcessAllocation>,
    ) -> Self {
        let total_ratio = allocations.iter().map(|a| a.ratio).sum();
        Self { scope, scope_instance_id, scope_instance_name, allocations, total_ratio }
    }

    pub fn scope(&self) -> AllocationScope {
        self.scope
    }

    pub fn scope_instance_id(&self) -> Option<&str> {
        self.scope_instance_id.as_deref()
    }

    pub fn scope_instance_name(&self) -> Option<&str> {
        self.scope_instance_name.as_deref()
    }

    pub fn allocations(&self) -> &[UnitProcessAllocation] {
        &self.allocations
    }

    pub fn total_ratio(&self) -> f64 {
        self.total_ratio
    }

    pub fn ratio_for(&self, unit_process_id: &str) -> Option<f64> {
        self.allocations.iter().find(|a| a.unit_process_id == unit_process_id).map(|a| a.ratio)
    }

    /// Apply a direct edit to one row. Unknown ids are ignored and reported
    /// with `false`; the table is never rejected.
    pub fn set_ratio(&mut self, unit_process_id: &str, ratio: f64) -> bool {
        let Some(row) = self.allocations.iter_mut().find(|a| a.unit_process_id == unit_process_id)
        else {
            return false;
        };
        row.ratio = ratio;
        self.total_ratio = self.allocations.iter().map(|a| a.ratio).sum();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(ratios: &[f64]) -> Vec<UnitProcessAllocation> {
        ratios
            .iter()
            .enumerate()
            .map(|(i, &ratio)| UnitProcessAllocation {
                unit_process_id: format!("u{}", i + 1),
                unit_process_name: format!("Unit {}", i + 1),
                ratio,
            })
            .collect()
    }

    #[test]
    fn total_ratio_is_sum_of_rows() {
        let result = AllocationResult::site(rows(&[30.0, 30.0, 30.0]));
        assert_eq!(result.total_ratio(), 90.0);
        assert_eq!(result.scope(), AllocationScope::Site);
        assert!(result.scope_instance_id().is_none());
    }

    #[test]
    fn set_ratio_recomputes_total() {
        let mut result = AllocationResult::site(rows(&[30.0, 30.0, 30.0]));
        assert!(result.set_ratio("u3", 40.0));
        assert_eq!(result.total_ratio(), 100.0);
        assert_eq!(result.ratio_for("u3"), Some(40.0));

        assert!(!result.set_ratio("missing", 10.0));
        assert_eq!(result.total_ratio(), 100.0);
    }

    #[test]
    fn instance_results_carry_instance_identity() {
        let building = ScopeInstance::building("b1", "Main plant");
        let result = AllocationResult::for_instance(&building, rows(&[100.0]));
        assert_eq!(result.scope(), AllocationScope::Building);
        assert_eq!(result.scope_instance_id(), Some("b1"));
        assert_eq!(result.scope_instance_name(), Some("Main plant"));
    }

    #[test]
    fn only_direct_input_is_not_derived() {
        assert!(AllocationMethod::EquipmentInfo.is_derived());
        assert!(AllocationMethod::ProductionVolume.is_derived());
        assert!(!AllocationMethod::DirectInput.is_derived());
    }
}
