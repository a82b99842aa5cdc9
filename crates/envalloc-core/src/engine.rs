//! Per-resource recomputation pipeline.
//!
//! A [`ResourceEngine`] owns the inputs for one resource (one electricity
//! type, one waste stream, ...) and exposes the derived outputs as a memoized
//! value. Every mutation drops the memo; the next read recomputes everything
//! from the inputs, so derived values never drift from what they were derived
//! from.

use crate::config::EngineConfig;
use crate::scope_resolution::{MeasurementScopeState, resolve_measurement_scope};
use crate::validation::{ValidationError, validate_inputs};
use envalloc_calculator::{
    AllocationCalculator, AllocationRequest, DirectRatios, MeasurementCorrector, RatioCheck,
    UsageDistribution, distribute, scope_total,
};
use envalloc_types::{
    AllocationMethod, AllocationResult, AllocationScope, CorrectedEntry, MeasurementEntry,
    ResourceKind, ScopeInstance, ScopeKind, ScopeRef, UnitProcessCandidate, UsageEntry,
};
use serde::{Deserialize, Serialize};
use std::cell::OnceCell;
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Everything the form layer supplies for one resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInputs {
    pub resource: ResourceKind,
    #[serde(default)]
    pub usage: Vec<UsageEntry>,
    #[serde(default)]
    pub measurements: Vec<MeasurementEntry>,
    #[serde(default)]
    pub has_measurement: bool,
    #[serde(default)]
    pub method: AllocationMethod,
    /// Full unit-process catalogue, in display order.
    #[serde(default)]
    pub candidates: Vec<UnitProcessCandidate>,
    /// Ids of the unit processes selected for allocation.
    #[serde(default)]
    pub selected: Vec<String>,
    #[serde(default)]
    pub scope_instances: Vec<ScopeInstance>,
    #[serde(default)]
    pub direct_ratios: DirectRatios,
}

impl ResourceInputs {
    pub fn new(resource: ResourceKind) -> Self {
        Self {
            resource,
            usage: Vec::new(),
            measurements: Vec::new(),
            has_measurement: false,
            method: AllocationMethod::default(),
            candidates: Vec::new(),
            selected: Vec::new(),
            scope_instances: Vec::new(),
            direct_ratios: DirectRatios::new(),
        }
    }

    /// Catalogue entries that are selected, in catalogue order.
    pub fn selected_candidates(&self) -> Vec<UnitProcessCandidate> {
        let selected: HashSet<&str> = self.selected.iter().map(String::as_str).collect();
        self.candidates.iter().filter(|c| selected.contains(c.id.as_str())).cloned().collect()
    }
}

/// Everything derived from one resource's inputs.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Derived {
    pub resource: ResourceKind,
    pub unit: String,
    pub measurement_scope: MeasurementScopeState,
    pub corrected: Vec<CorrectedEntry>,
    pub allocations: Vec<AllocationResult>,
    pub checks: Vec<RatioCheck>,
    pub distributions: Vec<UsageDistribution>,
}

/// Pure pipeline: measurement scope, correction, allocation, distribution.
#[instrument(skip_all, fields(resource = %inputs.resource))]
pub fn compute(inputs: &ResourceInputs, config: &EngineConfig) -> Derived {
    let settings = config.calculator_settings();
    let measurement_scope = resolve_measurement_scope(inputs.has_measurement, &inputs.measurements);

    let corrected = if inputs.has_measurement {
        MeasurementCorrector::new(settings.zero_measurement)
            .correct(&inputs.usage, &inputs.measurements)
    } else {
        Vec::new()
    };

    let candidates = inputs.selected_candidates();
    let request = AllocationRequest {
        method: inputs.method,
        candidates: &candidates,
        has_measurement: inputs.has_measurement,
        measurement_scope,
        scope_instances: &inputs.scope_instances,
        direct_ratios: Some(&inputs.direct_ratios),
    };
    let allocations = AllocationCalculator::new(settings).allocate(&request);

    let checks = allocations
        .iter()
        .map(|result| {
            RatioCheck::evaluate(
                result,
                settings.target_total,
                config.reporting.warning_tolerance,
            )
        })
        .collect();

    let distributions = allocations
        .iter()
        .map(|result| {
            let total = scope_total(result, &inputs.usage, &corrected);
            distribute(result, &total, settings.target_total)
        })
        .collect();

    info!(
        measurement_scope = ?measurement_scope,
        corrected = corrected.len(),
        tables = allocations.len(),
        "Recomputed derived values"
    );

    Derived {
        resource: inputs.resource.clone(),
        unit: inputs.resource.default_unit().to_string(),
        measurement_scope: measurement_scope.into(),
        corrected,
        allocations,
        checks,
        distributions,
    }
}

/// Inputs for one resource plus their memoized derived value.
#[derive(Debug)]
pub struct ResourceEngine {
    inputs: ResourceInputs,
    config: EngineConfig,
    derived: OnceCell<Derived>,
}

impl ResourceEngine {
    pub fn new(resource: ResourceKind, config: EngineConfig) -> Self {
        Self::from_inputs(ResourceInputs::new(resource), config)
    }

    pub fn from_inputs(inputs: ResourceInputs, config: EngineConfig) -> Self {
        info!(resource = %inputs.resource, "Creating resource engine");
        Self { inputs, config, derived: OnceCell::new() }
    }

    pub fn inputs(&self) -> &ResourceInputs {
        &self.inputs
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Derived outputs, recomputed on first read after any mutation.
    pub fn derived(&self) -> &Derived {
        self.derived.get_or_init(|| compute(&self.inputs, &self.config))
    }

    /// Resolved measurement scope without running the rest of the pipeline.
    pub fn measurement_scope(&self) -> Option<ScopeKind> {
        resolve_measurement_scope(self.inputs.has_measurement, &self.inputs.measurements)
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        validate_inputs(&self.inputs)
    }

    fn mutate<R>(&mut self, change: impl FnOnce(&mut ResourceInputs) -> R) -> R {
        let result = change(&mut self.inputs);
        if self.derived.take().is_some() {
            debug!(resource = %self.inputs.resource, "Invalidated derived values");
        }
        result
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
        self.derived.take();
    }

    pub fn add_usage(&mut self, entry: UsageEntry) {
        self.mutate(|inputs| inputs.usage.push(entry));
    }

    /// Returns `false` when no entry has the id.
    pub fn remove_usage(&mut self, id: &str) -> bool {
        self.mutate(|inputs| remove_by(&mut inputs.usage, |e| e.id == id))
    }

    /// Edits one month of a usage entry. Returns `false` when the entry or
    /// month does not exist.
    pub fn set_monthly(&mut self, id: &str, month: u8, amount: f64) -> bool {
        self.mutate(|inputs| {
            inputs.usage.iter_mut().find(|e| e.id == id).is_some_and(|e| e.set_amount(month, amount))
        })
    }

    pub fn add_measurement(&mut self, entry: MeasurementEntry) {
        self.mutate(|inputs| inputs.measurements.push(entry));
    }

    pub fn remove_measurement(&mut self, id: &str) -> bool {
        self.mutate(|inputs| remove_by(&mut inputs.measurements, |e| e.id == id))
    }

    pub fn set_measurement_monthly(&mut self, id: &str, month: u8, amount: f64) -> bool {
        self.mutate(|inputs| {
            inputs
                .measurements
                .iter_mut()
                .find(|e| e.id == id)
                .is_some_and(|e| e.set_amount(month, amount))
        })
    }

    pub fn set_measurement_scope(&mut self, id: &str, scope: ScopeRef) -> bool {
        self.mutate(|inputs| match inputs.measurements.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.scope = scope;
                true
            }
            None => false,
        })
    }

    pub fn set_has_measurement(&mut self, has_measurement: bool) {
        self.mutate(|inputs| inputs.has_measurement = has_measurement);
    }

    pub fn set_method(&mut self, method: AllocationMethod) {
        self.mutate(|inputs| inputs.method = method);
    }

    pub fn set_candidates(&mut self, candidates: Vec<UnitProcessCandidate>) {
        self.mutate(|inputs| inputs.candidates = candidates);
    }

    /// Adds a unit process to the selection. Selecting twice is a no-op.
    pub fn select(&mut self, unit_process_id: &str) {
        self.mutate(|inputs| {
            if !inputs.selected.iter().any(|id| id == unit_process_id) {
                inputs.selected.push(unit_process_id.to_string());
            }
        });
    }

    /// Removes a unit process from the selection along with its direct ratios.
    pub fn deselect(&mut self, unit_process_id: &str) -> bool {
        self.mutate(|inputs| {
            inputs.direct_ratios.remove_unit_process(unit_process_id);
            remove_by(&mut inputs.selected, |id| id == unit_process_id)
        })
    }

    pub fn set_scope_instances(&mut self, instances: Vec<ScopeInstance>) {
        self.mutate(|inputs| inputs.scope_instances = instances);
    }

    /// Records a direct-input edit. `scope_instance_id` is `None` for the
    /// site-wide table.
    pub fn set_direct_ratio(
        &mut self,
        scope: AllocationScope,
        scope_instance_id: Option<&str>,
        unit_process_id: &str,
        ratio: f64,
    ) {
        self.mutate(|inputs| {
            inputs.direct_ratios.set(scope, scope_instance_id, unit_process_id, ratio)
        });
    }
}

fn remove_by<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !matches(item));
    items.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> ResourceEngine {
        let mut engine = ResourceEngine::new(ResourceKind::Electricity, EngineConfig::default());
        engine.set_candidates(vec![
            UnitProcessCandidate::new("u1", "Press").with_production_volume(100.0),
            UnitProcessCandidate::new("u2", "Paint").with_production_volume(300.0),
            UnitProcessCandidate::new("u3", "Pack").with_production_volume(600.0),
        ]);
        engine.set_method(AllocationMethod::ProductionVolume);
        engine.add_usage(UsageEntry::with_monthly("grid", [100.0; 12]));
        engine
    }

    #[test]
    fn selection_filters_and_keeps_catalogue_order() {
        let mut engine = engine();
        engine.select("u2");
        engine.select("u1");
        engine.select("u1");

        let derived = engine.derived();
        let ids: Vec<&str> = derived.allocations[0]
            .allocations()
            .iter()
            .map(|a| a.unit_process_id.as_str())
            .collect();
        assert_eq!(ids, vec!["u1", "u2"]);
        assert_eq!(derived.unit, "kWh");
    }

    #[test]
    fn mutations_invalidate_the_memo() {
        let mut engine = engine();
        engine.select("u1");
        engine.select("u2");
        assert_eq!(engine.derived().allocations[0].ratio_for("u1"), Some(25.0));

        engine.select("u3");
        assert_eq!(engine.derived().allocations[0].ratio_for("u1"), Some(10.0));

        assert!(engine.deselect("u3"));
        assert!(!engine.deselect("u3"));
        assert_eq!(engine.derived().allocations[0].ratio_for("u3"), None);
    }

    #[test]
    fn repeated_reads_are_identical() {
        let mut engine = engine();
        engine.select("u1");
        engine.select("u3");
        let first = engine.derived().clone();
        engine.set_monthly("grid", 1, 100.0);
        assert_eq!(&first, engine.derived());
    }

    #[test]
    fn monthly_edits_flow_into_distribution() {
        let mut engine = engine();
        engine.select("u1");
        engine.select("u2");
        assert!(engine.set_monthly("grid", 1, 200.0));
        assert!(!engine.set_monthly("missing", 1, 200.0));

        let distribution = &engine.derived().distributions[0];
        assert_eq!(distribution.rows[0].monthly[0].amount, 50.0);
        assert_eq!(distribution.rows[1].monthly[0].amount, 150.0);
    }

    #[test]
    fn deselect_drops_direct_ratios() {
        let mut engine = engine();
        engine.set_method(AllocationMethod::DirectInput);
        engine.select("u1");
        engine.set_direct_ratio(AllocationScope::Site, None, "u1", 40.0);
        assert_eq!(engine.derived().allocations[0].total_ratio(), 40.0);

        engine.deselect("u1");
        engine.select("u1");
        assert_eq!(engine.derived().allocations[0].total_ratio(), 0.0);
    }
}
