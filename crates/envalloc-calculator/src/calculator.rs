//! Allocation of a resource's usage across selected unit processes.

use crate::built_in::direct_input::DirectRatios;
use crate::registry::StrategyRegistry;
use crate::rounding::round_and_normalize;
use crate::types::CalculatorSettings;
use envalloc_types::{
    AllocationCandidate, AllocationMethod, AllocationResult, AllocationScope, ScopeInstance,
    ScopeKind, UnitProcessAllocation,
};
use tracing::{debug, instrument};

/// Everything one allocation pass needs.
///
/// `candidates` must already be filtered to the user's selection, in
/// catalogue order. `direct_ratios` is only read for
/// [`AllocationMethod::DirectInput`].
#[derive(Debug)]
pub struct AllocationRequest<'a, C> {
    pub method: AllocationMethod,
    pub candidates: &'a [C],
    pub has_measurement: bool,
    pub measurement_scope: Option<ScopeKind>,
    pub scope_instances: &'a [ScopeInstance],
    pub direct_ratios: Option<&'a DirectRatios>,
}

impl<'a, C> AllocationRequest<'a, C> {
    /// A site-wide request without measurements.
    pub fn site(method: AllocationMethod, candidates: &'a [C]) -> Self {
        Self {
            method,
            candidates,
            has_measurement: false,
            measurement_scope: None,
            scope_instances: &[],
            direct_ratios: None,
        }
    }
}

pub struct AllocationCalculator {
    registry: StrategyRegistry,
    settings: CalculatorSettings,
}

impl Default for AllocationCalculator {
    fn default() -> Self {
        Self::new(CalculatorSettings::default())
    }
}

impl AllocationCalculator {
    pub fn new(settings: CalculatorSettings) -> Self {
        Self { registry: StrategyRegistry::with_built_ins(), settings }
    }

    pub fn with_registry(registry: StrategyRegistry, settings: CalculatorSettings) -> Self {
        Self { registry, settings }
    }

    pub fn settings(&self) -> &CalculatorSettings {
        &self.settings
    }

    /// Produces one allocation table per scope instance.
    ///
    /// Returns an empty list when the measurement scope is too fine-grained to
    /// allocate against (sub-process or facility).
    #[instrument(skip(self, request), fields(method = %request.method, candidates = request.candidates.len()))]
    pub fn allocate<C: AllocationCandidate>(
        &self,
        request: &AllocationRequest<'_, C>,
    ) -> Vec<AllocationResult> {
        let target_scope = match request.measurement_scope {
            Some(kind) => match kind.allocation_scope() {
                Some(scope) => scope,
                None => {
                    debug!(measurement_scope = ?kind, "Allocation skipped for measurement scope");
                    return Vec::new();
                }
            },
            None => AllocationScope::Site,
        };

        let candidates: Vec<&dyn AllocationCandidate> =
            request.candidates.iter().map(|c| c as &dyn AllocationCandidate).collect();
        let ratios = self.derive_ratios(request.method, &candidates);

        let results: Vec<AllocationResult> =
            if !request.has_measurement || target_scope == AllocationScope::Site {
                let rows = self.rows(request, &candidates, &ratios, AllocationScope::Site, None);
                vec![AllocationResult::site(rows)]
            } else {
                request
                    .scope_instances
                    .iter()
                    .filter(|instance| instance.scope == target_scope)
                    .map(|instance| {
                        let instance_id = Some(instance.id.as_str());
                        let rows =
                            self.rows(request, &candidates, &ratios, instance.scope, instance_id);
                        AllocationResult::for_instance(instance, rows)
                    })
                    .collect()
            };

        debug!(tables = results.len(), scope = ?target_scope, "Allocation completed");
        results
    }

    /// Raw strategy output, rounded and (for derived methods) normalized.
    pub fn derive_ratios(
        &self,
        method: AllocationMethod,
        candidates: &[&dyn AllocationCandidate],
    ) -> Vec<f64> {
        let Some(strategy) = self.registry.get(method) else {
            debug!(%method, "No strategy registered; ratios default to zero");
            return vec![0.0; candidates.len()];
        };
        let raw = strategy.derive(candidates);
        if method.is_derived() {
            round_and_normalize(&raw, &self.settings)
        } else {
            raw
        }
    }

    fn rows<C>(
        &self,
        request: &AllocationRequest<'_, C>,
        candidates: &[&dyn AllocationCandidate],
        ratios: &[f64],
        scope: AllocationScope,
        scope_instance_id: Option<&str>,
    ) -> Vec<UnitProcessAllocation> {
        candidates
            .iter()
            .zip(ratios)
            .map(|(&candidate, &derived)| {
                let ratio = match (request.method, request.direct_ratios) {
                    (AllocationMethod::DirectInput, Some(direct)) => {
                        direct.get(scope, scope_instance_id, candidate.id())
                    }
                    _ => derived,
                };
                UnitProcessAllocation::new(candidate, ratio)
            })
            .collect()
    }
}
