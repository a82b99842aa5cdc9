//! Deriving the measurement scope from the current measurement entries.
//!
//! The scope is never chosen directly. It is the most frequent non-site scope
//! among the measurement entries, recomputed whenever measurements are added,
//! removed or re-scoped, or measurement is toggled.

use envalloc_types::{MeasurementEntry, ScopeKind};
use serde::Serialize;

/// Projection of the resolved scope, for display.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementScopeState {
    #[default]
    Unset,
    Building,
    Process,
    SubProcess,
    Facility,
}

impl From<Option<ScopeKind>> for MeasurementScopeState {
    fn from(scope: Option<ScopeKind>) -> Self {
        match scope {
            None | Some(ScopeKind::Site) => MeasurementScopeState::Unset,
            Some(ScopeKind::Building) => MeasurementScopeState::Building,
            Some(ScopeKind::Process) => MeasurementScopeState::Process,
            Some(ScopeKind::SubProcess) => MeasurementScopeState::SubProcess,
            Some(ScopeKind::Facility) => MeasurementScopeState::Facility,
        }
    }
}

/// Most frequent non-site scope kind, or `None` when measurement is off or no
/// entry is scoped below the site.
///
/// Kinds are counted in the order they are first seen; among the kinds with
/// the highest count, the first seen wins.
pub fn resolve_measurement_scope(
    has_measurement: bool,
    measurements: &[MeasurementEntry],
) -> Option<ScopeKind> {
    if !has_measurement {
        return None;
    }

    let mut counts: Vec<(ScopeKind, usize)> = Vec::new();
    for kind in measurements.iter().map(|m| m.scope.kind()) {
        if kind == ScopeKind::Site {
            continue;
        }
        match counts.iter_mut().find(|(seen, _)| *seen == kind) {
            Some((_, count)) => *count += 1,
            None => counts.push((kind, 1)),
        }
    }

    let best = counts.iter().map(|&(_, count)| count).max()?;
    counts.into_iter().find(|&(_, count)| count == best).map(|(kind, _)| kind)
}
