//! Directly entered ratios.
//!
//! The strategy itself derives nothing: every ratio starts at 0 and is
//! replaced by whatever the user typed into the allocation table, stored in a
//! [`DirectRatios`] table. Direct ratios are never normalized.

use crate::strategy::RatioStrategy;
use envalloc_types::{AllocationCandidate, AllocationMethod, AllocationScope};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct DirectInputStrategy;

impl RatioStrategy for DirectInputStrategy {
    fn method(&self) -> AllocationMethod {
        AllocationMethod::DirectInput
    }

    fn derive(&self, candidates: &[&dyn AllocationCandidate]) -> Vec<f64> {
        vec![0.0; candidates.len()]
    }
}

/// Identifies one editable cell: a unit process within one allocation table.
/// The table is a scope plus an instance id; `scope_instance_id` is `None`
/// for the site-wide table. Buildings and processes may share ids, so the
/// scope is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectRatioKey {
    pub scope: AllocationScope,
    pub scope_instance_id: Option<String>,
    pub unit_process_id: String,
}

impl DirectRatioKey {
    pub fn new(
        scope: AllocationScope,
        scope_instance_id: Option<&str>,
        unit_process_id: &str,
    ) -> Self {
        Self {
            scope,
            scope_instance_id: scope_instance_id.map(str::to_string),
            unit_process_id: unit_process_id.to_string(),
        }
    }
}

/// Serialized form of one [`DirectRatios`] cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectRatioEntry {
    #[serde(default)]
    pub scope: AllocationScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_instance_id: Option<String>,
    pub unit_process_id: String,
    pub ratio: f64,
}

/// User-entered ratios for the direct input method. Missing cells read as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<DirectRatioEntry>", into = "Vec<DirectRatioEntry>")]
pub struct DirectRatios {
    ratios: HashMap<DirectRatioKey, f64>,
}

impl DirectRatios {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(
        &mut self,
        scope: AllocationScope,
        scope_instance_id: Option<&str>,
        unit_process_id: &str,
        ratio: f64,
    ) {
        self.ratios.insert(DirectRatioKey::new(scope, scope_instance_id, unit_process_id), ratio);
    }

    pub fn get(
        &self,
        scope: AllocationScope,
        scope_instance_id: Option<&str>,
        unit_process_id: &str,
    ) -> f64 {
        let key = DirectRatioKey::new(scope, scope_instance_id, unit_process_id);
        self.ratios.get(&key).copied().unwrap_or(0.0)
    }

    /// Drops every cell for a unit process, e.g. after it is deselected.
    pub fn remove_unit_process(&mut self, unit_process_id: &str) {
        self.ratios.retain(|key, _| key.unit_process_id != unit_process_id);
    }

    pub fn len(&self) -> usize {
        self.ratios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratios.is_empty()
    }
}

impl From<Vec<DirectRatioEntry>> for DirectRatios {
    fn from(entries: Vec<DirectRatioEntry>) -> Self {
        let mut ratios = DirectRatios::new();
        for entry in entries {
            ratios.set(
                entry.scope,
                entry.scope_instance_id.as_deref(),
                &entry.unit_process_id,
                entry.ratio,
            );
        }
        ratios
    }
}

impl From<DirectRatios> for Vec<DirectRatioEntry> {
    fn from(ratios: DirectRatios) -> Self {
        let mut entries: Vec<DirectRatioEntry> = ratios
            .ratios
            .into_iter()
            .map(|(key, ratio)| DirectRatioEntry {
                scope: key.scope,
                scope_instance_id: key.scope_instance_id,
                unit_process_id: key.unit_process_id,
                ratio,
            })
            .collect();
        // HashMap order is unstable; keep serialized output deterministic.
        entries.sort_by(|a, b| {
            (a.scope, &a.scope_instance_id, &a.unit_process_id).cmp(&(
                b.scope,
                &b.scope_instance_id,
                &b.unit_process_id,
            ))
        });
        entries
    }
}
