//! Input validation at the form boundary.
//!
//! The engine accepts whatever it is given and degrades to zeros. Input
//! providers run these checks first so that malformed series (missing months,
//! negative amounts, duplicate ids) are rejected before they silently skew a
//! correction or an allocation.

use crate::engine::ResourceInputs;
use envalloc_types::{
    AllocationMethod, MONTHS_PER_YEAR, MeasurementEntry, MonthlyValue, UnitProcessCandidate,
    UsageEntry,
};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("entry '{entry_id}' has {count} monthly values, expected 12")]
    MonthCount { entry_id: String, count: usize },

    #[error("entry '{entry_id}' has month {month}, outside 1..=12")]
    MonthOutOfRange { entry_id: String, month: u8 },

    #[error("entry '{entry_id}' lists month {month} more than once")]
    DuplicateMonth { entry_id: String, month: u8 },

    #[error("entry '{entry_id}' has negative amount {amount} in month {month}")]
    NegativeAmount { entry_id: String, month: u8, amount: f64 },

    #[error("entry '{entry_id}' has a non-finite amount in month {month}")]
    NonFiniteAmount { entry_id: String, month: u8 },

    #[error("entry id '{entry_id}' is used more than once")]
    DuplicateEntryId { entry_id: String },

    #[error("method '{method}' needs at least one selected unit process")]
    EmptyCandidateSelection { method: AllocationMethod },

    #[error("selected unit process '{unit_process_id}' is not in the catalogue")]
    UnknownUnitProcess { unit_process_id: String },

    #[error("unit process '{unit_process_id}' has invalid {attribute} {value}")]
    InvalidAttribute { unit_process_id: String, attribute: &'static str, value: f64 },
}

impl ValidationError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MonthCount { .. } => "monthly",
            ValidationError::MonthOutOfRange { .. } | ValidationError::DuplicateMonth { .. } => {
                "month"
            }
            ValidationError::NegativeAmount { .. } | ValidationError::NonFiniteAmount { .. } => {
                "amount"
            }
            ValidationError::DuplicateEntryId { .. } => "id",
            ValidationError::EmptyCandidateSelection { .. }
            | ValidationError::UnknownUnitProcess { .. } => "selected",
            ValidationError::InvalidAttribute { attribute, .. } => *attribute,
        }
    }

    /// Usage, measurement or unit-process id the error is about.
    pub fn entry_id(&self) -> Option<&str> {
        match self {
            ValidationError::MonthCount { entry_id, .. }
            | ValidationError::MonthOutOfRange { entry_id, .. }
            | ValidationError::DuplicateMonth { entry_id, .. }
            | ValidationError::NegativeAmount { entry_id, .. }
            | ValidationError::NonFiniteAmount { entry_id, .. }
            | ValidationError::DuplicateEntryId { entry_id } => Some(entry_id),
            ValidationError::UnknownUnitProcess { unit_process_id }
            | ValidationError::InvalidAttribute { unit_process_id, .. } => Some(unit_process_id),
            ValidationError::EmptyCandidateSelection { .. } => None,
        }
    }
}

/// Exactly twelve values, months 1..=12 each once, finite and non-negative.
pub fn validate_monthly(entry_id: &str, monthly: &[MonthlyValue]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if monthly.len() != MONTHS_PER_YEAR as usize {
        errors.push(ValidationError::MonthCount {
            entry_id: entry_id.to_string(),
            count: monthly.len(),
        });
    }

    let mut seen = HashSet::new();
    for value in monthly {
        if !(1..=MONTHS_PER_YEAR).contains(&value.month) {
            errors.push(ValidationError::MonthOutOfRange {
                entry_id: entry_id.to_string(),
                month: value.month,
            });
        } else if !seen.insert(value.month) {
            errors.push(ValidationError::DuplicateMonth {
                entry_id: entry_id.to_string(),
                month: value.month,
            });
        }

        if !value.amount.is_finite() {
            errors.push(ValidationError::NonFiniteAmount {
                entry_id: entry_id.to_string(),
                month: value.month,
            });
        } else if value.amount < 0.0 {
            errors.push(ValidationError::NegativeAmount {
                entry_id: entry_id.to_string(),
                month: value.month,
                amount: value.amount,
            });
        }
    }
    errors
}

pub fn validate_usage(entries: &[UsageEntry]) -> Vec<ValidationError> {
    let mut errors = duplicate_ids(entries.iter().map(|e| e.id.as_str()));
    for entry in entries {
        errors.extend(validate_monthly(&entry.id, &entry.monthly));
    }
    errors
}

pub fn validate_measurements(entries: &[MeasurementEntry]) -> Vec<ValidationError> {
    let mut errors = duplicate_ids(entries.iter().map(|e| e.id.as_str()));
    for entry in entries {
        errors.extend(validate_monthly(&entry.id, &entry.monthly));
    }
    errors
}

/// Checks the selection against the catalogue and the attributes the
/// automatic methods read.
pub fn validate_selection(
    catalogue: &[UnitProcessCandidate],
    selected: &[String],
    method: AllocationMethod,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if method.is_derived() && selected.is_empty() {
        errors.push(ValidationError::EmptyCandidateSelection { method });
    }

    for id in selected {
        if !catalogue.iter().any(|c| &c.id == id) {
            errors.push(ValidationError::UnknownUnitProcess { unit_process_id: id.clone() });
        }
    }

    for candidate in catalogue {
        let attributes = [
            ("estimatedConsumption", candidate.estimated_consumption),
            ("productionVolume", candidate.production_volume),
        ];
        for (attribute, value) in attributes {
            let Some(value) = value else { continue };
            if !value.is_finite() || value < 0.0 {
                errors.push(ValidationError::InvalidAttribute {
                    unit_process_id: candidate.id.clone(),
                    attribute,
                    value,
                });
            }
        }
    }
    errors
}

/// Every problem with one resource's inputs, in input order.
pub fn validate_inputs(inputs: &ResourceInputs) -> Vec<ValidationError> {
    let mut errors = validate_usage(&inputs.usage);
    errors.extend(validate_measurements(&inputs.measurements));
    errors.extend(validate_selection(&inputs.candidates, &inputs.selected, inputs.method));
    errors
}

fn duplicate_ids<'a>(ids: impl Iterator<Item = &'a str>) -> Vec<ValidationError> {
    let mut seen = HashSet::new();
    ids.filter(|id| !seen.insert(*id))
        .map(|id| ValidationError::DuplicateEntryId { entry_id: id.to_string() })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use envalloc_types::{ScopeRef, zero_months};

    #[test]
    fn well_formed_series_passes() {
        assert!(validate_monthly("grid", &zero_months()).is_empty());
    }

    #[test]
    fn short_series_is_rejected() {
        let mut monthly = zero_months();
        monthly.pop();
        assert_eq!(
            validate_monthly("grid", &monthly),
            vec![ValidationError::MonthCount { entry_id: "grid".into(), count: 11 }]
        );
    }

    #[test]
    fn duplicate_and_out_of_range_months_are_rejected() {
        let mut monthly = zero_months();
        monthly[1].month = 1;
        monthly[2].month = 13;
        let errors = validate_monthly("grid", &monthly);
        assert!(errors.contains(&ValidationError::DuplicateMonth { entry_id: "grid".into(), month: 1 }));
        assert!(errors.contains(&ValidationError::MonthOutOfRange { entry_id: "grid".into(), month: 13 }));
    }

    #[test]
    fn negative_and_nan_amounts_are_rejected() {
        let mut monthly = zero_months();
        monthly[0].amount = -5.0;
        monthly[1].amount = f64::NAN;
        let errors = validate_monthly("grid", &monthly);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field(), "amount");
        assert_eq!(errors[1], ValidationError::NonFiniteAmount { entry_id: "grid".into(), month: 2 });
    }

    #[test]
    fn duplicate_measurement_ids_are_rejected() {
        let entries = vec![
            MeasurementEntry::new("m1", ScopeRef::Site),
            MeasurementEntry::new("m1", ScopeRef::Building("b1".into())),
        ];
        assert_eq!(
            validate_measurements(&entries),
            vec![ValidationError::DuplicateEntryId { entry_id: "m1".into() }]
        );
    }

    #[test]
    fn derived_methods_need_a_selection() {
        let catalogue = vec![UnitProcessCandidate::new("u1", "Kiln")];
        assert_eq!(
            validate_selection(&catalogue, &[], AllocationMethod::ProductionVolume),
            vec![ValidationError::EmptyCandidateSelection {
                method: AllocationMethod::ProductionVolume
            }]
        );
        assert!(validate_selection(&catalogue, &[], AllocationMethod::DirectInput).is_empty());
    }

    #[test]
    fn unknown_selection_and_negative_attributes_are_rejected() {
        let catalogue =
            vec![UnitProcessCandidate::new("u1", "Kiln").with_production_volume(-1.0)];
        let errors = validate_selection(
            &catalogue,
            &["u1".to_string(), "u9".to_string()],
            AllocationMethod::ProductionVolume,
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].entry_id(), Some("u9"));
        assert_eq!(errors[1].field(), "productionVolume");
    }
}
