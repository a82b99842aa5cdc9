use envalloc_calculator::{
    AllocationCalculator, AllocationRequest, CalculatorSettings, DirectRatios, RatioCheck,
    ResidualStrategy,
};
use envalloc_types::{
    AllocationMethod, AllocationResult, AllocationScope, ScopeInstance, ScopeKind,
    UnitProcessCandidate,
};
use proptest::prelude::*;

fn by_volume(volumes: &[f64]) -> Vec<UnitProcessCandidate> {
    volumes
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            UnitProcessCandidate::new(format!("u{}", i + 1), format!("Unit {}", i + 1))
                .with_production_volume(v)
        })
        .collect()
}

fn by_consumption(consumptions: &[f64]) -> Vec<UnitProcessCandidate> {
    consumptions
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            UnitProcessCandidate::new(format!("u{}", i + 1), format!("Unit {}", i + 1))
                .with_estimated_consumption(c)
        })
        .collect()
}

fn ratios(result: &AllocationResult) -> Vec<f64> {
    result.allocations().iter().map(|a| a.ratio).collect()
}

fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-9, "expected {expected:?}, got {actual:?}");
    }
}

#[test]
fn production_volume_without_measurement_yields_one_site_table() {
    let candidates = by_volume(&[100.0, 300.0]);
    let results = AllocationCalculator::default()
        .allocate(&AllocationRequest::site(AllocationMethod::ProductionVolume, &candidates));

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].scope(), AllocationScope::Site);
    assert_close(&ratios(&results[0]), &[25.0, 75.0]);
    assert!((results[0].total_ratio() - 100.0).abs() < 1e-9);
}

#[test]
fn rounding_shortfall_lands_on_last_candidate() {
    let candidates = by_volume(&[100.0, 150.0, 200.0]);
    let results = AllocationCalculator::default()
        .allocate(&AllocationRequest::site(AllocationMethod::ProductionVolume, &candidates));

    assert_close(&ratios(&results[0]), &[22.2, 33.3, 44.5]);
    assert!((results[0].total_ratio() - 100.0).abs() < 0.01);
}

#[test]
fn largest_remainder_setting_spreads_the_residual() {
    let settings = CalculatorSettings {
        residual: ResidualStrategy::LargestRemainder,
        ..CalculatorSettings::default()
    };
    let candidates = by_consumption(&[1.0, 1.0, 1.0]);
    let results = AllocationCalculator::new(settings)
        .allocate(&AllocationRequest::site(AllocationMethod::EquipmentInfo, &candidates));

    assert_close(&ratios(&results[0]), &[33.4, 33.3, 33.3]);
}

#[test]
fn equipment_info_uses_estimated_consumption_only() {
    let candidates = vec![
        UnitProcessCandidate::new("u1", "Kiln")
            .with_estimated_consumption(3.0)
            .with_production_volume(1.0),
        UnitProcessCandidate::new("u2", "Mill")
            .with_estimated_consumption(1.0)
            .with_production_volume(3.0),
    ];
    let results = AllocationCalculator::default()
        .allocate(&AllocationRequest::site(AllocationMethod::EquipmentInfo, &candidates));

    assert_close(&ratios(&results[0]), &[75.0, 25.0]);
}

#[test]
fn zero_consumption_everywhere_stays_at_zero() {
    let candidates = by_consumption(&[0.0, 0.0, 0.0]);
    let results = AllocationCalculator::default()
        .allocate(&AllocationRequest::site(AllocationMethod::EquipmentInfo, &candidates));

    assert_eq!(ratios(&results[0]), vec![0.0, 0.0, 0.0]);
    assert_eq!(results[0].total_ratio(), 0.0);
}

#[test]
fn missing_attributes_count_as_zero() {
    let candidates = vec![
        UnitProcessCandidate::new("u1", "Kiln").with_production_volume(50.0),
        UnitProcessCandidate::new("u2", "Mill"),
    ];
    let results = AllocationCalculator::default()
        .allocate(&AllocationRequest::site(AllocationMethod::ProductionVolume, &candidates));

    assert_close(&ratios(&results[0]), &[100.0, 0.0]);
}

#[test]
fn empty_selection_yields_an_empty_site_table() {
    let candidates: Vec<UnitProcessCandidate> = Vec::new();
    let results = AllocationCalculator::default()
        .allocate(&AllocationRequest::site(AllocationMethod::ProductionVolume, &candidates));

    assert_eq!(results.len(), 1);
    assert!(results[0].allocations().is_empty());
    assert_eq!(results[0].total_ratio(), 0.0);
}

#[test]
fn fine_grained_measurement_scopes_skip_allocation() {
    let candidates = by_volume(&[1.0, 2.0]);
    let calculator = AllocationCalculator::default();

    for scope in [ScopeKind::SubProcess, ScopeKind::Facility] {
        let request = AllocationRequest {
            has_measurement: true,
            measurement_scope: Some(scope),
            ..AllocationRequest::site(AllocationMethod::ProductionVolume, &candidates)
        };
        assert!(calculator.allocate(&request).is_empty(), "{scope:?} should be gated");
    }
}

#[test]
fn building_scope_fans_out_identical_tables() {
    let candidates = by_volume(&[100.0, 300.0]);
    let instances = vec![
        ScopeInstance::building("b1", "North plant"),
        ScopeInstance::process("p1", "Casting"),
        ScopeInstance::building("b2", "South plant"),
    ];
    let request = AllocationRequest {
        has_measurement: true,
        measurement_scope: Some(ScopeKind::Building),
        scope_instances: &instances,
        ..AllocationRequest::site(AllocationMethod::ProductionVolume, &candidates)
    };

    let results = AllocationCalculator::default().allocate(&request);
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].scope_instance_id(), Some("b1"));
    assert_eq!(results[1].scope_instance_id(), Some("b2"));
    assert_eq!(results[0].allocations(), results[1].allocations());
    assert!(results.iter().all(|r| r.scope() == AllocationScope::Building));
}

#[test]
fn process_scope_with_no_instances_yields_nothing() {
    let candidates = by_volume(&[1.0]);
    let request = AllocationRequest {
        has_measurement: true,
        measurement_scope: Some(ScopeKind::Process),
        ..AllocationRequest::site(AllocationMethod::ProductionVolume, &candidates)
    };
    assert!(AllocationCalculator::default().allocate(&request).is_empty());
}

#[test]
fn measurement_without_resolved_scope_allocates_site_wide() {
    let candidates = by_volume(&[1.0, 1.0]);
    let instances = vec![ScopeInstance::building("b1", "North plant")];
    let request = AllocationRequest {
        has_measurement: true,
        measurement_scope: None,
        scope_instances: &instances,
        ..AllocationRequest::site(AllocationMethod::ProductionVolume, &candidates)
    };

    let results = AllocationCalculator::default().allocate(&request);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].scope(), AllocationScope::Site);
}

#[test]
fn direct_input_passes_entered_ratios_through() {
    let candidates = by_volume(&[10.0, 20.0, 30.0]);
    let mut direct = DirectRatios::new();
    for id in ["u1", "u2", "u3"] {
        direct.set(AllocationScope::Site, None, id, 30.0);
    }
    let request = AllocationRequest {
        direct_ratios: Some(&direct),
        ..AllocationRequest::site(AllocationMethod::DirectInput, &candidates)
    };

    let results = AllocationCalculator::default().allocate(&request);
    assert_eq!(ratios(&results[0]), vec![30.0, 30.0, 30.0]);
    assert_eq!(results[0].total_ratio(), 90.0);

    let check = RatioCheck::evaluate(&results[0], 100.0, 0.01);
    assert!(!check.is_balanced);
}

#[test]
fn direct_input_without_edits_starts_at_zero() {
    let candidates = by_volume(&[10.0, 20.0]);
    let results = AllocationCalculator::default()
        .allocate(&AllocationRequest::site(AllocationMethod::DirectInput, &candidates));
    assert_eq!(ratios(&results[0]), vec![0.0, 0.0]);
}

#[test]
fn direct_input_reads_per_instance_cells() {
    let candidates = by_volume(&[1.0, 1.0]);
    let instances = vec![
        ScopeInstance::process("p1", "Casting"),
        ScopeInstance::process("p2", "Rolling"),
    ];
    let mut direct = DirectRatios::new();
    direct.set(AllocationScope::Process, Some("p1"), "u1", 60.0);
    direct.set(AllocationScope::Process, Some("p1"), "u2", 40.0);
    direct.set(AllocationScope::Process, Some("p2"), "u1", 10.0);

    let request = AllocationRequest {
        has_measurement: true,
        measurement_scope: Some(ScopeKind::Process),
        scope_instances: &instances,
        direct_ratios: Some(&direct),
        ..AllocationRequest::site(AllocationMethod::DirectInput, &candidates)
    };

    let results = AllocationCalculator::default().allocate(&request);
    assert_eq!(ratios(&results[0]), vec![60.0, 40.0]);
    assert_eq!(ratios(&results[1]), vec![10.0, 0.0]);
    assert_eq!(results[1].total_ratio(), 10.0);
}

#[test]
fn allocation_is_idempotent() {
    let candidates = by_volume(&[13.0, 17.0, 19.0, 23.0]);
    let calculator = AllocationCalculator::default();
    let request = AllocationRequest::site(AllocationMethod::ProductionVolume, &candidates);
    assert_eq!(calculator.allocate(&request), calculator.allocate(&request));
}

proptest! {
    #[test]
    fn derived_tables_always_sum_to_one_hundred(
        volumes in prop::collection::vec(0.0f64..10_000.0, 1..12)
    ) {
        prop_assume!(volumes.iter().sum::<f64>() > 0.0);
        let candidates = by_volume(&volumes);
        let results = AllocationCalculator::default()
            .allocate(&AllocationRequest::site(AllocationMethod::ProductionVolume, &candidates));
        prop_assert!((results[0].total_ratio() - 100.0).abs() < 0.01);
    }

    #[test]
    fn largest_remainder_tables_also_sum_to_one_hundred(
        consumptions in prop::collection::vec(0.0f64..10_000.0, 1..12)
    ) {
        prop_assume!(consumptions.iter().sum::<f64>() > 0.0);
        let settings = CalculatorSettings {
            residual: ResidualStrategy::LargestRemainder,
            ..CalculatorSettings::default()
        };
        let candidates = by_consumption(&consumptions);
        let results = AllocationCalculator::new(settings)
            .allocate(&AllocationRequest::site(AllocationMethod::EquipmentInfo, &candidates));
        prop_assert!((results[0].total_ratio() - 100.0).abs() < 0.01);
    }
}
