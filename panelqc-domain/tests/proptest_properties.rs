//! Property-based tests for the rule engine and merger.
//!
//! These tests verify that:
//! - Spacing exactly on the tolerance boundary is never reported
//! - A missing rule family contributes no violations
//! - Merge totals equal deterministic count plus external-only count
//! - Evaluation is reproducible for identical input

use panelqc_domain::{evaluate, merge};
use panelqc_types::{
    CheckResult, Duct, ExternalFindings, PanelData, RuleTable, Severity, Stud, Violation,
    ViolationType,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn panel_with_studs(positions: &[f64]) -> PanelData {
    PanelData {
        panel_id: "P1".to_string(),
        name: "Prop panel".to_string(),
        width_mm: 10_000.0,
        height_mm: 2440.0,
        studs: positions
            .iter()
            .enumerate()
            .map(|(i, &position_mm)| Stud {
                stud_id: format!("S{i}"),
                position_mm,
                width_mm: 38.0,
                depth_mm: 89.0,
            })
            .collect(),
        openings: vec![],
        ducts: vec![],
        seismic_zone: 1,
    }
}

fn spacing_rules(standard: f64, tolerance: f64) -> RuleTable {
    let mut rules = RuleTable::building_code_defaults();
    if let Some(s) = rules.stud_spacing.as_mut() {
        s.standard_spacing_mm = Some(standard);
        s.tolerance_mm = Some(tolerance);
    }
    rules
}

fn violation(id: &str) -> Violation {
    Violation::new(id, "R", "E", ViolationType::Unknown, Severity::Medium, "r")
}

/// Strategy for short id lists drawn from a small alphabet so collisions are common.
fn arb_ids() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-E][0-3]", 0..8)
}

proptest! {
    /// Deviation equal to the tolerance, in either direction, passes.
    #[test]
    fn tolerance_boundary_is_not_a_violation(
        standard in 300.0f64..600.0,
        tolerance in 0.5f64..20.0,
        signs in prop::collection::vec(any::<bool>(), 1..8),
    ) {
        let mut positions = vec![0.0];
        for wide in &signs {
            let last = *positions.last().unwrap();
            let step = if *wide { standard + tolerance } else { standard - tolerance };
            positions.push(last + step);
        }

        let result = evaluate(&panel_with_studs(&positions), &spacing_rules(standard, tolerance));
        prop_assert!(result.violations.is_empty(), "{:?}", result.violations);
    }

    /// Dropping the clearance family silences clearance findings instead of erroring.
    #[test]
    fn missing_family_yields_no_violations(clearances in prop::collection::vec(0.0f64..50.0, 0..6)) {
        let mut panel = panel_with_studs(&[]);
        panel.ducts = clearances
            .iter()
            .enumerate()
            .map(|(i, &c)| Duct {
                duct_id: format!("D{i}"),
                position_mm: 100.0,
                diameter_mm: 100.0,
                clearance_from_stud_mm: c,
            })
            .collect();

        let mut rules = RuleTable::building_code_defaults();
        rules.mep_clearance = None;

        let result = evaluate(&panel, &rules);
        prop_assert!(result.violations.iter().all(|v| v.violation_type != ViolationType::Clearance));
        prop_assert!(result.skipped_checks.iter().any(|s| s.family == "mep_clearance"));
    }

    #[test]
    fn merge_total_is_det_plus_external_only(det_ids in arb_ids(), ext_ids in arb_ids()) {
        let det = CheckResult::new("P1", det_ids.iter().map(|id| violation(id)).collect(), vec![]);
        let ext = ExternalFindings::from_violations(ext_ids.iter().map(|id| violation(id)).collect());

        let det_set: BTreeSet<&str> = det_ids.iter().map(String::as_str).collect();
        let expected_only = ext_ids.iter().filter(|id| !det_set.contains(id.as_str())).count();

        let merged = merge(det, ext);
        prop_assert_eq!(merged.external_only.len(), expected_only);
        prop_assert_eq!(merged.total_violations as usize, det_ids.len() + expected_only);
        prop_assert_eq!(merged.needs_review, expected_only > 0);
    }

    #[test]
    fn evaluation_is_reproducible(positions in prop::collection::vec(0.0f64..10_000.0, 0..12)) {
        let panel = panel_with_studs(&positions);
        let rules = RuleTable::building_code_defaults();
        prop_assert_eq!(evaluate(&panel, &rules), evaluate(&panel, &rules));
    }
}
