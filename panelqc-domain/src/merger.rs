use panelqc_types::{CheckResult, ExternalFindings, FinalStatus, MergedResult, Violation};
use std::collections::BTreeSet;
use tracing::debug;

/// Summary used when the collaborator did not supply one.
pub const DEFAULT_MERGE_SUMMARY: &str = "Analysis complete";

/// Reconcile deterministic violations with the collaborator's findings.
///
/// External violations whose id already appears in the deterministic result are dropped as
/// duplicates. Nothing is re-ordered or re-graded.
pub fn merge(deterministic: CheckResult, external: ExternalFindings) -> MergedResult {
    let known: BTreeSet<&str> = deterministic
        .violations
        .iter()
        .map(|v| v.violation_id.as_str())
        .collect();

    let external_only: Vec<Violation> = external
        .violations
        .iter()
        .filter(|v| !known.contains(v.violation_id.as_str()))
        .cloned()
        .collect();

    let total_violations = (deterministic.violations.len() + external_only.len()) as u64;
    let needs_review = !external_only.is_empty() || external.needs_engineer_review;
    let final_status = if needs_review {
        FinalStatus::NeedsReview
    } else if total_violations > 0 {
        FinalStatus::Fail
    } else {
        FinalStatus::Pass
    };

    debug!(
        panel_id = %deterministic.panel_id,
        duplicates = external.violations.len() - external_only.len(),
        external_only = external_only.len(),
        status = final_status.as_str(),
        "merged findings"
    );

    MergedResult {
        panel_id: deterministic.panel_id.clone(),
        design_concerns: external.design_concerns.clone(),
        summary: external
            .summary
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MERGE_SUMMARY.to_string()),
        deterministic_result: deterministic,
        external_result: external,
        external_only,
        total_violations,
        needs_review,
        final_status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use panelqc_types::{Severity, ViolationType};

    fn v(id: &str) -> Violation {
        Violation::new(id, "R", "E", ViolationType::Spacing, Severity::High, "r")
    }

    #[test]
    fn clean_inputs_pass() {
        let merged = merge(CheckResult::new("P1", vec![], vec![]), ExternalFindings::default());
        assert_eq!(merged.final_status, FinalStatus::Pass);
        assert_eq!(merged.total_violations, 0);
        assert_eq!(merged.summary, DEFAULT_MERGE_SUMMARY);
    }

    #[test]
    fn fully_duplicated_external_list_fails_without_review() {
        let det = CheckResult::new("P1", vec![v("A")], vec![]);
        let merged = merge(det, ExternalFindings::from_violations(vec![v("A")]));
        assert_eq!(merged.final_status, FinalStatus::Fail);
        assert!(!merged.needs_review);
        assert!(merged.external_only.is_empty());
    }

    #[test]
    fn explicit_review_flag_wins_over_pass() {
        let external = ExternalFindings {
            needs_engineer_review: true,
            summary: Some("corner load path unclear".into()),
            ..Default::default()
        };
        let merged = merge(CheckResult::new("P1", vec![], vec![]), external);
        assert_eq!(merged.final_status, FinalStatus::NeedsReview);
        assert_eq!(merged.summary, "corner load path unclear");
    }
}
