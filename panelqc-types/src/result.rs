use crate::violation::Violation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A rule family the engine could not evaluate because the rule table lacked something.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedCheck {
    pub family: String,
    pub reason: String,
}

/// Outcome of evaluating one panel against a rule table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub panel_id: String,

    #[serde(default)]
    pub violations: Vec<Violation>,

    /// True iff `violations` is empty.
    pub pass_fail: bool,

    #[serde(default)]
    pub summary: String,

    /// Families skipped because of gaps in the rule table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_checks: Vec<SkippedCheck>,
}

impl CheckResult {
    pub fn new(
        panel_id: impl Into<String>,
        violations: Vec<Violation>,
        skipped_checks: Vec<SkippedCheck>,
    ) -> Self {
        let pass_fail = violations.is_empty();
        let summary = if pass_fail {
            "PASS".to_string()
        } else {
            format!("FAIL - {} violations", violations.len())
        };
        Self {
            panel_id: panel_id.into(),
            violations,
            pass_fail,
            summary,
            skipped_checks,
        }
    }

    pub fn counts(&self) -> ViolationCounts {
        ViolationCounts::from_violations(&self.violations)
    }
}

/// Violation list produced by the analysis collaborator, plus its verdict flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalFindings {
    /// Read from exactly one of `additional_violations`, `violations` or `all_violations`.
    /// An envelope carrying more than one of them is rejected as a duplicate field.
    #[serde(
        default,
        rename = "additional_violations",
        alias = "violations",
        alias = "all_violations"
    )]
    pub violations: Vec<Violation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub design_concerns: Vec<String>,

    /// Set when the collaborator asks for an engineer regardless of its violation list.
    #[serde(default, alias = "needs_review")]
    pub needs_engineer_review: bool,

    #[serde(
        default,
        alias = "analysis_summary",
        skip_serializing_if = "Option::is_none"
    )]
    pub summary: Option<String>,
}

impl ExternalFindings {
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            violations,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalStatus {
    Pass,
    Fail,
    NeedsReview,
}

impl FinalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FinalStatus::Pass => "pass",
            FinalStatus::Fail => "fail",
            FinalStatus::NeedsReview => "needs_review",
        }
    }
}

/// Deterministic result reconciled with the collaborator's findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedResult {
    pub panel_id: String,
    pub deterministic_result: CheckResult,
    pub external_result: ExternalFindings,

    /// External violations whose id is not already in the deterministic result.
    #[serde(default)]
    pub external_only: Vec<Violation>,

    pub total_violations: u64,
    pub needs_review: bool,
    pub final_status: FinalStatus,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub design_concerns: Vec<String>,

    #[serde(default)]
    pub summary: String,
}

impl MergedResult {
    /// Every distinct violation in the merge: deterministic first, then external-only.
    pub fn all_violations(&self) -> impl Iterator<Item = &Violation> {
        self.deterministic_result
            .violations
            .iter()
            .chain(self.external_only.iter())
    }

    pub fn counts(&self) -> ViolationCounts {
        ViolationCounts::from_violations(self.all_violations())
    }
}

/// Violation tallies keyed by severity and by type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationCounts {
    pub total: u64,

    #[serde(default)]
    pub by_severity: BTreeMap<String, u64>,

    #[serde(default)]
    pub by_type: BTreeMap<String, u64>,
}

impl ViolationCounts {
    pub fn from_violations<'a>(violations: impl IntoIterator<Item = &'a Violation>) -> Self {
        let mut counts = Self::default();
        for v in violations {
            counts.total += 1;
            *counts
                .by_severity
                .entry(v.severity.as_str().to_string())
                .or_insert(0) += 1;
            *counts
                .by_type
                .entry(v.violation_type.as_str().to_string())
                .or_insert(0) += 1;
        }
        counts
    }
}
