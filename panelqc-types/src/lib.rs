//! Shared DTOs (schemas-as-code) for the panelqc workspace.
//!
//! # Design constraints
//! - These types cross crate and process boundaries as JSON.
//! - Inputs from collaborators are read tolerantly: unknown fields are ignored and
//!   missing optional fields fall back to documented defaults.
//! - Prefer adding optional fields over changing semantics.

pub mod artifact;
pub mod panel;
pub mod remediation;
pub mod result;
pub mod rules;
pub mod violation;

pub use artifact::{Artifact, RunInfo, ToolInfo};
pub use panel::{Duct, Opening, OpeningType, PanelData, PanelError, Stud, check_panel_id};
pub use remediation::{BraceKind, BracingAnnotation, FixCategory, Remediation};
pub use result::{
    CheckResult, ExternalFindings, FinalStatus, MergedResult, SkippedCheck, ViolationCounts,
};
pub use rules::{
    MepClearanceRules, OpeningRuleEntry, OpeningRules, PanelDimensionRules, RuleEntry, RuleTable,
    StudSpacingRules,
};
pub use violation::{RemediationPlan, Severity, Violation, ViolationType};

/// Schema identifiers.
pub mod schema {
    pub const PANELQC_CHECK_V1: &str = "panelqc.check.v1";
    pub const PANELQC_REVIEW_V1: &str = "panelqc.review.v1";
    pub const PANELQC_REMEDIATION_V1: &str = "panelqc.remediation.v1";
}
