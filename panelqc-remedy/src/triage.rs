//! Map a violation to the fix category it calls for.

use panelqc_types::{FixCategory, Violation, ViolationType};

/// Decide which fix, if any, a violation triggers.
///
/// A recognized violation type is authoritative, including the types that have no
/// automatic fix. Records with an unknown or free-form type fall back to the rule id
/// family. Reason-text keywords are only consulted when `legacy_reason_matching` is set.
pub fn categorize(violation: &Violation, legacy_reason_matching: bool) -> Option<FixCategory> {
    match &violation.violation_type {
        ViolationType::Support => Some(FixCategory::WindowSupport),
        ViolationType::Spacing => Some(FixCategory::StudSpacing),
        ViolationType::Bracing | ViolationType::Seismic => Some(FixCategory::Bracing),
        ViolationType::Clearance | ViolationType::Dimension => None,
        ViolationType::Unknown | ViolationType::Other(_) => from_rule_id(&violation.rule_id)
            .or_else(|| {
                legacy_reason_matching
                    .then(|| from_reason(&violation.reason))
                    .flatten()
            }),
    }
}

fn from_rule_id(rule_id: &str) -> Option<FixCategory> {
    let id = rule_id.to_ascii_uppercase();
    if id.starts_with("WINDOW_SUPPORT") || id.starts_with("OPENING_SUPPORT") {
        Some(FixCategory::WindowSupport)
    } else if id.starts_with("STUD_SPACING") {
        Some(FixCategory::StudSpacing)
    } else if id.starts_with("BRACING") || id.starts_with("SEISMIC") {
        Some(FixCategory::Bracing)
    } else {
        None
    }
}

fn from_reason(reason: &str) -> Option<FixCategory> {
    let reason = reason.to_lowercase();
    if reason.contains("jack stud") || reason.contains("header") {
        Some(FixCategory::WindowSupport)
    } else if reason.contains("spacing") {
        Some(FixCategory::StudSpacing)
    } else if reason.contains("bracing") || reason.contains("seismic") {
        Some(FixCategory::Bracing)
    } else {
        None
    }
}
