use crate::gap::ConfigGap;
use panelqc_types::{PanelData, RuleTable, Severity, Violation};

mod duct_clearance;
mod opening_support;
mod panel_dimensions;
mod stud_spacing;

pub use duct_clearance::DuctClearanceCheck;
pub use opening_support::OpeningSupportCheck;
pub use panel_dimensions::PanelDimensionsCheck;
pub use stud_spacing::StudSpacingCheck;

/// Absorbs binary representation error when comparing millimetre measurements, so that a
/// value sitting exactly on a threshold is never reported.
pub(crate) const MEASUREMENT_EPSILON_MM: f64 = 1e-9;

/// One rule family.
///
/// Implementations must be pure: the same panel and rule table always yield the same
/// violations in the same order.
pub trait Check: Send + Sync {
    /// Rule table key this check reads, e.g. `stud_spacing`.
    fn family(&self) -> &'static str;

    fn evaluate(&self, panel: &PanelData, rules: &RuleTable) -> Result<Vec<Violation>, ConfigGap>;
}

/// Built-in checks in evaluation order.
pub fn builtin_checks() -> Vec<Box<dyn Check>> {
    vec![
        Box::new(StudSpacingCheck),
        Box::new(OpeningSupportCheck),
        Box::new(DuctClearanceCheck),
        Box::new(PanelDimensionsCheck),
    ]
}

/// `a` is greater than `b` by more than measurement noise.
pub(crate) fn exceeds(a: f64, b: f64) -> bool {
    a - b > MEASUREMENT_EPSILON_MM
}

pub(crate) fn severity_or(configured: Option<Severity>, fallback: Severity) -> Severity {
    configured.unwrap_or(fallback)
}
