//! Remediation applier for panelqc.
//!
//! Responsibilities:
//! - Triage violations into fix categories.
//! - Project the fixes onto a copy of the panel.
//! - Emit bracing annotations for the rendering collaborator.
//!
//! Nothing here performs I/O, and the input panel is never modified.

mod fixes;
mod triage;

pub use triage::categorize;

use panelqc_types::{FixCategory, PanelData, Remediation, Violation};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyOptions {
    /// Also triage by keywords in the reason text when type and rule id say nothing.
    pub legacy_reason_matching: bool,

    /// Openings closer than this to either panel edge count as edge openings.
    pub edge_distance_mm: f64,

    /// Seismic zone at and above which edge and corner openings are always braced.
    pub seismic_bracing_zone: u32,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            legacy_reason_matching: false,
            edge_distance_mm: 500.0,
            seismic_bracing_zone: 3,
        }
    }
}

/// Produce a remediated copy of `panel` and the bracing it needs.
///
/// Applying the result again with the same violations yields an identical panel.
pub fn apply(panel: &PanelData, violations: &[Violation], opts: &ApplyOptions) -> Remediation {
    let mut applied: Vec<FixCategory> = Vec::new();
    for v in violations {
        match categorize(v, opts.legacy_reason_matching) {
            Some(category) if !applied.contains(&category) => applied.push(category),
            Some(_) => {}
            None => debug!(
                violation_id = %v.violation_id,
                violation_type = %v.violation_type,
                "no automatic fix"
            ),
        }
    }

    let mut fixed = panel.clone();
    fixes::tag_fixed(&mut fixed);

    if applied.contains(&FixCategory::WindowSupport) {
        let changed = fixes::support_all_windows(&mut fixed);
        info!(panel_id = %fixed.panel_id, changed, "added jack studs and headers to windows");
    }

    if applied.contains(&FixCategory::StudSpacing) {
        fixes::respace_studs(&mut fixed);
        info!(
            panel_id = %fixed.panel_id,
            count = fixed.studs.len(),
            "respaced studs evenly"
        );
    }

    let flagged = applied.contains(&FixCategory::Bracing);
    let high_seismic = fixed.seismic_zone >= opts.seismic_bracing_zone;
    let bracing = if flagged || high_seismic {
        fixes::bracing_for(&fixed, opts.edge_distance_mm)
    } else {
        Vec::new()
    };
    if !bracing.is_empty() {
        if !flagged {
            applied.push(FixCategory::Bracing);
        }
        info!(
            panel_id = %fixed.panel_id,
            count = bracing.len(),
            seismic_zone = fixed.seismic_zone,
            "annotated bracing"
        );
    }

    Remediation {
        panel: fixed,
        bracing,
        applied,
    }
}
