use panelqc_types::{BraceKind, BracingAnnotation, PanelData};

pub(crate) const FIXED_ID_SUFFIX: &str = "_FIXED";
pub(crate) const FIXED_NAME_SUFFIX: &str = " (After Remediation)";

/// Tag the panel as a remediated copy. Already-tagged panels are left alone.
pub(crate) fn tag_fixed(panel: &mut PanelData) {
    if !panel.panel_id.ends_with(FIXED_ID_SUFFIX) {
        panel.panel_id.push_str(FIXED_ID_SUFFIX);
    }
    if !panel.name.ends_with(FIXED_NAME_SUFFIX) {
        panel.name.push_str(FIXED_NAME_SUFFIX);
    }
}

/// Every window gets jack studs and a header, not only the flagged one.
pub(crate) fn support_all_windows(panel: &mut PanelData) -> usize {
    let mut changed = 0;
    for opening in panel.openings.iter_mut().filter(|o| o.is_window()) {
        if !(opening.has_jack_studs && opening.has_header) {
            changed += 1;
        }
        opening.has_jack_studs = true;
        opening.has_header = true;
    }
    changed
}

/// Spread studs evenly over `[0, width_mm]` by sequence index. The stud order is kept.
pub(crate) fn respace_studs(panel: &mut PanelData) {
    let n = panel.studs.len();
    if n < 2 {
        return;
    }

    let step = panel.width_mm / (n - 1) as f64;
    for (i, stud) in panel.studs.iter_mut().enumerate() {
        stud.position_mm = i as f64 * step;
    }
    // Pin the last stud to the edge so float error cannot drift it.
    if let Some(last) = panel.studs.last_mut() {
        last.position_mm = panel.width_mm;
    }
}

/// Diagonal braces for every corner opening or opening near either panel edge.
pub(crate) fn bracing_for(panel: &PanelData, edge_distance_mm: f64) -> Vec<BracingAnnotation> {
    panel
        .openings
        .iter()
        .filter(|o| {
            let right_gap = panel.width_mm - (o.position_mm + o.width_mm);
            o.is_corner || o.position_mm < edge_distance_mm || right_gap < edge_distance_mm
        })
        .map(|o| BracingAnnotation {
            kind: BraceKind::DiagonalBrace,
            opening_id: o.opening_id.clone(),
            position_mm: o.position_mm,
            width_mm: o.width_mm,
        })
        .collect()
}
