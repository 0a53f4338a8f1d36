use super::{Check, exceeds, severity_or};
use crate::gap::ConfigGap;
use panelqc_types::{PanelData, RuleTable, Severity, Stud, Violation, ViolationType};

pub struct StudSpacingCheck;

impl StudSpacingCheck {
    const FAMILY: &'static str = "stud_spacing";
}

impl Check for StudSpacingCheck {
    fn family(&self) -> &'static str {
        Self::FAMILY
    }

    fn evaluate(&self, panel: &PanelData, rules: &RuleTable) -> Result<Vec<Violation>, ConfigGap> {
        let family = rules
            .stud_spacing
            .as_ref()
            .ok_or(ConfigGap::MissingFamily {
                family: Self::FAMILY,
            })?;
        let rule = family.rules.first().ok_or(ConfigGap::NoRules {
            family: Self::FAMILY,
        })?;
        let standard = family
            .standard_spacing_mm
            .ok_or(ConfigGap::MissingThreshold {
                family: Self::FAMILY,
                key: "standard_spacing_mm",
            })?;
        let tolerance = family.tolerance_mm.ok_or(ConfigGap::MissingThreshold {
            family: Self::FAMILY,
            key: "tolerance_mm",
        })?;
        let severity = severity_or(rule.severity, Severity::High);

        let mut studs: Vec<&Stud> = panel.studs.iter().collect();
        studs.sort_by(|a, b| a.position_mm.total_cmp(&b.position_mm));

        let mut out = Vec::new();
        for (i, pair) in studs.windows(2).enumerate() {
            let (current, next) = (pair[0], pair[1]);
            let actual = next.position_mm - current.position_mm;
            if !exceeds((actual - standard).abs(), tolerance) {
                continue;
            }

            out.push(
                Violation::new(
                    format!("STUD_{}_{}", i, i + 1),
                    rule.id.clone(),
                    format!("Studs {} to {}", current.stud_id, next.stud_id),
                    ViolationType::Spacing,
                    severity,
                    format!(
                        "Spacing {actual:.1}mm exceeds tolerance of ±{tolerance}mm (expected {standard}mm)"
                    ),
                )
                .with_measurement(standard, actual, "mm"),
            );
        }

        Ok(out)
    }
}
