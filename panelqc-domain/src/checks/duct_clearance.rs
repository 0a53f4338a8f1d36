use super::{Check, exceeds, severity_or};
use crate::gap::ConfigGap;
use panelqc_types::{PanelData, RuleTable, Severity, Violation, ViolationType};

/// Minimum clearance between a duct and its nearest stud.
///
/// The clearance is read from `Duct::clearance_from_stud_mm` as supplied by the parser. It is
/// never re-derived from duct or stud geometry.
pub struct DuctClearanceCheck;

impl DuctClearanceCheck {
    const FAMILY: &'static str = "mep_clearance";
}

impl Check for DuctClearanceCheck {
    fn family(&self) -> &'static str {
        Self::FAMILY
    }

    fn evaluate(&self, panel: &PanelData, rules: &RuleTable) -> Result<Vec<Violation>, ConfigGap> {
        let family = rules
            .mep_clearance
            .as_ref()
            .ok_or(ConfigGap::MissingFamily {
                family: Self::FAMILY,
            })?;
        let rule = family.rules.first().ok_or(ConfigGap::NoRules {
            family: Self::FAMILY,
        })?;
        let minimum = family.duct_to_stud_mm.ok_or(ConfigGap::MissingThreshold {
            family: Self::FAMILY,
            key: "duct_to_stud_mm",
        })?;
        let severity = severity_or(rule.severity, Severity::High);

        let out = panel
            .ducts
            .iter()
            .filter(|d| exceeds(minimum, d.clearance_from_stud_mm))
            .map(|d| {
                Violation::new(
                    format!("DUCT_{}", d.duct_id),
                    rule.id.clone(),
                    d.duct_id.clone(),
                    ViolationType::Clearance,
                    severity,
                    format!(
                        "Duct {} clearance {:.1}mm is below the {minimum}mm minimum",
                        d.duct_id, d.clearance_from_stud_mm
                    ),
                )
                .with_measurement(minimum, d.clearance_from_stud_mm, "mm")
            })
            .collect();

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::fixtures::{duct, panel};
    use panelqc_types::{MepClearanceRules, RuleEntry};

    fn rules(minimum: Option<f64>) -> RuleTable {
        RuleTable {
            mep_clearance: Some(MepClearanceRules {
                rules: vec![RuleEntry::new("MEP_CLEARANCE_001", Severity::High)],
                duct_to_stud_mm: minimum,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn close_duct_reports_measurement() {
        let mut p = panel();
        p.ducts = vec![duct("D1", 15.0), duct("D2", 25.4), duct("D3", 40.0)];

        let found = DuctClearanceCheck.evaluate(&p, &rules(Some(25.4))).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].violation_id, "DUCT_D1");
        assert_eq!(found[0].element, "D1");
        assert_eq!(found[0].expected, Some(25.4));
        assert_eq!(found[0].actual, Some(15.0));
    }

    #[test]
    fn missing_minimum_is_a_gap() {
        let err = DuctClearanceCheck
            .evaluate(&panel(), &rules(None))
            .unwrap_err();
        assert!(matches!(err, ConfigGap::MissingThreshold { key: "duct_to_stud_mm", .. }));
    }
}
