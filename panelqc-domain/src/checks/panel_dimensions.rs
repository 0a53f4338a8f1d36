use super::{Check, exceeds, severity_or};
use crate::gap::ConfigGap;
use panelqc_types::{PanelData, RuleTable, Severity, Violation, ViolationType};

/// Overall panel height against the configured maximum.
pub struct PanelDimensionsCheck;

impl PanelDimensionsCheck {
    const FAMILY: &'static str = "panel_dimensions";
}

impl Check for PanelDimensionsCheck {
    fn family(&self) -> &'static str {
        Self::FAMILY
    }

    fn evaluate(&self, panel: &PanelData, rules: &RuleTable) -> Result<Vec<Violation>, ConfigGap> {
        let family = rules
            .panel_dimensions
            .as_ref()
            .ok_or(ConfigGap::MissingFamily {
                family: Self::FAMILY,
            })?;
        let rule = family.rules.first().ok_or(ConfigGap::NoRules {
            family: Self::FAMILY,
        })?;
        let max_height = family.max_height_mm.ok_or(ConfigGap::MissingThreshold {
            family: Self::FAMILY,
            key: "max_height_mm",
        })?;

        if !exceeds(panel.height_mm, max_height) {
            return Ok(Vec::new());
        }

        Ok(vec![
            Violation::new(
                "PANEL_HEIGHT",
                rule.id.clone(),
                panel.panel_id.clone(),
                ViolationType::Dimension,
                severity_or(rule.severity, Severity::Medium),
                format!(
                    "Panel height {}mm exceeds maximum {max_height}mm",
                    panel.height_mm
                ),
            )
            .with_measurement(max_height, panel.height_mm, "mm"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::fixtures::panel;
    use panelqc_types::{PanelDimensionRules, RuleEntry};

    fn rules(max_height_mm: f64) -> RuleTable {
        RuleTable {
            panel_dimensions: Some(PanelDimensionRules {
                rules: vec![RuleEntry {
                    id: "PANEL_HEIGHT_001".to_string(),
                    severity: None,
                    description: None,
                }],
                max_height_mm: Some(max_height_mm),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn tall_panel_is_flagged_medium() {
        let found = PanelDimensionsCheck.evaluate(&panel(), &rules(2400.0)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].violation_type, ViolationType::Dimension);
        assert_eq!(found[0].severity, Severity::Medium);
        assert_eq!(found[0].actual, Some(2440.0));
    }

    #[test]
    fn height_at_maximum_passes() {
        assert!(
            PanelDimensionsCheck
                .evaluate(&panel(), &rules(2440.0))
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn absent_by_default() {
        let err = PanelDimensionsCheck
            .evaluate(&panel(), &RuleTable::building_code_defaults())
            .unwrap_err();
        assert_eq!(err, ConfigGap::MissingFamily { family: "panel_dimensions" });
    }
}
