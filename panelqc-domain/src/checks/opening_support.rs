use super::{Check, exceeds, severity_or};
use crate::gap::ConfigGap;
use panelqc_types::{PanelData, RuleTable, Severity, Violation, ViolationType};

/// Narrow windows must carry both jack studs and a header.
pub struct OpeningSupportCheck;

impl OpeningSupportCheck {
    const FAMILY: &'static str = "openings";
}

impl Check for OpeningSupportCheck {
    fn family(&self) -> &'static str {
        Self::FAMILY
    }

    fn evaluate(&self, panel: &PanelData, rules: &RuleTable) -> Result<Vec<Violation>, ConfigGap> {
        let family = rules.openings.as_ref().ok_or(ConfigGap::MissingFamily {
            family: Self::FAMILY,
        })?;
        let rule = family.rules.first().ok_or(ConfigGap::NoRules {
            family: Self::FAMILY,
        })?;
        let threshold = rule
            .width_threshold_mm
            .ok_or(ConfigGap::MissingThreshold {
                family: Self::FAMILY,
                key: "width_threshold_mm",
            })?;
        let severity = severity_or(rule.severity, Severity::Critical);

        let out = panel
            .windows()
            .filter(|w| exceeds(threshold, w.width_mm))
            .filter(|w| !(w.has_jack_studs && w.has_header))
            .map(|w| {
                Violation::new(
                    format!("WINDOW_{}", w.opening_id),
                    rule.id.clone(),
                    w.opening_id.clone(),
                    ViolationType::Support,
                    severity,
                    format!(
                        "Window {} ({}mm) is narrower than {threshold}mm and is missing jack studs or header",
                        w.opening_id, w.width_mm
                    ),
                )
                .with_measurement(1.0, 0.0, "boolean")
            })
            .collect();

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::fixtures::{panel, window};
    use panelqc_types::{Opening, OpeningRuleEntry, OpeningRules, OpeningType};

    fn rules(threshold: f64) -> RuleTable {
        RuleTable {
            openings: Some(OpeningRules {
                rules: vec![OpeningRuleEntry {
                    id: "WINDOW_SUPPORT_001".to_string(),
                    severity: None,
                    width_threshold_mm: Some(threshold),
                    description: None,
                }],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn one_violation_even_when_both_supports_are_missing() {
        let mut p = panel();
        p.openings = vec![window("W1", 700.0, false, false)];

        let found = OpeningSupportCheck.evaluate(&p, &rules(900.0)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].violation_id, "WINDOW_W1");
        assert_eq!(found[0].severity, Severity::Critical);
        assert!(found[0].reason.contains("missing jack studs or header"));
    }

    #[test]
    fn wide_windows_and_doors_are_exempt() {
        let mut p = panel();
        p.openings = vec![
            window("W1", 900.0, false, false),
            window("W2", 1200.0, false, true),
            Opening {
                opening_type: OpeningType::Door,
                ..window("D1", 600.0, false, false)
            },
        ];

        assert!(OpeningSupportCheck.evaluate(&p, &rules(900.0)).unwrap().is_empty());
    }

    #[test]
    fn supported_narrow_window_passes() {
        let mut p = panel();
        p.openings = vec![window("W1", 600.0, true, true)];
        assert!(OpeningSupportCheck.evaluate(&p, &rules(900.0)).unwrap().is_empty());
    }

    #[test]
    fn missing_threshold_is_a_gap() {
        let mut table = rules(900.0);
        table.openings.as_mut().unwrap().rules[0].width_threshold_mm = None;
        assert_eq!(
            OpeningSupportCheck.evaluate(&panel(), &table).unwrap_err().family(),
            "openings"
        );
    }
}
