//! Rule table: per-family building-code thresholds.
//!
//! Every family and every threshold is optional. A check whose family or thresholds are
//! absent is skipped rather than failing the run.

use crate::violation::Severity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stud_spacing: Option<StudSpacingRules>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openings: Option<OpeningRules>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mep_clearance: Option<MepClearanceRules>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panel_dimensions: Option<PanelDimensionRules>,
}

/// Identity and severity of one rule inside a family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RuleEntry {
    pub fn new(id: &str, severity: Severity) -> Self {
        Self {
            id: id.to_string(),
            severity: Some(severity),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudSpacingRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_spacing_mm: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerance_mm: Option<f64>,

    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningRuleEntry {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    /// Windows narrower than this must carry jack studs and a header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_threshold_mm: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpeningRules {
    #[serde(default)]
    pub rules: Vec<OpeningRuleEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MepClearanceRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duct_to_stud_mm: Option<f64>,

    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PanelDimensionRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height_mm: Option<f64>,

    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

impl RuleTable {
    /// Reference thresholds: 16" on-centre studs, 1/4" tolerance, 1" duct clearance.
    pub fn building_code_defaults() -> Self {
        Self {
            stud_spacing: Some(StudSpacingRules {
                rules: vec![RuleEntry::new("STUD_SPACING_001", Severity::High)],
                standard_spacing_mm: Some(406.4),
                tolerance_mm: Some(6.35),
            }),
            openings: Some(OpeningRules {
                rules: vec![OpeningRuleEntry {
                    id: "WINDOW_SUPPORT_001".to_string(),
                    severity: Some(Severity::Critical),
                    width_threshold_mm: Some(900.0),
                    description: None,
                }],
            }),
            mep_clearance: Some(MepClearanceRules {
                rules: vec![RuleEntry::new("MEP_CLEARANCE_001", Severity::High)],
                duct_to_stud_mm: Some(25.4),
            }),
            panel_dimensions: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_yields_empty_table() {
        let table: RuleTable = serde_json::from_str("{}").expect("parse");
        assert_eq!(table, RuleTable::default());
    }

    #[test]
    fn family_without_thresholds_parses() {
        let table: RuleTable =
            serde_json::from_str(r#"{"stud_spacing": {"rules": [{"id": "S1"}]}}"#).expect("parse");
        let spacing = table.stud_spacing.expect("family present");
        assert_eq!(spacing.rules[0].id, "S1");
        assert!(spacing.rules[0].severity.is_none());
        assert!(spacing.standard_spacing_mm.is_none());
    }
}
