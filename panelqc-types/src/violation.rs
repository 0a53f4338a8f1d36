use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Placeholder id for external records that arrive without one.
pub const UNKNOWN_ID: &str = "UNKNOWN";
/// Placeholder reason for external records that arrive without one.
pub const UNKNOWN_REASON: &str = "Unknown";
/// Placeholder rule id for external records that arrive without one.
pub const UNKNOWN_RULE: &str = "unknown";

/// Violation severity.
///
/// Deserialization is tolerant: matching is case-insensitive, `moderate` maps to
/// `medium`, and anything unrecognized becomes `unknown`. A missing field defaults to
/// `medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Unknown,
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "minor" => Severity::Low,
            "medium" | "moderate" => Severity::Medium,
            "high" | "major" => Severity::High,
            "critical" => Severity::Critical,
            _ => Severity::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Unknown => "unknown",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Severity::parse).unwrap_or_default())
    }
}

/// Category of a violation, decided once when the violation is emitted.
///
/// Remediation dispatches on this tag instead of on reason text. Labels outside the known
/// set are preserved verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ViolationType {
    Spacing,
    Support,
    Clearance,
    Bracing,
    Seismic,
    Dimension,
    #[default]
    Unknown,
    Other(String),
}

impl ViolationType {
    pub fn from_label(label: &str) -> Self {
        let normalized = label.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "spacing" | "stud_spacing" | "stud_spacing_violation" => ViolationType::Spacing,
            "support" | "window_support" | "missing_jack_studs" | "missing_header" => {
                ViolationType::Support
            }
            "clearance" | "duct_clearance" | "duct_clash" | "mep_clearance" => {
                ViolationType::Clearance
            }
            "bracing" => ViolationType::Bracing,
            "seismic" => ViolationType::Seismic,
            "dimension" | "dimension_violation" => ViolationType::Dimension,
            "" | "unknown" => ViolationType::Unknown,
            _ => ViolationType::Other(label.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ViolationType::Spacing => "spacing",
            ViolationType::Support => "support",
            ViolationType::Clearance => "clearance",
            ViolationType::Bracing => "bracing",
            ViolationType::Seismic => "seismic",
            ViolationType::Dimension => "dimension",
            ViolationType::Unknown => "unknown",
            ViolationType::Other(label) => label,
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ViolationType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ViolationType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(ViolationType::from_label)
            .unwrap_or_default())
    }
}

/// Recommended corrective actions attached to a violation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemediationPlan {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_effort: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials_needed: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools_required: Vec<String>,

    #[serde(default)]
    pub requires_engineer_approval: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_impact: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_notes: Option<String>,
}

/// A single non-compliance, from the rule engine or from the analysis collaborator.
///
/// External records may be partial; see the field defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    #[serde(default = "unknown_id", deserialize_with = "id_or_unknown")]
    pub violation_id: String,

    #[serde(default = "unknown_rule", deserialize_with = "rule_or_unknown")]
    pub rule_id: String,

    /// Id (or pair of ids) of the offending stud, opening or duct.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub element: String,

    #[serde(default, alias = "type")]
    pub violation_type: ViolationType,

    #[serde(default)]
    pub severity: Severity,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    #[serde(
        default = "unknown_reason",
        alias = "description",
        deserialize_with = "reason_or_unknown"
    )]
    pub reason: String,

    #[serde(default)]
    pub passed: bool,

    /// Free-text fix suggestion, when the producer gave one instead of a full plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<RemediationPlan>,
}

impl Violation {
    pub fn new(
        violation_id: impl Into<String>,
        rule_id: impl Into<String>,
        element: impl Into<String>,
        violation_type: ViolationType,
        severity: Severity,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            violation_id: violation_id.into(),
            rule_id: rule_id.into(),
            element: element.into(),
            violation_type,
            severity,
            expected: None,
            actual: None,
            unit: None,
            reason: reason.into(),
            passed: false,
            recommendation: None,
            remediation: None,
        }
    }

    pub fn with_measurement(mut self, expected: f64, actual: f64, unit: &str) -> Self {
        self.expected = Some(expected);
        self.actual = Some(actual);
        self.unit = Some(unit.to_string());
        self
    }

    pub fn with_remediation(mut self, plan: RemediationPlan) -> Self {
        self.remediation = Some(plan);
        self
    }
}

fn unknown_id() -> String {
    UNKNOWN_ID.to_string()
}

fn unknown_rule() -> String {
    UNKNOWN_RULE.to_string()
}

fn unknown_reason() -> String {
    UNKNOWN_REASON.to_string()
}

fn non_blank_or<'de, D: Deserializer<'de>>(
    deserializer: D,
    fallback: &str,
) -> Result<String, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string()))
}

fn id_or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    non_blank_or(deserializer, UNKNOWN_ID)
}

fn rule_or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    non_blank_or(deserializer, UNKNOWN_RULE)
}

fn reason_or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    non_blank_or(deserializer, UNKNOWN_REASON)
}

fn string_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_parse_is_case_insensitive() {
        assert_eq!(Severity::parse("High"), Severity::High);
        assert_eq!(Severity::parse(" CRITICAL "), Severity::Critical);
        assert_eq!(Severity::parse("Moderate"), Severity::Medium);
        assert_eq!(Severity::parse("catastrophic"), Severity::Unknown);
    }

    #[test]
    fn severity_orders_by_weight() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Low > Severity::Unknown);
    }

    #[test]
    fn violation_type_keeps_unrecognized_labels() {
        let t = ViolationType::from_label("Corner Stress");
        assert_eq!(t, ViolationType::Other("Corner Stress".to_string()));
        assert_eq!(t.as_str(), "Corner Stress");
        assert_eq!(ViolationType::from_label("duct-clash"), ViolationType::Clearance);
        assert_eq!(ViolationType::from_label(""), ViolationType::Unknown);
    }
}
