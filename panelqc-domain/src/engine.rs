use crate::checks::{self, Check};
use panelqc_types::{CheckResult, PanelData, RuleTable};
use tracing::{debug, warn};

/// Runs a fixed, ordered list of checks over a panel.
pub struct RuleEngine {
    checks: Vec<Box<dyn Check>>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            checks: checks::builtin_checks(),
        }
    }

    pub fn with_checks(checks: Vec<Box<dyn Check>>) -> Self {
        Self { checks }
    }

    /// Violations are concatenated in check order, so the output is reproducible for a
    /// given panel and rule table.
    pub fn evaluate(&self, panel: &PanelData, rules: &RuleTable) -> CheckResult {
        let mut violations = Vec::new();
        let mut skipped = Vec::new();

        for check in &self.checks {
            match check.evaluate(panel, rules) {
                Ok(mut found) => {
                    debug!(
                        panel_id = %panel.panel_id,
                        family = check.family(),
                        count = found.len(),
                        "check complete"
                    );
                    violations.append(&mut found);
                }
                Err(gap) => {
                    warn!(
                        panel_id = %panel.panel_id,
                        family = gap.family(),
                        "skipping check: {gap}"
                    );
                    skipped.push(gap.to_skipped());
                }
            }
        }

        CheckResult::new(panel.panel_id.clone(), violations, skipped)
    }
}

/// Evaluate a panel with the built-in checks.
pub fn evaluate(panel: &PanelData, rules: &RuleTable) -> CheckResult {
    RuleEngine::new().evaluate(panel, rules)
}
