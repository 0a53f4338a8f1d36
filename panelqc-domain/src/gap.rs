use panelqc_types::SkippedCheck;
use thiserror::Error;

/// A rule table gap that prevents one check family from running.
///
/// Gaps are not failures: the engine logs them, records them on the result and carries on
/// with the remaining families.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigGap {
    #[error("rule family `{family}` is not configured")]
    MissingFamily { family: &'static str },

    #[error("rule family `{family}` has no rule entries")]
    NoRules { family: &'static str },

    #[error("rule family `{family}` is missing threshold `{key}`")]
    MissingThreshold {
        family: &'static str,
        key: &'static str,
    },
}

impl ConfigGap {
    pub fn family(&self) -> &'static str {
        match self {
            ConfigGap::MissingFamily { family }
            | ConfigGap::NoRules { family }
            | ConfigGap::MissingThreshold { family, .. } => family,
        }
    }

    pub fn to_skipped(&self) -> SkippedCheck {
        SkippedCheck {
            family: self.family().to_string(),
            reason: self.to_string(),
        }
    }
}
