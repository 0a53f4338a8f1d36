//! Domain logic: evaluate a panel against a rule table and reconcile the result with
//! externally supplied violations.
//!
//! Everything here is a pure function of its inputs. This crate owns *what* is wrong with a
//! panel. It does not own *how* a panel is fixed; that's the `panelqc-remedy` crate.

mod checks;
mod engine;
mod gap;
mod merger;

pub use checks::{
    Check, DuctClearanceCheck, OpeningSupportCheck, PanelDimensionsCheck, StudSpacingCheck,
    builtin_checks,
};
pub use engine::{RuleEngine, evaluate};
pub use gap::ConfigGap;
pub use merger::{DEFAULT_MERGE_SUMMARY, merge};
