//! Embeddable core library for panelqc.
//!
//! Provides a clap-free, I/O-abstracted entry point suitable for linking into a reporting
//! service or other host process.
//!
//! # Port traits
//!
//! All I/O is abstracted behind port traits in [`ports`]:
//! - [`PanelSource`](ports::PanelSource) loads panel geometry
//! - [`RuleSource`](ports::RuleSource) loads the rule table
//! - [`FindingsSource`](ports::FindingsSource) loads the collaborator's findings per panel
//! - [`WritePort`](ports::WritePort) writes files and creates directories
//!
//! The [`adapters`] module provides default filesystem-backed implementations.
//!
//! # Entry points
//!
//! - [`run_check`](pipeline::run_check) evaluates one panel
//! - [`run_review`](pipeline::run_review) evaluates and merges external findings
//! - [`run_remediation`](pipeline::run_remediation) projects fixes onto a panel copy
//! - [`run_batch`](pipeline::run_batch) fans a directory of panels out over a thread pool

pub mod adapters;
pub mod pipeline;
pub mod ports;
pub mod settings;

// Re-export so embedders don't need the inner crates directly.
pub use panelqc_findings::{FindingsLoadError, LoadedFindings};
pub use panelqc_remedy::ApplyOptions;
