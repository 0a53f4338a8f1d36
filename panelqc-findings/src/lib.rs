//! Findings ingestion.
//!
//! The analysis collaborator hands back violations as JSON, sometimes wrapped in prose or a
//! fenced code block. Loading is tolerant: extra fields are ignored, missing optional fields
//! fall back to defaults, and a bare array of violations is accepted in place of the
//! envelope.

mod load;
mod parse;

pub use load::{LoadedFindings, load_findings, load_findings_dir};
pub use parse::{FindingsLoadError, parse_findings};
