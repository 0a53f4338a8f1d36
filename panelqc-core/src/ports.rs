//! Port traits abstracting all I/O away from the pipeline.

use camino::Utf8Path;
use panelqc_types::{ExternalFindings, PanelData, RuleTable};

/// Source of panel geometry produced by the parsing collaborator.
pub trait PanelSource {
    fn load_panels(&self) -> anyhow::Result<Vec<PanelData>>;
}

/// Source of the rule table.
pub trait RuleSource {
    fn load_rules(&self) -> anyhow::Result<RuleTable>;
}

/// Source of the analysis collaborator's findings, looked up per panel.
pub trait FindingsSource {
    /// `Ok(None)` means the collaborator produced nothing for this panel.
    fn findings_for(&self, panel_id: &str) -> anyhow::Result<Option<ExternalFindings>>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
