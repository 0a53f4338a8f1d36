//! Default filesystem-backed port implementations.

use crate::ports::{FindingsSource, PanelSource, RuleSource, WritePort};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::glob;
use panelqc_types::{ExternalFindings, PanelData, RuleTable, check_panel_id};
use std::collections::BTreeMap;
use tracing::debug;

/// Reads panels from one JSON file, or from every `*.json` file in a directory.
#[derive(Debug, Clone)]
pub struct FsPanelSource {
    pub path: Utf8PathBuf,
}

impl FsPanelSource {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

impl PanelSource for FsPanelSource {
    fn load_panels(&self) -> anyhow::Result<Vec<PanelData>> {
        let files = if self.path.is_dir() {
            json_files_in(&self.path)?
        } else {
            vec![self.path.clone()]
        };

        files
            .iter()
            .map(|path| {
                let s = fs::read_to_string(path).with_context(|| format!("read {}", path))?;
                serde_json::from_str::<PanelData>(&s).with_context(|| format!("parse {}", path))
            })
            .collect()
    }
}

/// Loads the rule table from JSON or TOML, chosen by file extension.
///
/// With no path configured the reference building-code thresholds are used.
#[derive(Debug, Clone, Default)]
pub struct FsRuleSource {
    pub path: Option<Utf8PathBuf>,
}

impl FsRuleSource {
    pub fn new(path: Option<Utf8PathBuf>) -> Self {
        Self { path }
    }
}

impl RuleSource for FsRuleSource {
    fn load_rules(&self) -> anyhow::Result<RuleTable> {
        let Some(path) = &self.path else {
            debug!("no rule table configured, using building code defaults");
            return Ok(RuleTable::building_code_defaults());
        };
        load_rule_table(path)
    }
}

pub fn load_rule_table(path: &Utf8Path) -> anyhow::Result<RuleTable> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path))?;
    match path.extension() {
        Some(ext) if ext.eq_ignore_ascii_case("toml") => {
            toml::from_str(&s).with_context(|| format!("parse {}", path))
        }
        _ => serde_json::from_str(&s).with_context(|| format!("parse {}", path)),
    }
}

/// Loads findings via `panelqc_findings`.
///
/// A file path applies to every panel. A directory is searched for `<panel_id>.json`.
#[derive(Debug, Clone)]
pub struct FsFindingsSource {
    pub path: Utf8PathBuf,
}

impl FsFindingsSource {
    pub fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

impl FindingsSource for FsFindingsSource {
    fn findings_for(&self, panel_id: &str) -> anyhow::Result<Option<ExternalFindings>> {
        let path = if self.path.is_dir() {
            check_panel_id(panel_id)?;
            let candidate = self.path.join(format!("{panel_id}.json"));
            if !candidate.is_file() {
                debug!(panel_id, dir = %self.path, "no findings for panel");
                return Ok(None);
            }
            candidate
        } else {
            self.path.clone()
        };

        let loaded = panelqc_findings::load_findings(&path);
        let findings = loaded
            .findings
            .with_context(|| format!("load findings from {}", loaded.path))?;
        Ok(Some(findings))
    }
}

/// No collaborator output at all.
#[derive(Debug, Clone, Default)]
pub struct NoFindings;

impl FindingsSource for NoFindings {
    fn findings_for(&self, _panel_id: &str) -> anyhow::Result<Option<ExternalFindings>> {
        Ok(None)
    }
}

/// In-memory panels for embedding and testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPanelSource {
    panels: Vec<PanelData>,
}

impl InMemoryPanelSource {
    pub fn new(panels: Vec<PanelData>) -> Self {
        Self { panels }
    }
}

impl PanelSource for InMemoryPanelSource {
    fn load_panels(&self) -> anyhow::Result<Vec<PanelData>> {
        Ok(self.panels.clone())
    }
}

/// In-memory findings keyed by panel id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFindingsSource {
    findings: BTreeMap<String, ExternalFindings>,
}

impl InMemoryFindingsSource {
    pub fn new(findings: BTreeMap<String, ExternalFindings>) -> Self {
        Self { findings }
    }
}

impl FindingsSource for InMemoryFindingsSource {
    fn findings_for(&self, panel_id: &str) -> anyhow::Result<Option<ExternalFindings>> {
        Ok(self.findings.get(panel_id).cloned())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}

fn json_files_in(dir: &Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>> {
    let pattern = dir.join("*.json");
    let mut out = Vec::new();
    for entry in glob(pattern.as_str()).context("glob panels/*.json")? {
        let path = entry.map_err(|e| anyhow::anyhow!("glob error: {e}"))?;
        let path = Utf8PathBuf::from_path_buf(path)
            .map_err(|p| anyhow::anyhow!("non-utf8 path: {}", p.display()))?;
        out.push(path);
    }
    out.sort();
    Ok(out)
}
