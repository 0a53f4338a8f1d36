use crate::parse::{FindingsLoadError, parse_findings};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use glob::glob;
use panelqc_types::ExternalFindings;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LoadedFindings {
    pub path: Utf8PathBuf,
    /// File stem, used to pair the findings with a panel of the same id (best effort).
    pub panel_id: String,
    pub findings: Result<ExternalFindings, FindingsLoadError>,
}

/// Load one findings file. Read and parse failures are captured, not returned.
pub fn load_findings(path: &Utf8Path) -> LoadedFindings {
    let panel_id = path.file_stem().unwrap_or("unknown").to_string();

    let findings = match fs::read_to_string(path) {
        Ok(s) => parse_findings(&s),
        Err(e) => Err(FindingsLoadError::Io {
            message: e.to_string(),
        }),
    };

    if let Err(e) = &findings {
        debug!(path = %path, error = %e, "findings not usable");
    }

    LoadedFindings {
        path: path.to_path_buf(),
        panel_id,
        findings,
    }
}

/// Load every `*.json` file directly under `dir`, sorted by path.
pub fn load_findings_dir(dir: &Utf8Path) -> anyhow::Result<Vec<LoadedFindings>> {
    let pattern = dir.join("*.json");
    let pattern_str = pattern.as_str();

    debug!(pattern = %pattern_str, "scanning for findings");

    let mut out = Vec::new();
    for entry in glob(pattern_str).context("glob findings/*.json")? {
        let path = entry.map_err(|e| anyhow::anyhow!("glob error: {e}"))?;
        let path = Utf8PathBuf::from_path_buf(path)
            .map_err(|p| anyhow::anyhow!("non-utf8 path: {}", p.display()))?;
        out.push(load_findings(&path));
    }

    out.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(out)
}
