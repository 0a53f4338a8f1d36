//! Clap-free settings for the check, review and fix pipelines.

use camino::Utf8PathBuf;
use panelqc_remedy::ApplyOptions;

/// What a pipeline run produces beyond the deterministic check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Rule engine only.
    #[default]
    Check,
    /// Rule engine merged with external findings.
    Review,
    /// Review, then remediation of every merged violation.
    Fix,
}

#[derive(Debug, Clone)]
pub struct RunSettings {
    pub out_dir: Utf8PathBuf,
    pub mode: RunMode,

    /// Skip writing artifacts; results are still returned.
    pub dry_run: bool,

    // Remediation
    pub apply: ApplyOptions,

    // Batch
    pub concurrency: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            out_dir: Utf8PathBuf::from("artifacts/panelqc"),
            mode: RunMode::default(),
            dry_run: false,
            apply: ApplyOptions::default(),
            concurrency: default_concurrency(),
        }
    }
}

pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
