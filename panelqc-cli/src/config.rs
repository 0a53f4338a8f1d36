//! Configuration file loading for panelqc.
//!
//! Discovers and loads `panelqc.toml` from the project root.
//! Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use panelqc_remedy::ApplyOptions;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "panelqc.toml";

/// Top-level configuration from panelqc.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PanelqcConfig {
    /// Rule table location.
    pub rules: RulesConfig,

    /// Remediation behaviour.
    pub remediation: ApplyOptions,

    /// Batch fan-out.
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// JSON or TOML rule table, relative to the project root. Built-in thresholds when unset.
    pub path: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads for `batch`. Defaults to the available parallelism.
    pub concurrency: Option<usize>,
}

/// Discover the panelqc.toml config file in `root`.
pub fn discover_config(root: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = root.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

pub fn load_config(path: &Utf8Path) -> anyhow::Result<PanelqcConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

pub fn parse_config(contents: &str) -> anyhow::Result<PanelqcConfig> {
    let config: PanelqcConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load config from `root`, or return the default if there is none.
pub fn load_or_default(root: &Utf8Path) -> anyhow::Result<PanelqcConfig> {
    match discover_config(root) {
        Some(path) => load_config(&path),
        None => Ok(PanelqcConfig::default()),
    }
}

/// Command-line values that can override the config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub rules: Option<Utf8PathBuf>,
    pub legacy_reason_matching: bool,
    pub edge_distance_mm: Option<f64>,
    pub seismic_bracing_zone: Option<u32>,
    pub concurrency: Option<usize>,
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone)]
pub struct MergedConfig {
    pub rules_path: Option<Utf8PathBuf>,
    pub apply: ApplyOptions,
    pub concurrency: Option<usize>,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: PanelqcConfig,
}

impl ConfigMerger {
    pub fn new(config: PanelqcConfig) -> Self {
        Self { config }
    }

    /// CLI values win. A relative rules path from the config file is resolved against `root`.
    pub fn merge(self, root: &Utf8Path, cli: &CliOverrides) -> MergedConfig {
        let rules_path = cli.rules.clone().or_else(|| {
            self.config.rules.path.map(|p| {
                if p.is_absolute() {
                    p
                } else {
                    root.join(p)
                }
            })
        });

        let file = self.config.remediation;
        let apply = ApplyOptions {
            // CLI flag overrides config when set to true
            legacy_reason_matching: cli.legacy_reason_matching || file.legacy_reason_matching,
            edge_distance_mm: cli.edge_distance_mm.unwrap_or(file.edge_distance_mm),
            seismic_bracing_zone: cli.seismic_bracing_zone.unwrap_or(file.seismic_bracing_zone),
        };

        MergedConfig {
            rules_path,
            apply,
            concurrency: cli.concurrency.or(self.config.batch.concurrency),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let contents = r#"
[rules]
path = "codes/building_codes.json"

[remediation]
legacy_reason_matching = true
edge_distance_mm = 450.0
seismic_bracing_zone = 4

[batch]
concurrency = 8
"#;

        let config = parse_config(contents).unwrap();
        assert_eq!(
            config.rules.path.as_deref(),
            Some(Utf8Path::new("codes/building_codes.json"))
        );
        assert!(config.remediation.legacy_reason_matching);
        assert_eq!(config.remediation.edge_distance_mm, 450.0);
        assert_eq!(config.remediation.seismic_bracing_zone, 4);
        assert_eq!(config.batch.concurrency, Some(8));
    }

    #[test]
    fn test_partial_remediation_keeps_defaults() {
        let config = parse_config("[remediation]\nseismic_bracing_zone = 5\n").unwrap();
        assert!(!config.remediation.legacy_reason_matching);
        assert_eq!(config.remediation.edge_distance_mm, 500.0);
        assert_eq!(config.remediation.seismic_bracing_zone, 5);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert!(config.rules.path.is_none());
        assert_eq!(config.remediation, ApplyOptions::default());
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = parse_config(
            "[rules]\npath = \"a.json\"\n[remediation]\nedge_distance_mm = 300.0\n[batch]\nconcurrency = 2\n",
        )
        .unwrap();
        let cli = CliOverrides {
            rules: Some(Utf8PathBuf::from("b.toml")),
            edge_distance_mm: Some(600.0),
            concurrency: Some(16),
            ..Default::default()
        };

        let merged = ConfigMerger::new(config).merge(Utf8Path::new("/proj"), &cli);
        assert_eq!(merged.rules_path, Some(Utf8PathBuf::from("b.toml")));
        assert_eq!(merged.apply.edge_distance_mm, 600.0);
        assert_eq!(merged.concurrency, Some(16));
    }

    #[test]
    fn test_config_rules_path_is_root_relative() {
        let config = parse_config("[rules]\npath = \"codes/rules.json\"\n").unwrap();
        let merged =
            ConfigMerger::new(config).merge(Utf8Path::new("/proj"), &CliOverrides::default());
        assert_eq!(
            merged.rules_path,
            Some(Utf8PathBuf::from("/proj/codes/rules.json"))
        );
    }

    #[test]
    fn test_discover_config_some_and_none() {
        let temp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8");
        assert!(discover_config(&root).is_none());

        std::fs::write(root.join(CONFIG_FILE_NAME), "").expect("write config");
        assert!(discover_config(&root).is_some());
        assert!(load_or_default(&root).is_ok());
    }
}
