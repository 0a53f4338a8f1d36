mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use clap::{Parser, Subcommand};
use config::{CliOverrides, ConfigMerger, MergedConfig};
use panelqc_core::adapters::{
    FsFindingsSource, FsPanelSource, FsRuleSource, FsWritePort, NoFindings,
};
use panelqc_core::pipeline::{
    BatchItem, PanelOutcome, ToolError, finish_run, run_batch, run_panel, write_artifacts,
    write_batch_artifacts,
};
use panelqc_core::ports::{FindingsSource, PanelSource, RuleSource};
use panelqc_core::settings::{RunMode, RunSettings, default_concurrency};
use panelqc_types::{PanelData, RuleTable};
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "panelqc",
    version,
    about = "Deterministic quality control for prefabricated wall panels."
)]
struct Cli {
    /// Project root holding panelqc.toml (default: current directory).
    #[arg(long, global = true, default_value = ".")]
    root: Utf8PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate one panel against the rule table.
    Check(PanelArgs),
    /// Evaluate one panel and merge the analysis collaborator's findings.
    Review(PanelArgs),
    /// Review one panel, then write a remediated copy and its bracing annotations.
    Fix(FixArgs),
    /// Run a directory of panels in parallel.
    Batch(BatchArgs),
    /// Print the effective rule table.
    Rules(RulesArgs),
}

#[derive(Debug, Parser)]
struct CommonArgs {
    /// Rule table (JSON or TOML). Overrides [rules] path in panelqc.toml.
    #[arg(long)]
    rules: Option<Utf8PathBuf>,

    /// Findings from the analysis collaborator: one file, or a directory of <panel_id>.json.
    #[arg(long)]
    findings: Option<Utf8PathBuf>,

    /// Output directory for artifacts (default: <root>/artifacts/panelqc).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Do not write artifacts.
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Output format on stdout.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Parser)]
struct PanelArgs {
    /// Panel geometry JSON.
    #[arg(long)]
    panel: Utf8PathBuf,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Parser)]
struct RemediationArgs {
    /// Also triage violations by keywords in their reason text.
    #[arg(long, default_value_t = false)]
    legacy_reason_matching: bool,

    /// Openings closer than this to a panel edge are braced.
    #[arg(long)]
    edge_distance_mm: Option<f64>,

    /// Seismic zone from which edge and corner openings are always braced.
    #[arg(long)]
    seismic_bracing_zone: Option<u32>,
}

#[derive(Debug, Parser)]
struct FixArgs {
    #[command(flatten)]
    panel: PanelArgs,

    #[command(flatten)]
    remediation: RemediationArgs,
}

#[derive(Debug, Parser)]
struct BatchArgs {
    /// Directory of panel JSON files.
    #[arg(long)]
    panels: Utf8PathBuf,

    /// What to run for every panel.
    #[arg(long, value_enum, default_value = "check")]
    mode: BatchMode,

    /// Worker threads. Overrides [batch] concurrency in panelqc.toml.
    #[arg(long)]
    concurrency: Option<usize>,

    #[command(flatten)]
    common: CommonArgs,

    #[command(flatten)]
    remediation: RemediationArgs,
}

#[derive(Debug, Parser)]
struct RulesArgs {
    /// Rule table (JSON or TOML). Overrides [rules] path in panelqc.toml.
    #[arg(long)]
    rules: Option<Utf8PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "json")]
    format: RulesFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum BatchMode {
    Check,
    Review,
    Fix,
}

impl From<BatchMode> for RunMode {
    fn from(mode: BatchMode) -> Self {
        match mode {
            BatchMode::Check => RunMode::Check,
            BatchMode::Review => RunMode::Review,
            BatchMode::Fix => RunMode::Fix,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum RulesFormat {
    Json,
    Toml,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = cli.root;
    let result = match cli.cmd {
        Command::Check(args) => cmd_panel(&root, args, None, RunMode::Check),
        Command::Review(args) => cmd_panel(&root, args, None, RunMode::Review),
        Command::Fix(args) => cmd_panel(&root, args.panel, Some(args.remediation), RunMode::Fix),
        Command::Batch(args) => cmd_batch(&root, args),
        Command::Rules(args) => cmd_rules(&root, args).map_err(ToolError::from),
    };

    match result {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn merged_config(
    root: &Utf8Path,
    rules: Option<Utf8PathBuf>,
    remediation: Option<&RemediationArgs>,
    concurrency: Option<usize>,
) -> anyhow::Result<MergedConfig> {
    let file_config = config::load_or_default(root).context("load panelqc.toml config")?;
    let overrides = CliOverrides {
        rules,
        legacy_reason_matching: remediation.is_some_and(|r| r.legacy_reason_matching),
        edge_distance_mm: remediation.and_then(|r| r.edge_distance_mm),
        seismic_bracing_zone: remediation.and_then(|r| r.seismic_bracing_zone),
        concurrency,
    };
    let merged = ConfigMerger::new(file_config).merge(root, &overrides);
    debug!(
        "merged config: rules={:?}, apply={:?}, concurrency={:?}",
        merged.rules_path, merged.apply, merged.concurrency
    );
    Ok(merged)
}

fn settings_for(
    root: &Utf8Path,
    common: &CommonArgs,
    merged: &MergedConfig,
    mode: RunMode,
) -> RunSettings {
    RunSettings {
        out_dir: common
            .out_dir
            .clone()
            .unwrap_or_else(|| root.join("artifacts").join("panelqc")),
        mode,
        dry_run: common.dry_run,
        apply: merged.apply.clone(),
        concurrency: merged.concurrency.unwrap_or_else(default_concurrency),
    }
}

fn load_rules(merged: &MergedConfig) -> anyhow::Result<RuleTable> {
    FsRuleSource::new(merged.rules_path.clone())
        .load_rules()
        .context("load rule table")
}

fn findings_source(path: Option<&Utf8PathBuf>) -> Box<dyn FindingsSource> {
    match path {
        Some(p) => Box::new(FsFindingsSource::new(p.clone())),
        None => Box::new(NoFindings),
    }
}

fn cmd_panel(
    root: &Utf8Path,
    args: PanelArgs,
    remediation: Option<RemediationArgs>,
    mode: RunMode,
) -> Result<(), ToolError> {
    let started = Utc::now();
    let merged = merged_config(root, args.common.rules.clone(), remediation.as_ref(), None)?;
    let settings = settings_for(root, &args.common, &merged, mode);
    let rules = load_rules(&merged)?;

    let panel = load_single_panel(&args.panel)?;
    panel.validate()?;
    if mode == RunMode::Check && args.common.findings.is_some() {
        warn!("--findings is ignored by `check`");
    }
    let findings = match mode {
        RunMode::Check => None,
        RunMode::Review | RunMode::Fix => findings_source(args.common.findings.as_ref())
            .findings_for(&panel.panel_id)
            .context("load findings")?,
    };

    let outcome = run_panel(&settings, &panel, &rules, findings)?;

    if !settings.dry_run {
        write_artifacts(&outcome, &settings.out_dir, &FsWritePort, &finish_run(started))?;
        info!("wrote artifacts to {}", settings.out_dir);
    }

    print_outcome(&outcome, args.common.format)?;
    Ok(())
}

fn load_single_panel(path: &Utf8Path) -> anyhow::Result<PanelData> {
    let mut panels = FsPanelSource::new(path.to_path_buf()).load_panels()?;
    match panels.len() {
        1 => Ok(panels.remove(0)),
        n => anyhow::bail!("expected one panel in {}, found {}", path, n),
    }
}

fn cmd_batch(root: &Utf8Path, args: BatchArgs) -> Result<(), ToolError> {
    let started = Utc::now();
    let merged = merged_config(
        root,
        args.common.rules.clone(),
        Some(&args.remediation),
        args.concurrency,
    )?;
    let settings = settings_for(root, &args.common, &merged, args.mode.into());
    let rules = load_rules(&merged)?;

    let panels = FsPanelSource::new(args.panels.clone());
    let findings = findings_source(args.common.findings.as_ref());
    let items = run_batch(&settings, &panels, &rules, findings.as_ref())?;

    write_batch_artifacts(&settings, &items, &FsWritePort, &finish_run(started))?;

    match args.common.format {
        OutputFormat::Text => {
            for item in &items {
                match &item.outcome {
                    Ok(outcome) => println!("{}", outcome_line(outcome)),
                    Err(e) => println!("{}: ERROR {e}", item.panel_id),
                }
            }
        }
        OutputFormat::Json => {
            let rows: Vec<_> = items.iter().map(batch_row).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&rows).context("serialize batch summary")?
            );
        }
    }

    // The most severe per-panel failure decides the exit code.
    match items
        .into_iter()
        .filter_map(|i| i.outcome.err())
        .max_by_key(ToolError::exit_code)
    {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn batch_row(item: &BatchItem) -> serde_json::Value {
    match &item.outcome {
        Ok(outcome) => serde_json::json!({
            "panel_id": item.panel_id,
            "status": status_label(outcome),
            "violations": violation_total(outcome),
        }),
        Err(e) => serde_json::json!({
            "panel_id": item.panel_id,
            "status": "error",
            "error": e.to_string(),
        }),
    }
}

fn cmd_rules(root: &Utf8Path, args: RulesArgs) -> anyhow::Result<()> {
    let merged = merged_config(root, args.rules, None, None)?;
    let rules = load_rules(&merged)?;
    let out = match args.format {
        RulesFormat::Json => serde_json::to_string_pretty(&rules).context("serialize rules")?,
        RulesFormat::Toml => toml::to_string_pretty(&rules).context("serialize rules")?,
    };
    println!("{out}");
    Ok(())
}

fn status_label(outcome: &PanelOutcome) -> &'static str {
    match &outcome.review {
        Some(merged) => merged.final_status.as_str(),
        None if outcome.check.pass_fail => "pass",
        None => "fail",
    }
}

fn violation_total(outcome: &PanelOutcome) -> u64 {
    match &outcome.review {
        Some(merged) => merged.total_violations,
        None => outcome.check.violations.len() as u64,
    }
}

fn outcome_line(outcome: &PanelOutcome) -> String {
    let mut line = match &outcome.review {
        Some(merged) => format!(
            "{}: {} ({} violations, {} external-only)",
            outcome.panel_id,
            merged.final_status.as_str(),
            merged.total_violations,
            merged.external_only.len()
        ),
        None => format!("{}: {}", outcome.panel_id, outcome.check.summary),
    };
    if let Some(fixed) = &outcome.remediation {
        let applied: Vec<_> = fixed.applied.iter().map(|c| c.as_str()).collect();
        line.push_str(&format!(
            "; fixed as {} [{}], {} braces",
            fixed.panel.panel_id,
            applied.join(", "),
            fixed.bracing.len()
        ));
    }
    line
}

fn print_outcome(outcome: &PanelOutcome, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", outcome_line(outcome));
            let violations = outcome
                .review
                .as_ref()
                .map(|m| m.all_violations().collect::<Vec<_>>())
                .unwrap_or_else(|| outcome.check.violations.iter().collect());
            for v in violations {
                println!(
                    "  [{}] {} {}: {}",
                    v.severity, v.violation_id, v.element, v.reason
                );
            }
            for skipped in &outcome.check.skipped_checks {
                println!("  skipped {}: {}", skipped.family, skipped.reason);
            }
        }
        OutputFormat::Json => {
            let value = match (&outcome.review, &outcome.remediation) {
                (_, Some(fixed)) => serde_json::to_value(fixed),
                (Some(merged), None) => serde_json::to_value(merged),
                (None, None) => serde_json::to_value(&outcome.check),
            }
            .context("serialize result")?;
            println!(
                "{}",
                serde_json::to_string_pretty(&value).context("serialize result")?
            );
        }
    }
    Ok(())
}
