//! Core check, review and fix pipelines, extracted from the CLI.
//!
//! These entry points are I/O-agnostic: all filesystem access goes through the port
//! traits.

use crate::ports::{FindingsSource, PanelSource, WritePort};
use crate::settings::{RunMode, RunSettings};
use anyhow::Context;
use camino::Utf8Path;
use chrono::Utc;
use panelqc_domain::{evaluate, merge};
use panelqc_remedy::{ApplyOptions, apply};
use panelqc_types::schema::{PANELQC_CHECK_V1, PANELQC_REMEDIATION_V1, PANELQC_REVIEW_V1};
use panelqc_types::{
    Artifact, CheckResult, ExternalFindings, MergedResult, PanelData, PanelError, Remediation,
    RuleTable, RunInfo, ToolInfo, Violation,
};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Error type for pipeline results. Exit code 2 = invalid panel, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("invalid panel: {0}")]
    Invalid(#[from] PanelError),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> i32 {
        match self {
            ToolError::Invalid(_) => 2,
            ToolError::Internal(_) => 1,
        }
    }
}

pub fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "panelqc".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}

/// Evaluate one panel against the rule table.
pub fn run_check(panel: &PanelData, rules: &RuleTable) -> Result<CheckResult, ToolError> {
    panel.validate()?;
    Ok(evaluate(panel, rules))
}

/// Evaluate one panel and reconcile the result with external findings.
pub fn run_review(
    panel: &PanelData,
    rules: &RuleTable,
    findings: ExternalFindings,
) -> Result<MergedResult, ToolError> {
    let check = run_check(panel, rules)?;
    Ok(merge(check, findings))
}

/// Project fixes for `violations` onto a copy of the panel.
pub fn run_remediation(
    panel: &PanelData,
    violations: &[Violation],
    opts: &ApplyOptions,
) -> Result<Remediation, ToolError> {
    panel.validate()?;
    Ok(apply(panel, violations, opts))
}

/// Everything produced for one panel.
#[derive(Debug, Clone)]
pub struct PanelOutcome {
    pub panel_id: String,
    pub check: CheckResult,
    pub review: Option<MergedResult>,
    pub remediation: Option<Remediation>,
}

impl PanelOutcome {
    /// The verdict a caller should report: the merged status when reviewed, else pass/fail.
    pub fn passed(&self) -> bool {
        match &self.review {
            Some(merged) => merged.total_violations == 0 && !merged.needs_review,
            None => self.check.pass_fail,
        }
    }
}

/// Run the pipeline for one panel according to `settings.mode`.
pub fn run_panel(
    settings: &RunSettings,
    panel: &PanelData,
    rules: &RuleTable,
    findings: Option<ExternalFindings>,
) -> Result<PanelOutcome, ToolError> {
    let check = run_check(panel, rules)?;

    let review = match settings.mode {
        RunMode::Check => None,
        RunMode::Review | RunMode::Fix => {
            Some(merge(check.clone(), findings.unwrap_or_default()))
        }
    };

    let remediation = match (&review, settings.mode) {
        (Some(merged), RunMode::Fix) => {
            let violations: Vec<Violation> = merged.all_violations().cloned().collect();
            Some(apply(panel, &violations, &settings.apply))
        }
        _ => None,
    };

    Ok(PanelOutcome {
        panel_id: panel.panel_id.clone(),
        check,
        review,
        remediation,
    })
}

/// One entry of a batch run, in input order.
#[derive(Debug)]
pub struct BatchItem {
    pub panel_id: String,
    pub outcome: Result<PanelOutcome, ToolError>,
}

/// Run every panel from `panels` independently on a pool of `settings.concurrency`
/// threads. Findings are looked up before the fan-out.
pub fn run_batch(
    settings: &RunSettings,
    panels: &dyn PanelSource,
    rules: &RuleTable,
    findings: &dyn FindingsSource,
) -> anyhow::Result<Vec<BatchItem>> {
    let panels = panels.load_panels().context("load panels")?;

    // Invalid and repeated panels fail on their own, before any findings are read for them.
    let mut seen = BTreeSet::new();
    let mut jobs = Vec::with_capacity(panels.len());
    for panel in panels {
        let prepared = match panel.validate() {
            Err(e) => Err(ToolError::from(e)),
            Ok(()) if !seen.insert(panel.panel_id.clone()) => {
                Err(ToolError::from(PanelError::DuplicatePanelId {
                    panel_id: panel.panel_id.clone(),
                }))
            }
            Ok(()) => match settings.mode {
                RunMode::Check => Ok(None),
                RunMode::Review | RunMode::Fix => Ok(findings
                    .findings_for(&panel.panel_id)
                    .with_context(|| format!("findings for panel {}", panel.panel_id))?),
            },
        };
        jobs.push((panel, prepared));
    }

    debug!(
        panels = jobs.len(),
        concurrency = settings.concurrency,
        "starting batch"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(settings.concurrency.max(1))
        .build()
        .context("build thread pool")?;

    let mut ordered: Vec<(usize, BatchItem)> = pool.install(|| {
        jobs.into_par_iter()
            .enumerate()
            .map(|(index, (panel, prepared))| {
                let outcome =
                    prepared.and_then(|external| run_panel(settings, &panel, rules, external));
                (
                    index,
                    BatchItem {
                        panel_id: panel.panel_id,
                        outcome,
                    },
                )
            })
            .collect()
    });
    ordered.sort_by_key(|(index, _)| *index);

    let items: Vec<BatchItem> = ordered.into_iter().map(|(_, item)| item).collect();
    let failed = items.iter().filter(|i| i.outcome.is_err()).count();
    info!(panels = items.len(), failed, "batch complete");
    Ok(items)
}

/// Write the artifacts for one panel outcome into `out_dir`.
///
/// Always writes `check.json`; `review.json` when reviewed; `fixed_panel.json` and
/// `bracing.json` when remediated.
pub fn write_artifacts(
    outcome: &PanelOutcome,
    out_dir: &Utf8Path,
    writer: &dyn WritePort,
    run: &RunInfo,
) -> anyhow::Result<()> {
    writer.create_dir_all(out_dir)?;

    write_json(writer, out_dir, "check.json", PANELQC_CHECK_V1, run, &outcome.check)?;

    if let Some(merged) = &outcome.review {
        write_json(writer, out_dir, "review.json", PANELQC_REVIEW_V1, run, merged)?;
    }

    if let Some(remediation) = &outcome.remediation {
        write_json(
            writer,
            out_dir,
            "fixed_panel.json",
            PANELQC_REMEDIATION_V1,
            run,
            &remediation.panel,
        )?;
        write_json(
            writer,
            out_dir,
            "bracing.json",
            PANELQC_REMEDIATION_V1,
            run,
            &remediation.bracing,
        )?;
    }

    debug!(panel_id = %outcome.panel_id, dir = %out_dir, "wrote artifacts");
    Ok(())
}

/// Write each successful batch item into `settings.out_dir/<panel_id>`. Does nothing on a
/// dry run.
pub fn write_batch_artifacts(
    settings: &RunSettings,
    items: &[BatchItem],
    writer: &dyn WritePort,
    run: &RunInfo,
) -> anyhow::Result<()> {
    if settings.dry_run {
        debug!("dry run, skipping artifacts");
        return Ok(());
    }
    for item in items {
        if let Ok(outcome) = &item.outcome {
            write_artifacts(outcome, &settings.out_dir.join(&item.panel_id), writer, run)?;
        }
    }
    Ok(())
}

/// Stamp the end of a run.
pub fn finish_run(started_at: chrono::DateTime<Utc>) -> RunInfo {
    RunInfo {
        started_at: Some(started_at),
        ended_at: Some(Utc::now()),
    }
}

fn write_json<T: Serialize>(
    writer: &dyn WritePort,
    out_dir: &Utf8Path,
    file: &str,
    schema: &str,
    run: &RunInfo,
    data: &T,
) -> anyhow::Result<()> {
    let artifact = Artifact::new(schema, tool_info(), run.clone(), data);
    let json = serde_json::to_string_pretty(&artifact).with_context(|| format!("serialize {file}"))?;
    writer.write_file(&out_dir.join(file), json.as_bytes())
}
