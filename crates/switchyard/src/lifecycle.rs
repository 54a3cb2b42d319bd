// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator commands: `ingest`, `train`, `validate`, `promote`, `rollback`,
//! and `status`.
//!
//! Every command fails loudly with a typed error and leaves the artifact
//! store unchanged on failure.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use switchyard_config::model::SwitchyardConfig;
use switchyard_core::{
    ModelArtifact, ModelKind, SwitchyardError, ValidationReport, ValidationThresholds,
};
use switchyard_ingest::{
    combine, export_examples, import_examples, read_records, split_held_out, CorrectionEntry,
    HistoryRecord, SyntheticTemplate,
};
use switchyard_learning::LearningEngine;
use switchyard_model::empty_slot;
use switchyard_registry::{ArtifactStore, RegistryStatus, VersionControl};
use switchyard_validator::Validator;
use tracing::info;

/// Open the configured store and load the production artifact, if any.
pub async fn open_version_control(
    config: &SwitchyardConfig,
) -> Result<VersionControl, SwitchyardError> {
    let store = ArtifactStore::open(config.registry.root_path()).await?;
    VersionControl::open(store, empty_slot(), config.registry.archive_retention).await
}

/// Metadata of `version` as stored in the staging, validated, or production area.
pub async fn find_artifact(
    store: &ArtifactStore,
    version: &str,
) -> Result<ModelArtifact, SwitchyardError> {
    let (stage, dir) = store
        .locate(version)
        .await?
        .ok_or_else(|| SwitchyardError::InvalidInput(format!("artifact {version} not found")))?;
    Ok(store.load(&dir, stage).await?.sidecar.artifact)
}

/// Inputs for `switchyard ingest`. Missing sources count as empty.
#[derive(Debug, Clone, Default)]
pub struct IngestSources {
    pub history: Option<PathBuf>,
    pub templates: Option<PathBuf>,
    pub corrections: Option<PathBuf>,
}

/// Convert and merge raw records into one example set at `out`.
pub fn run_ingest(sources: &IngestSources, out: &Path) -> Result<usize, SwitchyardError> {
    let history: Vec<HistoryRecord> = read_optional(sources.history.as_deref())?;
    let templates: Vec<SyntheticTemplate> = read_optional(sources.templates.as_deref())?;
    let corrections: Vec<CorrectionEntry> = read_optional(sources.corrections.as_deref())?;

    let examples = combine(&history, &templates, &corrections);
    let written = export_examples(&examples, out)?;
    info!(
        history = history.len(),
        templates = templates.len(),
        corrections = corrections.len(),
        examples = written,
        out = %out.display(),
        "dataset written"
    );
    println!("wrote {written} examples to {}", out.display());
    Ok(written)
}

fn read_optional<T: serde::de::DeserializeOwned>(
    path: Option<&Path>,
) -> Result<Vec<T>, SwitchyardError> {
    path.map_or_else(|| Ok(Vec::new()), read_records::<T>)
}

/// Train a staging artifact from a dataset file.
///
/// With `held_out`, the configured fraction of the dataset is split off with
/// the configured seed, written to that path, and excluded from training.
pub async fn run_train(
    config: &SwitchyardConfig,
    dataset: &Path,
    kind: Option<ModelKind>,
    held_out: Option<&Path>,
) -> Result<ModelArtifact, SwitchyardError> {
    let mut examples = import_examples(dataset)?;
    if let Some(path) = held_out {
        let split = split_held_out(examples, config.dataset.held_out_ratio, config.dataset.seed)?;
        export_examples(&split.held_out, path)?;
        println!(
            "held out {} examples to {}",
            split.held_out.len(),
            path.display()
        );
        examples = split.train;
    }

    let store = ArtifactStore::open(config.registry.root_path()).await?;
    let engine = LearningEngine::new(store, config.learning.clone());
    let kind = kind.unwrap_or(config.learning.default_kind);
    let artifact = engine.train(examples, kind).await?;

    println!(
        "trained {} ({kind}, {} examples, {} tools) -> {}",
        artifact.version,
        artifact.example_count,
        artifact.tool_coverage.len(),
        artifact.stage
    );
    Ok(artifact)
}

/// Validate a stored artifact; with `promote`, move it to VALIDATED when it passes.
pub async fn run_validate(
    config: &SwitchyardConfig,
    version: &str,
    held_out: &Path,
    thresholds: ValidationThresholds,
    promote: bool,
) -> Result<ValidationReport, SwitchyardError> {
    let version_control = open_version_control(config).await?;
    let artifact = find_artifact(version_control.store(), version).await?;
    let examples = import_examples(held_out)?;

    let report = Validator::new(version_control.store().clone())
        .validate(&artifact, &examples, thresholds)
        .await?;
    print!("{}", render_report(&report));

    if promote {
        let validated = version_control
            .promote_to_validated(&artifact, &report)
            .await?;
        println!("{} -> {}", validated.version, validated.stage);
    }
    Ok(report)
}

/// Install a VALIDATED artifact as production.
pub async fn run_promote(
    config: &SwitchyardConfig,
    version: &str,
) -> Result<ModelArtifact, SwitchyardError> {
    let version_control = open_version_control(config).await?;
    let artifact = find_artifact(version_control.store(), version).await?;
    let installed = version_control.promote_to_production(&artifact).await?;
    println!("{} -> {}", installed.version, installed.stage);
    Ok(installed)
}

/// Reinstall the most recently superseded production artifact.
pub async fn run_rollback(config: &SwitchyardConfig) -> Result<ModelArtifact, SwitchyardError> {
    let version_control = open_version_control(config).await?;
    let restored = version_control.rollback().await?;
    println!("rolled back to {}", restored.version);
    Ok(restored)
}

/// Print every area of the store, as text or JSON.
pub async fn run_status(
    config: &SwitchyardConfig,
    json: bool,
) -> Result<RegistryStatus, SwitchyardError> {
    let version_control = open_version_control(config).await?;
    let status = version_control.status().await?;

    if json {
        let rendered = serde_json::to_string_pretty(&status)
            .map_err(|e| SwitchyardError::Internal(format!("failed to render status: {e}")))?;
        println!("{rendered}");
    } else {
        print!("{}", render_status(&status, std::io::stdout().is_terminal()));
    }
    Ok(status)
}

/// Human-readable validation report.
pub fn render_report(report: &ValidationReport) -> String {
    let thresholds = report.thresholds();
    let mut out = String::new();
    out.push_str(&format!("artifact  {}\n", report.artifact_version()));
    out.push_str(&format!("samples   {}\n", report.sample_count()));
    out.push_str(&format!(
        "accuracy  {:.3} (min {:.3})\n",
        report.accuracy(),
        thresholds.min_accuracy
    ));
    out.push_str(&format!(
        "p99       {:.2}ms (max {:.2}ms)\n",
        report.p99_latency_ms(),
        thresholds.max_latency_p99_ms
    ));
    out.push_str(&format!("avg       {:.2}ms\n", report.avg_latency_ms()));
    for (tool, accuracy) in report.per_tool_accuracy() {
        out.push_str(&format!("  {tool:<24} {accuracy:.3}\n"));
    }
    out.push_str(if report.passed() {
        "result    PASSED\n"
    } else {
        "result    FAILED\n"
    });
    out
}

fn render_status(status: &RegistryStatus, color: bool) -> String {
    use colored::Colorize;

    let heading = |name: &str| {
        if color {
            name.bold().to_string()
        } else {
            name.to_string()
        }
    };
    let line = |artifact: &ModelArtifact| {
        let coverage = artifact.tool_coverage.len();
        match artifact.accuracy {
            Some(accuracy) => format!(
                "  {}  {}  {coverage} tools  accuracy {accuracy:.3}\n",
                artifact.version, artifact.kind
            ),
            None => format!("  {}  {}  {coverage} tools\n", artifact.version, artifact.kind),
        }
    };

    let mut out = String::new();
    out.push_str(&format!("{}\n", heading("production")));
    match &status.production {
        Some(artifact) => out.push_str(&line(artifact)),
        None => out.push_str("  (none)\n"),
    }
    for (name, artifacts) in [("validated", &status.validated), ("staging", &status.staging)] {
        out.push_str(&format!("{}\n", heading(name)));
        artifacts.iter().for_each(|a| out.push_str(&line(a)));
    }
    out.push_str(&format!("{}\n", heading("archive")));
    for entry in &status.archive {
        let reason = entry
            .reason
            .map(|r| r.to_string())
            .unwrap_or_else(|| "unknown".into());
        out.push_str(&format!("  {}  {reason}\n", entry.artifact.version));
    }
    out
}
