// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end lifecycle tests: ingest, train, validate, promote, serve, roll back.

use std::sync::Arc;

use serde_json::json;
use switchyard::lifecycle::{self, IngestSources};
use switchyard::serve::serve_lines;
use switchyard_config::model::SwitchyardConfig;
use switchyard_core::{ModelKind, Stage, SwitchyardError, TierId, ValidationThresholds};
use switchyard_test_utils::fixtures::{corpus, example_with_args, TOOLS};
use switchyard_test_utils::TestHarness;

async fn harness() -> TestHarness {
    TestHarness::builder().build().await.expect("harness should build")
}

#[tokio::test]
async fn shipped_pattern_resolves_known_query() {
    let h = harness().await;
    let mut examples = corpus(&TOOLS[..3], 10);
    examples.push(example_with_args("list files in docs", "list_dir", &[("path", "docs")]));
    h.ship(examples, ModelKind::Pattern).await.unwrap();

    let result = h.resolve("list files in docs").await;
    assert_eq!(result.tool_name.as_deref(), Some("list_dir"));
    assert_eq!(result.arguments["path"], json!("docs"));
    assert!(result.confidence >= 0.8, "confidence {}", result.confidence);
    assert_eq!(result.tier, TierId::Pattern);
}

#[tokio::test]
async fn without_production_the_router_degrades_instead_of_failing() {
    let h = harness().await;
    let result = h.resolve("list files in docs").await;
    assert!(result.tool_name.is_none());
    assert_eq!(result.confidence, 0.0);
    let error = result.error.unwrap();
    assert!(error.contains("unavailable"), "{error}");
}

#[tokio::test]
async fn training_covers_every_tool_in_the_corpus() {
    let h = harness().await;
    let artifact = h.train(corpus(&TOOLS, 20), ModelKind::Pattern).await.unwrap();
    assert_eq!(artifact.tool_coverage.len(), 6);
    assert_eq!(artifact.stage, Stage::Staging);
    assert!(h.version_control.production().is_none(), "staging never serves");
}

#[tokio::test]
async fn boundary_accuracy_pass_reaches_validated() {
    let h = harness().await;
    let training = corpus(&TOOLS[..4], 5);
    let mut held_out = training.clone();
    held_out[3].expected_tool = "schedule_event".into();

    let candidate = h.train(training, ModelKind::Pattern).await.unwrap();
    let thresholds = ValidationThresholds::new(0.95, 1_000.0).unwrap();
    let report = h.validate(&candidate, &held_out, thresholds).await.unwrap();
    assert_eq!(report.sample_count(), 20);
    assert_eq!(report.accuracy(), 0.95);
    assert!(report.passed());

    let validated = h
        .version_control
        .promote_to_validated(&candidate, &report)
        .await
        .unwrap();
    assert_eq!(validated.stage, Stage::Validated);
    assert_eq!(validated.accuracy, Some(0.95));
}

#[tokio::test]
async fn failing_report_blocks_promotion_without_side_effects() {
    let h = harness().await;
    let training = corpus(&TOOLS[..2], 5);
    let mut held_out = training.clone();
    held_out[0].expected_tool = "read_file".into();

    let candidate = h.train(training, ModelKind::Pattern).await.unwrap();
    let thresholds = ValidationThresholds::new(1.0, 1_000.0).unwrap();
    let report = h.validate(&candidate, &held_out, thresholds).await.unwrap();
    assert!(!report.passed());

    let err = h
        .version_control
        .promote_to_validated(&candidate, &report)
        .await
        .unwrap_err();
    assert!(matches!(err, SwitchyardError::ValidationFailed { .. }), "got {err:?}");
    let status = h.version_control.status().await.unwrap();
    assert!(status.validated.is_empty());
    assert_eq!(status.staging.len(), 1);
}

#[tokio::test]
async fn concurrent_training_is_exclusive() {
    let h = harness().await;
    let (first, second) = tokio::join!(
        h.train(corpus(&TOOLS, 5), ModelKind::Pattern),
        h.train(corpus(&TOOLS, 5), ModelKind::Classifier),
    );
    assert!(first.is_ok());
    assert!(matches!(second, Err(SwitchyardError::TrainingBusy)));
}

#[tokio::test]
async fn staging_artifact_never_reaches_production() {
    let h = harness().await;
    let shipped = h.ship(corpus(&TOOLS[..2], 3), ModelKind::Pattern).await.unwrap();
    let candidate = h.train(corpus(&TOOLS, 3), ModelKind::Pattern).await.unwrap();

    let err = h
        .version_control
        .promote_to_production(&candidate)
        .await
        .unwrap_err();
    assert!(matches!(err, SwitchyardError::InvalidStage { .. }), "got {err:?}");
    assert_eq!(h.version_control.production().unwrap().version, shipped.version);
}

#[tokio::test]
async fn rollback_restores_previous_coverage_and_serving() {
    let h = harness().await;
    let v1 = h.ship(corpus(&TOOLS[..3], 5), ModelKind::Pattern).await.unwrap();
    let v2 = h.ship(corpus(&TOOLS, 5), ModelKind::Classifier).await.unwrap();
    assert_eq!(h.version_control.production().unwrap().version, v2.version);
    assert_eq!(
        h.resolve("send email request 2").await.tool_name.as_deref(),
        Some("send_email")
    );

    let restored = h.version_control.rollback().await.unwrap();
    assert_eq!(restored.version, v1.version);
    assert_eq!(restored.tool_coverage, v1.tool_coverage);
    assert_ne!(
        h.resolve("send email request 2").await.tool_name.as_deref(),
        Some("send_email")
    );

    let err = h.version_control.rollback().await.unwrap_err();
    assert!(matches!(err, SwitchyardError::NoArchiveAvailable));
}

#[tokio::test]
async fn restart_reloads_production() {
    let h = harness().await;
    let shipped = h.ship(corpus(&TOOLS[..2], 3), ModelKind::Pattern).await.unwrap();

    let reopened = h.reopen().await.unwrap();
    assert_eq!(reopened.production().unwrap().version, shipped.version);
}

#[tokio::test]
async fn serve_answers_every_line_in_order() {
    let h = harness().await;
    h.ship(corpus(&TOOLS, 5), ModelKind::Pattern).await.unwrap();

    let input = concat!(
        "list dir request 1\n",
        "\n",
        "{\"query\": \"query erp request 4\"}\n",
        "{\"query\": 7}\n",
        "send email request 0\n",
    );
    let mut output = Vec::new();
    let served = serve_lines(Arc::clone(&h.router), input.as_bytes(), &mut output, 4)
        .await
        .unwrap();
    assert_eq!(served, 4);

    let lines: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["tool_name"], json!("list_dir"));
    assert_eq!(lines[1]["tool_name"], json!("query_erp"));
    assert!(lines[2]["error"].as_str().unwrap().starts_with("invalid request"));
    assert_eq!(lines[3]["tool_name"], json!("send_email"));
    assert_eq!(h.router.stats().requests, 3);
}

#[tokio::test]
async fn operator_commands_drive_the_full_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = SwitchyardConfig::default();
    config.registry.root = dir.path().join("artifacts").display().to_string();

    let history = dir.path().join("history.jsonl");
    let records: Vec<String> = corpus(&TOOLS, 10)
        .into_iter()
        .map(|e| {
            json!({
                "query": e.query,
                "tool": e.expected_tool,
                "success": true,
                "timestamp": "2026-01-01T00:00:00Z",
            })
            .to_string()
        })
        .collect();
    std::fs::write(&history, records.join("\n")).unwrap();

    let dataset = dir.path().join("dataset.jsonl");
    let sources = IngestSources {
        history: Some(history),
        ..IngestSources::default()
    };
    assert_eq!(lifecycle::run_ingest(&sources, &dataset).unwrap(), 60);

    let held_out = dir.path().join("held_out.jsonl");
    let candidate = lifecycle::run_train(&config, &dataset, None, Some(held_out.as_path()))
        .await
        .unwrap();
    assert_eq!(candidate.example_count, 48);
    assert!(held_out.exists());

    // Pattern models only recall queries they were trained on.
    let thresholds = ValidationThresholds::new(0.0, 1_000.0).unwrap();
    let report = lifecycle::run_validate(&config, &candidate.version, &held_out, thresholds, true)
        .await
        .unwrap();
    assert_eq!(report.sample_count(), 12);

    let installed = lifecycle::run_promote(&config, &candidate.version).await.unwrap();
    assert_eq!(installed.stage, Stage::Production);

    let status = lifecycle::run_status(&config, true).await.unwrap();
    assert_eq!(status.production.unwrap().version, candidate.version);
    assert!(status.validated.is_empty());

    let err = lifecycle::run_rollback(&config).await.unwrap_err();
    assert!(matches!(err, SwitchyardError::NoArchiveAvailable));

    let unknown = lifecycle::run_promote(&config, "nope").await.unwrap_err();
    assert!(matches!(unknown, SwitchyardError::InvalidInput(_)));
}
