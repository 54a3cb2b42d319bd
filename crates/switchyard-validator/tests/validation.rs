// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Validator scoring against stored and in-memory candidates.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use switchyard_config::model::LearningConfig;
use switchyard_core::{
    Arguments, ModelKind, Provenance, SourceKind, Stage, SwitchyardError, TierId,
    TrainingExample, ValidationThresholds,
};
use switchyard_learning::LearningEngine;
use switchyard_model::{PatternModel, TrainedModel};
use switchyard_registry::ArtifactStore;
use switchyard_test_utils::{MockStep, MockTier};
use switchyard_validator::Validator;

const TOOLS: [&str; 4] = ["list_dir", "read_file", "send_email", "query_erp"];

fn example(query: String, tool: &str) -> TrainingExample {
    TrainingExample {
        query,
        expected_tool: tool.to_string(),
        expected_arguments: Arguments::new(),
        provenance: Provenance {
            source: SourceKind::History,
            timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
            correction_id: None,
        },
    }
}

/// 20 examples, 5 per tool.
fn twenty() -> Vec<TrainingExample> {
    TOOLS
        .iter()
        .flat_map(|tool| {
            (0..5).map(move |i| example(format!("{} job {i}", tool.replace('_', " ")), tool))
        })
        .collect()
}

fn pattern_model(examples: &[TrainingExample]) -> TrainedModel {
    TrainedModel::Pattern(PatternModel::fit(examples).unwrap())
}

async fn validator(root: &std::path::Path) -> Validator {
    Validator::new(ArtifactStore::open(root).await.unwrap())
}

#[tokio::test]
async fn nineteen_of_twenty_passes_at_inclusive_boundary() {
    let dir = tempfile::tempdir().unwrap();
    let validator = validator(dir.path()).await;

    let training = twenty();
    let mut held_out = training.clone();
    held_out[7].expected_tool = "schedule_event".into();

    let thresholds = ValidationThresholds::new(0.95, 1_000.0).unwrap();
    let report = validator
        .validate_model("v-c", pattern_model(&training), &held_out, thresholds)
        .await
        .unwrap();

    assert_eq!(report.sample_count(), 20);
    assert_eq!(report.accuracy(), 0.95);
    assert!(report.passed());
    assert_eq!(report.artifact_version(), "v-c");
    assert_eq!(report.per_tool_accuracy()["schedule_event"], 0.0);
    assert_eq!(report.per_tool_accuracy()["list_dir"], 1.0);
}

#[tokio::test(start_paused = true)]
async fn slow_candidate_fails_on_latency_despite_perfect_accuracy() {
    let dir = tempfile::tempdir().unwrap();
    let validator = validator(dir.path()).await;

    let held_out: Vec<_> = (0..20).map(|i| example(format!("say {i}"), "echo")).collect();
    let tier = Arc::new(MockTier::always(
        TierId::Pattern,
        MockStep::answer("echo", 0.9).delayed(Duration::from_millis(25)),
    ));
    let thresholds = ValidationThresholds::new(0.9, 20.0).unwrap();

    let report = validator
        .validate_tier("v-d", tier.clone(), &held_out, thresholds)
        .await
        .unwrap();

    assert_eq!(report.accuracy(), 1.0);
    assert!(report.p99_latency_ms() >= 25.0, "p99 {}", report.p99_latency_ms());
    assert!(!report.passed());
    assert_eq!(tier.attempts(), 20);
}

#[tokio::test]
async fn failing_candidate_scores_zero_instead_of_erroring() {
    let dir = tempfile::tempdir().unwrap();
    let validator = validator(dir.path()).await;

    let tier = Arc::new(MockTier::with_steps(
        TierId::Embedded,
        vec![MockStep::answer("list_dir", 0.2), MockStep::Fail, MockStep::Malformed],
    ));
    let held_out: Vec<_> = (0..4).map(|i| example(format!("list {i}"), "list_dir")).collect();
    let thresholds = ValidationThresholds::new(0.25, 1_000.0).unwrap();

    let report = validator
        .validate_tier("v-e", tier.clone(), &held_out, thresholds)
        .await
        .unwrap();

    // Low confidence still counts; the pinned tier has no floor.
    assert_eq!(report.accuracy(), 0.25);
    assert!(report.passed());
    assert_eq!(report.sample_count(), 4);
    assert_eq!(tier.attempts(), 4);
}

#[tokio::test]
async fn accuracy_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let validator = validator(dir.path()).await;

    let training = twenty();
    let held_out = vec![
        example("list dir job 9".into(), "list_dir"),
        example("read something".into(), "read_file"),
        example("email the team".into(), "send_email"),
        example("unrelated words entirely".into(), "query_erp"),
    ];
    let thresholds = ValidationThresholds::new(0.5, 1_000.0).unwrap();

    let first = validator
        .validate_model("v", pattern_model(&training), &held_out, thresholds)
        .await
        .unwrap();
    let second = validator
        .validate_model("v", pattern_model(&training), &held_out, thresholds)
        .await
        .unwrap();

    assert_eq!(first.accuracy(), second.accuracy());
    assert_eq!(first.per_tool_accuracy(), second.per_tool_accuracy());
}

#[tokio::test]
async fn empty_held_out_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let validator = validator(dir.path()).await;
    let thresholds = ValidationThresholds::new(0.9, 50.0).unwrap();

    let err = validator
        .validate_model("v", pattern_model(&twenty()), &[], thresholds)
        .await
        .unwrap_err();
    assert!(matches!(err, SwitchyardError::InvalidInput(_)), "got {err:?}");
}

#[tokio::test]
async fn out_of_range_thresholds_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let validator = validator(dir.path()).await;
    let thresholds = ValidationThresholds {
        min_accuracy: 1.5,
        max_latency_p99_ms: 50.0,
    };

    let err = validator
        .validate_model("v", pattern_model(&twenty()), &twenty(), thresholds)
        .await
        .unwrap_err();
    assert!(matches!(err, SwitchyardError::InvalidInput(_)));
}

#[tokio::test]
async fn stored_candidate_is_validated_without_moving_it() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::open(dir.path()).await.unwrap();
    let engine = LearningEngine::new(store.clone(), LearningConfig::default());
    let validator = Validator::new(store.clone());

    let artifact = engine.train(twenty(), ModelKind::Pattern).await.unwrap();
    let thresholds = ValidationThresholds::new(0.95, 1_000.0).unwrap();
    let report = validator
        .validate(&artifact, &twenty(), thresholds)
        .await
        .unwrap();

    assert_eq!(report.accuracy(), 1.0);
    assert!(report.passed());
    assert_eq!(store.list(Stage::Staging).await.unwrap().len(), 1);
    assert!(store.list(Stage::Validated).await.unwrap().is_empty());
    assert!(store.current_version().await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_artifact_is_an_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::open(dir.path()).await.unwrap();
    let engine = LearningEngine::new(store.clone(), LearningConfig::default());
    let validator = Validator::new(store);

    let mut artifact = engine.train(twenty(), ModelKind::Pattern).await.unwrap();
    artifact.version = "19700101T000000000Z-deadbeef".into();
    let thresholds = ValidationThresholds::new(0.5, 1_000.0).unwrap();

    let err = validator
        .validate(&artifact, &twenty(), thresholds)
        .await
        .unwrap_err();
    assert!(matches!(err, SwitchyardError::InvalidInput(_)), "got {err:?}");
}
