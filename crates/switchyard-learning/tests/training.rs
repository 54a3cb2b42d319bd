// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Training engine tests against a temporary artifact store.

use chrono::{DateTime, Utc};
use switchyard_config::model::LearningConfig;
use switchyard_core::{Arguments, ModelKind, Provenance, SourceKind, Stage, TrainingExample};
use switchyard_learning::{LearningEngine, StagingLock};
use switchyard_registry::ArtifactStore;

const TOOLS: [&str; 6] = [
    "list_dir",
    "read_file",
    "post_social",
    "send_email",
    "query_erp",
    "schedule_event",
];

fn example(query: String, tool: &str, source: SourceKind, secs: i64) -> TrainingExample {
    TrainingExample {
        query,
        expected_tool: tool.to_string(),
        expected_arguments: Arguments::new(),
        provenance: Provenance {
            source,
            timestamp: DateTime::<Utc>::from_timestamp(secs, 0).unwrap(),
            correction_id: None,
        },
    }
}

/// 120 distinct examples, 20 per tool.
fn corpus() -> Vec<TrainingExample> {
    TOOLS
        .iter()
        .flat_map(|tool| {
            (0..20).map(move |i| {
                example(
                    format!("{} request number {i}", tool.replace('_', " ")),
                    tool,
                    SourceKind::History,
                    i,
                )
            })
        })
        .collect()
}

async fn engine(root: &std::path::Path) -> LearningEngine {
    let store = ArtifactStore::open(root).await.unwrap();
    LearningEngine::new(store, LearningConfig::default())
}

#[tokio::test]
async fn trains_pattern_model_covering_every_tool() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path()).await;

    let artifact = engine.train(corpus(), ModelKind::Pattern).await.unwrap();
    assert_eq!(artifact.stage, Stage::Staging);
    assert_eq!(artifact.kind, ModelKind::Pattern);
    assert_eq!(artifact.example_count, 120);
    assert_eq!(artifact.tool_coverage.len(), 6);
    assert!(artifact.accuracy.is_none());
    assert!(artifact.location.starts_with(dir.path().join("staging")));
}

#[tokio::test]
async fn trains_classifier_model() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path()).await;

    let artifact = engine.train(corpus(), ModelKind::Classifier).await.unwrap();
    assert_eq!(artifact.kind, ModelKind::Classifier);
    assert_eq!(artifact.tool_coverage.len(), 6);

    let stored = engine
        .store()
        .load(&artifact.location, Stage::Staging)
        .await
        .unwrap();
    let prediction = stored.model.predict("send email request number 3").unwrap();
    assert_eq!(prediction.tool, "send_email");
}

#[tokio::test]
async fn production_area_is_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path()).await;
    engine.train(corpus(), ModelKind::Pattern).await.unwrap();

    let production = std::fs::read_dir(dir.path().join("production")).unwrap().count();
    assert_eq!(production, 0);
    assert!(engine.store().current_version().await.unwrap().is_none());
}

#[tokio::test]
async fn concurrent_train_is_rejected_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path()).await;

    let (first, second) = tokio::join!(
        engine.train(corpus(), ModelKind::Pattern),
        engine.train(corpus(), ModelKind::Pattern),
    );
    let first = first.expect("first run completes");
    assert_eq!(first.tool_coverage.len(), 6);
    assert!(matches!(
        second,
        Err(switchyard_core::SwitchyardError::TrainingBusy)
    ));

    // Once the first run is done the engine accepts work again.
    assert!(engine.train(corpus(), ModelKind::Pattern).await.is_ok());
}

#[tokio::test]
async fn foreign_lock_file_reports_busy() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path()).await;
    let _held = StagingLock::acquire(&dir.path().join("staging")).unwrap();

    let err = engine.train(corpus(), ModelKind::Pattern).await.unwrap_err();
    assert_eq!(err.kind(), "training_busy");
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn lock_left_by_crashed_trainer_is_recovered() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path()).await;
    let lock = dir.path().join("staging").join(switchyard_learning::lock::LOCK_FILE);
    let orphan = serde_json::json!({ "pid": 4_194_305u32, "acquired_at": Utc::now() });
    std::fs::write(&lock, orphan.to_string()).unwrap();

    let artifact = engine.train(corpus(), ModelKind::Pattern).await.unwrap();
    assert_eq!(artifact.tool_coverage.len(), 6);
    assert!(!lock.exists(), "lock released after the run");
}

#[tokio::test]
async fn empty_dataset_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path()).await;
    let err = engine.train(Vec::new(), ModelKind::Pattern).await.unwrap_err();
    assert_eq!(err.kind(), "invalid_input");
    assert!(!dir.path().join("staging/.train.lock").exists());
}

#[tokio::test]
async fn minimum_example_count_is_enforced() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::open(dir.path()).await.unwrap();
    let config = LearningConfig {
        min_examples: 200,
        ..LearningConfig::default()
    };
    let engine = LearningEngine::new(store, config);
    let err = engine.train(corpus(), ModelKind::Pattern).await.unwrap_err();
    assert_eq!(err.kind(), "invalid_input");
}

#[tokio::test]
async fn corrections_win_duplicate_queries() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine(dir.path()).await;
    let examples = vec![
        example("open the report".into(), "read_file", SourceKind::History, 500),
        example("Open the report!".into(), "query_erp", SourceKind::Correction, 1),
        example("send the memo".into(), "send_email", SourceKind::Synthetic, 1),
    ];

    let artifact = engine.train(examples, ModelKind::Pattern).await.unwrap();
    assert_eq!(artifact.example_count, 2);
    assert!(artifact.tool_coverage.contains("query_erp"));
    assert!(!artifact.tool_coverage.contains("read_file"));
}
