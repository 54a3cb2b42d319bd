// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-writer training into the staging area.

use chrono::Utc;
use switchyard_config::model::LearningConfig;
use switchyard_core::{ModelArtifact, ModelKind, Stage, SwitchyardError, TrainingExample};
use switchyard_model::{ClassifierModel, PatternModel, TrainedModel};
use switchyard_registry::{ArtifactStore, Sidecar};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::lock::StagingLock;

/// Trains candidate models. One run at a time per engine; a second caller is
/// turned away with `TrainingBusy` rather than queued.
pub struct LearningEngine {
    store: ArtifactStore,
    config: LearningConfig,
    in_flight: Mutex<()>,
}

impl LearningEngine {
    pub fn new(store: ArtifactStore, config: LearningConfig) -> Self {
        Self {
            store,
            config,
            in_flight: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Train `kind` on `examples` and write the result to the staging area.
    ///
    /// Examples sharing a normalized query are collapsed first (corrections
    /// win). Production is never touched.
    pub async fn train(
        &self,
        examples: Vec<TrainingExample>,
        kind: ModelKind,
    ) -> Result<ModelArtifact, SwitchyardError> {
        let _run = self
            .in_flight
            .try_lock()
            .map_err(|_| SwitchyardError::TrainingBusy)?;
        let _lock = StagingLock::acquire_in(self.store.area(Stage::Staging)).await?;

        let submitted = examples.len();
        let examples = switchyard_ingest::merge(examples);
        if examples.is_empty() || examples.len() < self.config.min_examples {
            return Err(SwitchyardError::InvalidInput(format!(
                "training needs at least {} distinct examples, got {}",
                self.config.min_examples.max(1),
                examples.len()
            )));
        }
        debug!(submitted, distinct = examples.len(), kind = %kind, "training started");

        let config = self.config.clone();
        let example_count = examples.len();
        let model = tokio::task::spawn_blocking(move || fit(&examples, kind, &config))
            .await
            .map_err(|e| SwitchyardError::Internal(format!("training task failed: {e}")))??;

        let version = new_version();
        let blob = model.encode()?;
        let artifact = ModelArtifact {
            version: version.clone(),
            stage: Stage::Staging,
            kind,
            location: Default::default(),
            created_at: Utc::now(),
            example_count,
            accuracy: None,
            tool_coverage: model.tool_coverage(),
        };
        let dir = self
            .store
            .write(Stage::Staging, &version, Sidecar::new(artifact, &blob), &blob)
            .await?;
        let staged = self.store.load(&dir, Stage::Staging).await?;

        info!(
            version = version.as_str(),
            kind = %kind,
            examples = example_count,
            tools = staged.artifact().tool_coverage.len(),
            "candidate written to staging"
        );
        Ok(staged.sidecar.artifact)
    }
}

fn fit(
    examples: &[TrainingExample],
    kind: ModelKind,
    config: &LearningConfig,
) -> Result<TrainedModel, SwitchyardError> {
    match kind {
        ModelKind::Pattern => PatternModel::fit(examples).map(TrainedModel::Pattern),
        ModelKind::Classifier => {
            ClassifierModel::fit(examples, config.smoothing, config.max_exemplars_per_tool)
                .map(TrainedModel::Classifier)
        }
    }
}

/// Sortable version id: UTC timestamp plus a short random suffix.
fn new_version() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().format("%Y%m%dT%H%M%S%3fZ"), &suffix[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_sort_by_creation_time() {
        let a = new_version();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = new_version();
        assert!(a < b, "{a} should sort before {b}");
        assert!(!a.contains(['/', '.']));
    }
}
