// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use switchyard_config::model::TierSettings;
use switchyard_core::{
    ModelArtifact, Observation, ResolutionTier, RoutingRequest, SwitchyardError, ToolCatalog,
    TrainingExample, ValidationReport, ValidationThresholds,
};
use switchyard_model::TrainedModel;
use switchyard_registry::ArtifactStore;
use switchyard_router::{Router, TrainedTier};
use tracing::{debug, info};

/// Per-attempt budget while replaying. Large enough that a timeout never
/// turns a correct prediction into a miss.
const REPLAY_TIMEOUT_MS: u64 = 30_000;

/// Scores candidate artifacts against held-out examples.
///
/// Read-only: artifacts are loaded and verified from the store but never
/// moved or rewritten, so several validations may run at once.
#[derive(Debug, Clone)]
pub struct Validator {
    store: ArtifactStore,
    settings: TierSettings,
}

impl Validator {
    pub fn new(store: ArtifactStore) -> Self {
        Self {
            store,
            settings: TierSettings {
                enabled: true,
                min_confidence: 0.0,
                timeout_ms: REPLAY_TIMEOUT_MS,
            },
        }
    }

    /// Override the replay tier's settings (mainly the timeout).
    pub fn with_settings(mut self, settings: TierSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Load `artifact` from the store and replay `held_out` through it.
    pub async fn validate(
        &self,
        artifact: &ModelArtifact,
        held_out: &[TrainingExample],
        thresholds: ValidationThresholds,
    ) -> Result<ValidationReport, SwitchyardError> {
        thresholds.check()?;
        let version = artifact.version.as_str();
        let (stage, dir) = self.store.locate(version).await?.ok_or_else(|| {
            SwitchyardError::InvalidInput(format!("artifact {version} not found"))
        })?;
        let stored = self.store.load(&dir, stage).await?;
        debug!(version, stage = %stage, "loaded candidate for validation");

        self.validate_model(version, stored.model, held_out, thresholds)
            .await
    }

    /// Replay `held_out` through an in-memory model.
    pub async fn validate_model(
        &self,
        version: &str,
        model: TrainedModel,
        held_out: &[TrainingExample],
        thresholds: ValidationThresholds,
    ) -> Result<ValidationReport, SwitchyardError> {
        let tier = Arc::new(TrainedTier::pinned(version, model));
        self.validate_tier(version, tier, held_out, thresholds).await
    }

    /// Replay `held_out` through any tier, pinned as the only candidate.
    pub async fn validate_tier(
        &self,
        version: &str,
        tier: Arc<dyn ResolutionTier>,
        held_out: &[TrainingExample],
        thresholds: ValidationThresholds,
    ) -> Result<ValidationReport, SwitchyardError> {
        thresholds.check()?;
        if held_out.is_empty() {
            return Err(SwitchyardError::InvalidInput(
                "held-out set must contain at least one example".into(),
            ));
        }

        let observations = replay(tier, self.settings.clone(), held_out).await;
        let report = ValidationReport::score(version, &observations, thresholds)?;

        info!(
            version,
            samples = report.sample_count(),
            accuracy = report.accuracy(),
            p99_latency_ms = report.p99_latency_ms(),
            passed = report.passed(),
            "validation complete"
        );
        Ok(report)
    }
}

/// Run every example through a router holding only `tier` and record what
/// it predicted and how long each request took.
pub async fn replay(
    tier: Arc<dyn ResolutionTier>,
    settings: TierSettings,
    held_out: &[TrainingExample],
) -> Vec<Observation> {
    let pinned = tier.id();
    let mut router = Router::new(ToolCatalog::new());
    router.push_tier(tier, settings);

    let mut observations = Vec::with_capacity(held_out.len());
    for example in held_out {
        let request = RoutingRequest::new(example.query.as_str()).pinned(pinned);
        let result = router.resolve(&request).await;
        observations.push(Observation {
            expected_tool: example.expected_tool.clone(),
            predicted_tool: result.tool_name,
            latency_ms: result.latency_ms,
        });
    }
    observations
}
