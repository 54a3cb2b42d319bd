// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lifecycle harness for end-to-end tests.
//!
//! `TestHarness` assembles the full pipeline over a temporary artifact root:
//! learning engine, validator, version control, and a router built from
//! configuration that serves whatever version control installs.

use std::path::PathBuf;
use std::sync::Arc;

use switchyard_config::model::{LearningConfig, SwitchyardConfig};
use switchyard_core::{
    ModelArtifact, ModelKind, RoutingRequest, RoutingResult, SwitchyardError, TrainingExample,
    ValidationReport, ValidationThresholds,
};
use switchyard_learning::LearningEngine;
use switchyard_model::empty_slot;
use switchyard_registry::{ArtifactStore, VersionControl};
use switchyard_router::{build_router, Router};
use switchyard_validator::Validator;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: SwitchyardConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: SwitchyardConfig::default(),
        }
    }

    /// Archive entries kept after promotions.
    pub fn with_retention(mut self, retention: usize) -> Self {
        self.config.registry.archive_retention = retention;
        self
    }

    pub fn with_learning(mut self, learning: LearningConfig) -> Self {
        self.config.learning = learning;
        self
    }

    /// Start from `config`. The registry root is always replaced by a temp dir.
    pub fn with_config(mut self, config: SwitchyardConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn build(mut self) -> Result<TestHarness, SwitchyardError> {
        let temp_dir = tempfile::TempDir::new()?;
        let root = temp_dir.path().join("artifacts");
        self.config.registry.root = root.display().to_string();

        let store = ArtifactStore::open(&root).await?;
        let version_control = Arc::new(
            VersionControl::open(
                store.clone(),
                empty_slot(),
                self.config.registry.archive_retention,
            )
            .await?,
        );
        let engine = Arc::new(LearningEngine::new(
            store.clone(),
            self.config.learning.clone(),
        ));
        let validator = Validator::new(store.clone());
        let router = Arc::new(build_router(&self.config, version_control.slot())?);

        Ok(TestHarness {
            root,
            store,
            engine,
            validator,
            version_control,
            router,
            config: self.config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete lifecycle environment with temp storage.
pub struct TestHarness {
    /// Artifact root inside the temp dir.
    pub root: PathBuf,
    pub store: ArtifactStore,
    pub engine: Arc<LearningEngine>,
    pub validator: Validator,
    pub version_control: Arc<VersionControl>,
    /// Router serving the version-control slot.
    pub router: Arc<Router>,
    pub config: SwitchyardConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub async fn train(
        &self,
        examples: Vec<TrainingExample>,
        kind: ModelKind,
    ) -> Result<ModelArtifact, SwitchyardError> {
        self.engine.train(examples, kind).await
    }

    pub async fn validate(
        &self,
        artifact: &ModelArtifact,
        held_out: &[TrainingExample],
        thresholds: ValidationThresholds,
    ) -> Result<ValidationReport, SwitchyardError> {
        self.validator.validate(artifact, held_out, thresholds).await
    }

    /// Train, validate against the training set, and promote to production.
    pub async fn ship(
        &self,
        examples: Vec<TrainingExample>,
        kind: ModelKind,
    ) -> Result<ModelArtifact, SwitchyardError> {
        let held_out = examples.clone();
        let candidate = self.train(examples, kind).await?;
        let report = self
            .validate(&candidate, &held_out, ValidationThresholds::new(0.0, 60_000.0)?)
            .await?;
        let validated = self
            .version_control
            .promote_to_validated(&candidate, &report)
            .await?;
        self.version_control.promote_to_production(&validated).await
    }

    pub async fn resolve(&self, query: &str) -> RoutingResult {
        self.router.resolve(&RoutingRequest::new(query)).await
    }

    /// Version control reopened over the same root, as after a restart.
    pub async fn reopen(&self) -> Result<VersionControl, SwitchyardError> {
        VersionControl::open(
            ArtifactStore::open(&self.root).await?,
            empty_slot(),
            self.config.registry.archive_retention,
        )
        .await
    }
}
