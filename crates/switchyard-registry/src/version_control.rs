// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The artifact lifecycle state machine.
//!
//! ```text
//! STAGING --promote_to_validated(report.passed)--> VALIDATED
//! VALIDATED --promote_to_production--> PRODUCTION --(displaced)--> ARCHIVED
//! ARCHIVED --rollback--> PRODUCTION
//! ```
//!
//! Every transition takes the writer lock for its whole duration, so two
//! promotions (or a promotion and a rollback) never interleave. Readers go
//! through the serving slot and never wait on the lock.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use switchyard_core::recording::record_promotion;
use switchyard_core::{ModelArtifact, Stage, SwitchyardError, ValidationReport};
use switchyard_model::{ServingModel, ServingSlot};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::sidecar::{ArchiveReason, Sidecar};
use crate::store::{ArtifactStore, StoredArtifact};

/// One entry of the archive area.
#[derive(Debug, Clone, Serialize)]
pub struct ArchivedArtifact {
    pub artifact: ModelArtifact,
    pub archived_at: Option<DateTime<Utc>>,
    pub reason: Option<ArchiveReason>,
}

/// Snapshot of every area, for `status` output.
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStatus {
    pub production: Option<ModelArtifact>,
    pub validated: Vec<ModelArtifact>,
    pub staging: Vec<ModelArtifact>,
    pub archive: Vec<ArchivedArtifact>,
}

/// Promotes and rolls back artifacts; the single writer of the serving slot.
pub struct VersionControl {
    store: ArtifactStore,
    slot: ServingSlot,
    retention: usize,
    writer: Mutex<()>,
}

impl VersionControl {
    /// Open version control over `store`, installing the current production
    /// artifact (if any) into `slot`.
    pub async fn open(
        store: ArtifactStore,
        slot: ServingSlot,
        retention: usize,
    ) -> Result<Self, SwitchyardError> {
        if retention == 0 {
            return Err(SwitchyardError::InvalidInput(
                "archive retention must be at least 1".into(),
            ));
        }

        if let Some(version) = store.current_version().await? {
            let dir = store.area(Stage::Production).join(&version);
            let stored = store.load(&dir, Stage::Production).await?;
            info!(version = version.as_str(), "production artifact loaded");
            slot.store(Some(Arc::new(serving(stored))));
        }

        Ok(Self {
            store,
            slot,
            retention,
            writer: Mutex::new(()),
        })
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// The slot the router's trained tier reads from.
    pub fn slot(&self) -> ServingSlot {
        Arc::clone(&self.slot)
    }

    /// The artifact currently serving, as seen by readers.
    pub fn production(&self) -> Option<ModelArtifact> {
        self.slot.load_full().map(|s| s.artifact.clone())
    }

    /// STAGING -> VALIDATED. Requires a passing report for this artifact.
    ///
    /// The staging copy stays in place; the validated copy embeds the report.
    pub async fn promote_to_validated(
        &self,
        artifact: &ModelArtifact,
        report: &ValidationReport,
    ) -> Result<ModelArtifact, SwitchyardError> {
        let _guard = self.writer.lock().await;
        let version = artifact.version.as_str();

        if report.artifact_version() != version {
            return Err(SwitchyardError::InvalidInput(format!(
                "report is for {}, not {version}",
                report.artifact_version()
            )));
        }
        if !report.passed() {
            warn!(
                version,
                accuracy = report.accuracy(),
                p99_latency_ms = report.p99_latency_ms(),
                "validation gate rejected artifact"
            );
            return Err(SwitchyardError::ValidationFailed {
                version: version.to_string(),
                accuracy: report.accuracy(),
                p99_latency_ms: report.p99_latency_ms(),
            });
        }

        let stored = self.expect_stage(version, Stage::Staging).await?;
        let blob = stored.model.encode()?;
        let mut sidecar = Sidecar::new(stored.sidecar.artifact.clone(), &blob);
        sidecar.artifact.accuracy = Some(report.accuracy());
        sidecar.report = Some(report.clone());

        let dir = self
            .store
            .write(Stage::Validated, version, sidecar, &blob)
            .await?;
        let promoted = self.store.load(&dir, Stage::Validated).await?;

        record_promotion("validated");
        info!(version, accuracy = report.accuracy(), "artifact validated");
        Ok(promoted.sidecar.artifact)
    }

    /// VALIDATED -> PRODUCTION, archiving whatever was serving before.
    pub async fn promote_to_production(
        &self,
        artifact: &ModelArtifact,
    ) -> Result<ModelArtifact, SwitchyardError> {
        let _guard = self.writer.lock().await;
        let version = artifact.version.as_str();

        if artifact.stage != Stage::Validated {
            return Err(SwitchyardError::InvalidStage {
                version: version.to_string(),
                expected: Stage::Validated,
                actual: artifact.stage,
            });
        }
        let stored = self.expect_stage(version, Stage::Validated).await?;
        let installed = self.install(stored, ArchiveReason::Superseded).await?;

        record_promotion("production");
        info!(version, "artifact promoted to production");
        Ok(installed)
    }

    /// Reinstall the most recent superseded artifact without re-validation.
    ///
    /// The displaced production artifact is archived as rolled back, so a
    /// second rollback walks further back instead of undoing the first.
    pub async fn rollback(&self) -> Result<ModelArtifact, SwitchyardError> {
        let _guard = self.writer.lock().await;

        let archive = self.store.list(Stage::Archived).await?;
        let (dir, _) = archive
            .into_iter()
            .rev()
            .find(|(_, sidecar)| sidecar.archive_reason == Some(ArchiveReason::Superseded))
            .ok_or(SwitchyardError::NoArchiveAvailable)?;

        let stored = self.store.load(&dir, Stage::Archived).await?;
        let version = stored.sidecar.artifact.version.clone();
        let installed = self.install(stored, ArchiveReason::RolledBack).await?;

        record_promotion("rollback");
        info!(version = version.as_str(), "rolled back production");
        Ok(installed)
    }

    /// Areas and their artifacts.
    pub async fn status(&self) -> Result<RegistryStatus, SwitchyardError> {
        let artifacts = |entries: Vec<(PathBuf, Sidecar)>| -> Vec<ModelArtifact> {
            entries.into_iter().map(|(_, s)| s.artifact).collect()
        };
        let archive = self
            .store
            .list(Stage::Archived)
            .await?
            .into_iter()
            .map(|(_, s)| ArchivedArtifact {
                artifact: s.artifact,
                archived_at: s.archived_at,
                reason: s.archive_reason,
            })
            .collect();

        Ok(RegistryStatus {
            production: self.production(),
            validated: artifacts(self.store.list(Stage::Validated).await?),
            staging: artifacts(self.store.list(Stage::Staging).await?),
            archive,
        })
    }

    /// Install `stored` as production, archiving the displaced artifact with
    /// `displaced_reason`. The directory `stored` was loaded from is retired
    /// once production has moved.
    ///
    /// Everything that can fail runs before `CURRENT` moves: the displaced
    /// artifact is verified and copied into the archive, and the new
    /// production directory is written and reloaded. A failure up to and
    /// including the pointer swap removes what was written. After the swap
    /// only cleanup remains, and cleanup failures are logged, not returned.
    async fn install(
        &self,
        stored: StoredArtifact,
        displaced_reason: ArchiveReason,
    ) -> Result<ModelArtifact, SwitchyardError> {
        let version = stored.sidecar.artifact.version.clone();
        let previous = self.store.current_version().await?;
        if previous.as_deref() == Some(version.as_str()) {
            return Err(SwitchyardError::InvalidStage {
                version,
                expected: stored.sidecar.artifact.stage,
                actual: Stage::Production,
            });
        }

        let displaced = match &previous {
            Some(previous) => {
                let dir = self.store.area(Stage::Production).join(previous);
                Some(self.store.load(&dir, Stage::Production).await?)
            }
            None => None,
        };

        let mut written = Vec::new();
        let staged = self
            .stage_install(&stored, displaced.as_ref(), displaced_reason, &mut written)
            .await;
        let live = match staged {
            Ok(live) => live,
            Err(e) => {
                self.discard(&written).await;
                return Err(e);
            }
        };

        let artifact = live.sidecar.artifact.clone();
        self.slot.store(Some(Arc::new(serving(live))));

        if let Some(displaced) = displaced {
            let version = displaced.sidecar.artifact.version.as_str();
            info!(version, reason = %displaced_reason, "artifact archived");
            self.cleanup(&displaced.dir).await;
        }
        self.cleanup(&stored.dir).await;
        if let Err(e) = self.prune().await {
            warn!(error = %e, "archive pruning failed");
        }
        Ok(artifact)
    }

    /// The fallible half of [`install`](Self::install), ending with the
    /// `CURRENT` swap. Every directory it creates is pushed onto `written`.
    async fn stage_install(
        &self,
        stored: &StoredArtifact,
        displaced: Option<&StoredArtifact>,
        displaced_reason: ArchiveReason,
        written: &mut Vec<PathBuf>,
    ) -> Result<StoredArtifact, SwitchyardError> {
        let version = stored.sidecar.artifact.version.as_str();

        if let Some(displaced) = displaced {
            written.push(self.archive(displaced, displaced_reason).await?);
        }

        let blob = stored.model.encode()?;
        let mut sidecar = Sidecar::new(stored.sidecar.artifact.clone(), &blob);
        sidecar.report = stored.sidecar.report.clone();
        let dir = self
            .store
            .write(Stage::Production, version, sidecar, &blob)
            .await?;
        written.push(dir.clone());

        let live = self.store.load(&dir, Stage::Production).await?;
        self.store.set_current(version).await?;
        Ok(live)
    }

    /// Copy `stored` into the archive area and return the new directory.
    async fn archive(
        &self,
        stored: &StoredArtifact,
        reason: ArchiveReason,
    ) -> Result<PathBuf, SwitchyardError> {
        let version = stored.sidecar.artifact.version.as_str();
        let now = Utc::now();
        let blob = stored.model.encode()?;
        let mut sidecar = Sidecar::new(stored.sidecar.artifact.clone(), &blob);
        sidecar.report = stored.sidecar.report.clone();
        sidecar.archived_at = Some(now);
        sidecar.archive_reason = Some(reason);

        let name = format!("{}-{version}", now.format("%Y%m%dT%H%M%S%.6fZ"));
        self.store
            .write(Stage::Archived, &name, sidecar, &blob)
            .await
    }

    /// Remove directories from a transition that did not complete.
    async fn discard(&self, dirs: &[PathBuf]) {
        for dir in dirs.iter().rev() {
            if let Err(e) = self.store.remove(dir).await {
                warn!(dir = %dir.display(), error = %e, "failed to remove partial artifact");
            }
        }
    }

    /// Remove a directory the committed transition no longer needs.
    async fn cleanup(&self, dir: &Path) {
        if let Err(e) = self.store.remove(dir).await {
            warn!(dir = %dir.display(), error = %e, "stale artifact directory left behind");
        }
    }

    /// Drop the oldest archive entries beyond the retention count.
    async fn prune(&self) -> Result<(), SwitchyardError> {
        let entries = self.store.list(Stage::Archived).await?;
        let excess = entries.len().saturating_sub(self.retention);
        for (dir, sidecar) in entries.into_iter().take(excess) {
            self.store.remove(&dir).await?;
            info!(version = sidecar.artifact.version.as_str(), "pruned archived artifact");
        }
        Ok(())
    }

    /// Load `version` from the area of `expected`, or explain where it actually is.
    async fn expect_stage(
        &self,
        version: &str,
        expected: Stage,
    ) -> Result<StoredArtifact, SwitchyardError> {
        match self.store.locate(version).await? {
            Some((stage, dir)) if stage == expected => self.store.load(&dir, expected).await,
            Some((stage, _)) => Err(SwitchyardError::InvalidStage {
                version: version.to_string(),
                expected,
                actual: stage,
            }),
            None => Err(SwitchyardError::InvalidInput(format!(
                "no artifact with version {version}"
            ))),
        }
    }
}

fn serving(stored: StoredArtifact) -> ServingModel {
    ServingModel {
        artifact: stored.sidecar.artifact,
        model: stored.model,
    }
}
