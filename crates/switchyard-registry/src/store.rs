// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk artifact areas.
//!
//! ```text
//! <root>/staging/<version>/{model.json,artifact.json}
//! <root>/validated/<version>/...
//! <root>/production/<version>/...
//! <root>/production/CURRENT
//! <root>/archive/<timestamp>-<version>/...
//! ```
//!
//! Artifact directories are assembled under a hidden temporary name and
//! renamed into place, so a directory that is visible is always complete.
//! The store itself holds no locks; lifecycle writers serialize above it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use switchyard_core::{ModelArtifact, Stage, SwitchyardError};
use switchyard_model::TrainedModel;
use tracing::debug;

use crate::sidecar::{checksum, Sidecar, MODEL_FILE, SIDECAR_FILE, SIDECAR_SCHEMA_VERSION};

const CURRENT_FILE: &str = "CURRENT";

/// A verified artifact: sidecar, decoded model, and the directory it came from.
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub dir: PathBuf,
    pub sidecar: Sidecar,
    pub model: TrainedModel,
}

impl StoredArtifact {
    pub fn artifact(&self) -> &ModelArtifact {
        &self.sidecar.artifact
    }
}

/// Filesystem layout of the four artifact areas.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self, SwitchyardError> {
        let store = Self { root: root.into() };
        for stage in [Stage::Staging, Stage::Validated, Stage::Production, Stage::Archived] {
            tokio::fs::create_dir_all(store.area(stage)).await?;
        }
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn area(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.area())
    }

    /// Write a complete artifact directory `<area>/<dir_name>`.
    ///
    /// The sidecar's stage and location are set from `stage` and the final
    /// directory so they can never disagree with where the files live.
    pub async fn write(
        &self,
        stage: Stage,
        dir_name: &str,
        mut sidecar: Sidecar,
        blob: &[u8],
    ) -> Result<PathBuf, SwitchyardError> {
        let area = self.area(stage);
        let dir = area.join(dir_name);
        if tokio::fs::try_exists(&dir).await? {
            return Err(SwitchyardError::InvalidInput(format!(
                "{} already exists",
                dir.display()
            )));
        }

        sidecar.artifact.stage = stage;
        sidecar.artifact.location = dir.clone();
        sidecar.blob_sha256 = checksum(blob);
        let sidecar_bytes = serde_json::to_vec_pretty(&sidecar)
            .map_err(|e| SwitchyardError::Internal(format!("failed to encode sidecar: {e}")))?;

        let tmp = area.join(format!(".tmp-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&tmp).await?;
        let written = async {
            tokio::fs::write(tmp.join(MODEL_FILE), blob).await?;
            tokio::fs::write(tmp.join(SIDECAR_FILE), &sidecar_bytes).await?;
            tokio::fs::rename(&tmp, &dir).await
        }
        .await;
        if let Err(e) = written {
            let _ = tokio::fs::remove_dir_all(&tmp).await;
            return Err(e.into());
        }

        debug!(stage = %stage, dir = %dir.display(), "artifact written");
        Ok(dir)
    }

    /// Read and verify the artifact in `dir`, which must belong to `expected`.
    pub async fn load(
        &self,
        dir: &Path,
        expected: Stage,
    ) -> Result<StoredArtifact, SwitchyardError> {
        let corrupt = |message: String| SwitchyardError::ArtifactCorrupt {
            location: dir.to_path_buf(),
            message,
        };

        let sidecar_bytes = read_required(&dir.join(SIDECAR_FILE), dir).await?;
        let mut sidecar: Sidecar = serde_json::from_slice(&sidecar_bytes)
            .map_err(|e| corrupt(format!("unreadable sidecar: {e}")))?;

        if sidecar.schema_version != SIDECAR_SCHEMA_VERSION {
            return Err(corrupt(format!(
                "sidecar schema {} is not supported (expected {SIDECAR_SCHEMA_VERSION})",
                sidecar.schema_version
            )));
        }
        if sidecar.artifact.stage != expected {
            return Err(corrupt(format!(
                "sidecar stage {} does not match area {}",
                sidecar.artifact.stage,
                expected.area()
            )));
        }
        let version = &sidecar.artifact.version;
        if !dir
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(version.as_str()))
        {
            return Err(corrupt(format!("directory does not hold version {version}")));
        }
        if matches!(expected, Stage::Validated | Stage::Production) {
            match &sidecar.report {
                Some(report) if report.passed() && report.artifact_version() == version => {}
                Some(_) => {
                    return Err(corrupt("embedded report does not approve this version".into()));
                }
                None => return Err(corrupt("validation report missing".into())),
            }
        }

        let blob = read_required(&dir.join(MODEL_FILE), dir).await?;
        let actual = checksum(&blob);
        if actual != sidecar.blob_sha256 {
            return Err(corrupt(format!(
                "checksum mismatch: sidecar {} blob {actual}",
                sidecar.blob_sha256
            )));
        }

        let model = TrainedModel::decode(&blob, &dir.join(MODEL_FILE))?;
        if model.kind() != sidecar.artifact.kind {
            return Err(corrupt(format!(
                "sidecar kind {} does not match model kind {}",
                sidecar.artifact.kind,
                model.kind()
            )));
        }
        if model.tool_coverage() != sidecar.artifact.tool_coverage {
            return Err(corrupt("tool coverage does not match the model".into()));
        }

        sidecar.artifact.location = dir.to_path_buf();
        Ok(StoredArtifact {
            dir: dir.to_path_buf(),
            sidecar,
            model,
        })
    }

    /// Find `version` in the staging, validated, or production area.
    pub async fn locate(&self, version: &str) -> Result<Option<(Stage, PathBuf)>, SwitchyardError> {
        if version.is_empty() || version.starts_with('.') || version.contains(['/', '\\']) {
            return Err(SwitchyardError::InvalidInput(format!(
                "invalid artifact version {version:?}"
            )));
        }
        for stage in [Stage::Production, Stage::Validated, Stage::Staging] {
            let dir = self.area(stage).join(version);
            if tokio::fs::try_exists(dir.join(SIDECAR_FILE)).await? {
                return Ok(Some((stage, dir)));
            }
        }
        Ok(None)
    }

    /// Version named by `production/CURRENT`, if any.
    pub async fn current_version(&self) -> Result<Option<String>, SwitchyardError> {
        match tokio::fs::read_to_string(self.current_pointer()).await {
            Ok(content) => {
                let version = content.trim();
                Ok((!version.is_empty()).then(|| version.to_string()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Atomically repoint `production/CURRENT` (write temp, then rename).
    pub async fn set_current(&self, version: &str) -> Result<(), SwitchyardError> {
        let pointer = self.current_pointer();
        let tmp = pointer.with_extension("tmp");
        tokio::fs::write(&tmp, format!("{version}\n")).await?;
        tokio::fs::rename(&tmp, &pointer).await?;
        Ok(())
    }

    /// Sidecars of every artifact directory in an area, ordered by directory name.
    ///
    /// Unreadable sidecars are skipped; use [`ArtifactStore::load`] for a verified read.
    pub async fn list(&self, stage: Stage) -> Result<Vec<(PathBuf, Sidecar)>, SwitchyardError> {
        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(self.area(stage)).await?;
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') || !entry.file_type().await?.is_dir() {
                continue;
            }
            let path = entry.path();
            let Ok(bytes) = tokio::fs::read(path.join(SIDECAR_FILE)).await else {
                continue;
            };
            match serde_json::from_slice::<Sidecar>(&bytes) {
                Ok(sidecar) => entries.push((path, sidecar)),
                Err(e) => debug!(dir = %path.display(), error = %e, "skipping unreadable sidecar"),
            }
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }

    pub async fn remove(&self, dir: &Path) -> Result<(), SwitchyardError> {
        tokio::fs::remove_dir_all(dir).await?;
        Ok(())
    }

    fn current_pointer(&self) -> PathBuf {
        self.area(Stage::Production).join(CURRENT_FILE)
    }
}

async fn read_required(path: &Path, dir: &Path) -> Result<Vec<u8>, SwitchyardError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(SwitchyardError::ArtifactCorrupt {
            location: dir.to_path_buf(),
            message: format!("missing {}", path.display()),
        }),
        Err(e) => Err(e.into()),
    }
}
