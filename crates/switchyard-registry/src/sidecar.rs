// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The versioned `artifact.json` metadata written next to every model blob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use strum::Display;
use switchyard_core::{ModelArtifact, ValidationReport};

/// Bumped whenever the sidecar layout changes incompatibly.
pub const SIDECAR_SCHEMA_VERSION: u32 = 1;

pub const MODEL_FILE: &str = "model.json";
pub const SIDECAR_FILE: &str = "artifact.json";

/// Why an artifact left production.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ArchiveReason {
    /// Displaced by a newer promotion; eligible for rollback.
    Superseded,
    /// Displaced by a rollback; never rolled back to automatically.
    RolledBack,
}

/// Everything known about one artifact directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sidecar {
    pub schema_version: u32,
    pub artifact: ModelArtifact,
    /// Present once the artifact has passed validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<ValidationReport>,
    /// Hex SHA-256 of `model.json`.
    pub blob_sha256: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_reason: Option<ArchiveReason>,
}

impl Sidecar {
    pub fn new(artifact: ModelArtifact, blob: &[u8]) -> Self {
        Self {
            schema_version: SIDECAR_SCHEMA_VERSION,
            artifact,
            report: None,
            blob_sha256: checksum(blob),
            archived_at: None,
            archive_reason: None,
        }
    }
}

pub fn checksum(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
