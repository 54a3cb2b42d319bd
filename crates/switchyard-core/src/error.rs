// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Switchyard routing engine.
//!
//! The serving path (`Router::resolve`) never surfaces these: tier failures are
//! folded into the returned `RoutingResult`. Operator-path operations (train,
//! validate, promote, rollback) return them directly.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::{Stage, TierId};

/// The primary error type used across all Switchyard components.
#[derive(Debug, Error)]
pub enum SwitchyardError {
    /// A tier cannot serve right now (no model installed, backend unreachable).
    #[error("tier {tier} unavailable: {message}")]
    TierUnavailable { tier: TierId, message: String },

    /// A tier attempt exceeded its time budget.
    #[error("tier {tier} timed out after {duration:?}")]
    TierTimeout { tier: TierId, duration: Duration },

    /// A tier produced output that could not be interpreted as a decision.
    #[error("tier {tier} produced malformed output: {message}")]
    ParseError { tier: TierId, message: String },

    /// A validation report did not pass its gate.
    #[error("{version} failed validation: accuracy {accuracy:.3}, p99 {p99_latency_ms:.2}ms")]
    ValidationFailed {
        version: String,
        accuracy: f64,
        p99_latency_ms: f64,
    },

    /// Another training run holds the staging area.
    #[error("a training run is already in progress")]
    TrainingBusy,

    /// Rollback was requested with nothing eligible in the archive.
    #[error("no archived artifact available for rollback")]
    NoArchiveAvailable,

    /// An artifact's blob and sidecar disagree, or the sidecar is unreadable.
    #[error("artifact at {} is corrupt: {message}", location.display())]
    ArtifactCorrupt { location: PathBuf, message: String },

    /// A lifecycle transition was requested from the wrong stage.
    #[error("artifact {version} is {actual}, expected {expected}")]
    InvalidStage {
        version: String,
        expected: Stage,
        actual: Stage,
    },

    /// Caller-supplied input was rejected (empty dataset, bad thresholds).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Filesystem errors from the artifact store or dataset files.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SwitchyardError {
    /// Wrap any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        SwitchyardError::Storage {
            source: source.into(),
        }
    }

    /// Short machine-readable kind, used for metric labels and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            SwitchyardError::TierUnavailable { .. } => "tier_unavailable",
            SwitchyardError::TierTimeout { .. } => "tier_timeout",
            SwitchyardError::ParseError { .. } => "parse_error",
            SwitchyardError::ValidationFailed { .. } => "validation_failed",
            SwitchyardError::TrainingBusy => "training_busy",
            SwitchyardError::NoArchiveAvailable => "no_archive_available",
            SwitchyardError::ArtifactCorrupt { .. } => "artifact_corrupt",
            SwitchyardError::InvalidStage { .. } => "invalid_stage",
            SwitchyardError::InvalidInput(_) => "invalid_input",
            SwitchyardError::Storage { .. } => "storage",
            SwitchyardError::Config(_) => "config",
            SwitchyardError::Internal(_) => "internal",
        }
    }
}

impl From<std::io::Error> for SwitchyardError {
    fn from(err: std::io::Error) -> Self {
        SwitchyardError::storage(err)
    }
}
