// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The uniform serialization contract shared by every model kind.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use switchyard_core::{Arguments, ModelKind, SwitchyardError};

use crate::classifier::ClassifierModel;
use crate::pattern::PatternModel;

/// Bumped whenever the blob layout changes incompatibly.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// A model's answer for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub tool: String,
    pub arguments: Arguments,
    pub confidence: f64,
}

/// Any trained model, tagged by kind in its serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainedModel {
    Pattern(PatternModel),
    Classifier(ClassifierModel),
}

#[derive(Serialize, Deserialize)]
struct ModelBlob {
    format_version: u32,
    model: TrainedModel,
}

impl TrainedModel {
    pub fn kind(&self) -> ModelKind {
        match self {
            TrainedModel::Pattern(_) => ModelKind::Pattern,
            TrainedModel::Classifier(_) => ModelKind::Classifier,
        }
    }

    pub fn tool_coverage(&self) -> BTreeSet<String> {
        match self {
            TrainedModel::Pattern(m) => m.tool_coverage(),
            TrainedModel::Classifier(m) => m.tool_coverage(),
        }
    }

    pub fn predict(&self, query: &str) -> Option<Prediction> {
        match self {
            TrainedModel::Pattern(m) => m.predict(query),
            TrainedModel::Classifier(m) => m.predict(query),
        }
    }

    /// Serialize into the `model.json` blob.
    pub fn encode(&self) -> Result<Vec<u8>, SwitchyardError> {
        let blob = ModelBlob {
            format_version: MODEL_FORMAT_VERSION,
            model: self.clone(),
        };
        serde_json::to_vec_pretty(&blob)
            .map_err(|e| SwitchyardError::Internal(format!("failed to encode model: {e}")))
    }

    /// Parse a `model.json` blob read from `location`.
    pub fn decode(bytes: &[u8], location: &Path) -> Result<Self, SwitchyardError> {
        let blob: ModelBlob =
            serde_json::from_slice(bytes).map_err(|e| SwitchyardError::ArtifactCorrupt {
                location: location.to_path_buf(),
                message: format!("unreadable model blob: {e}"),
            })?;
        if blob.format_version != MODEL_FORMAT_VERSION {
            return Err(SwitchyardError::ArtifactCorrupt {
                location: location.to_path_buf(),
                message: format!(
                    "model format {} is not supported (expected {MODEL_FORMAT_VERSION})",
                    blob.format_version
                ),
            });
        }
        Ok(blob.model)
    }
}
