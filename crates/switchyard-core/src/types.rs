// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data model shared by every Switchyard component.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Tool arguments: a string-keyed map of JSON values, ordered for stable output.
pub type Arguments = BTreeMap<String, serde_json::Value>;

/// Identifies one resolution strategy in the router's fallback chain.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TierId {
    /// Local inference server behind a completion backend.
    Embedded,
    /// The trained artifact currently in production (pattern or classifier).
    Pattern,
    /// Hosted assistant behind a completion backend.
    Remote,
    /// Keyword and regex rules; always last in the default order.
    Fallback,
}

impl TierId {
    /// Default priority order used when configuration does not override it.
    pub const DEFAULT_ORDER: [TierId; 4] = [
        TierId::Embedded,
        TierId::Pattern,
        TierId::Remote,
        TierId::Fallback,
    ];
}

/// A natural-language request to be mapped onto a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingRequest {
    pub query: String,
    #[serde(default)]
    pub context: Option<String>,
    /// Restrict resolution to a single tier.
    #[serde(default)]
    pub pinned_tier: Option<TierId>,
}

impl RoutingRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            context: None,
            pinned_tier: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn pinned(mut self, tier: TierId) -> Self {
        self.pinned_tier = Some(tier);
        self
    }
}

/// The router's answer to a `RoutingRequest`.
///
/// Always well-formed: either `tool_name` is set, or `error` is set and
/// `confidence` is zero. Construct through [`RoutingResult::decided`] or
/// [`RoutingResult::failed`] to keep that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingResult {
    pub tool_name: Option<String>,
    pub arguments: Arguments,
    pub confidence: f64,
    pub latency_ms: f64,
    pub tier: TierId,
    pub error: Option<String>,
}

impl RoutingResult {
    /// A successful decision. Confidence is clamped to `[0.0, 1.0]`.
    pub fn decided(
        tier: TierId,
        tool_name: impl Into<String>,
        arguments: Arguments,
        confidence: f64,
        latency_ms: f64,
    ) -> Self {
        Self {
            tool_name: Some(tool_name.into()),
            arguments,
            confidence: clamp_confidence(confidence),
            latency_ms,
            tier,
            error: None,
        }
    }

    /// A failed resolution: no tool, zero confidence, error populated.
    pub fn failed(tier: TierId, error: impl Into<String>, latency_ms: f64) -> Self {
        Self {
            tool_name: None,
            arguments: Arguments::new(),
            confidence: 0.0,
            latency_ms,
            tier,
            error: Some(error.into()),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.tool_name.is_some()
    }
}

/// Clamp a confidence value into `[0.0, 1.0]`, mapping NaN to zero.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Where a training example came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Mined from execution history.
    History,
    /// Expanded from a synthetic template.
    Synthetic,
    /// Entered by a human reviewer.
    Correction,
}

impl SourceKind {
    /// Higher wins when two examples share a normalized query.
    pub fn precedence(self) -> u8 {
        match self {
            SourceKind::Correction => 2,
            SourceKind::History => 1,
            SourceKind::Synthetic => 0,
        }
    }
}

/// Provenance of a training example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub source: SourceKind,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction_id: Option<String>,
}

/// A canonical (query, expected tool call) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub query: String,
    pub expected_tool: String,
    #[serde(default)]
    pub expected_arguments: Arguments,
    pub provenance: Provenance,
}

impl TrainingExample {
    /// True if `self` should replace `other` when both share a normalized query.
    pub fn supersedes(&self, other: &TrainingExample) -> bool {
        let mine = self.provenance.source.precedence();
        let theirs = other.provenance.source.precedence();
        mine > theirs || (mine == theirs && self.provenance.timestamp > other.provenance.timestamp)
    }
}

/// Which learner produced an artifact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Per-tool lookup of normalized example queries.
    Pattern,
    /// Naive Bayes over bag-of-words vectors.
    Classifier,
}

/// Lifecycle stage of a model artifact.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Staging,
    Validated,
    Production,
    Archived,
}

impl Stage {
    /// Directory name of the artifact area holding this stage.
    pub fn area(self) -> &'static str {
        match self {
            Stage::Staging => "staging",
            Stage::Validated => "validated",
            Stage::Production => "production",
            Stage::Archived => "archive",
        }
    }
}

/// A trained, versioned, stage-tagged model snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: String,
    pub stage: Stage,
    pub kind: ModelKind,
    /// Directory holding `model.json` and the `artifact.json` sidecar.
    pub location: PathBuf,
    pub created_at: DateTime<Utc>,
    pub example_count: usize,
    /// Accuracy from the validation report; `None` until validated.
    #[serde(default)]
    pub accuracy: Option<f64>,
    pub tool_coverage: BTreeSet<String>,
}
