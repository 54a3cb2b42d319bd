// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Switchyard routing engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use switchyard_core::{ModelKind, TierId, ToolCatalog, ToolSpec};

/// Top-level Switchyard configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchyardConfig {
    /// Tier order and per-tier floors and timeouts.
    #[serde(default)]
    pub router: RouterConfig,

    /// Local inference server backing the embedded tier.
    #[serde(default = "default_embedded")]
    pub embedded: CompletionConfig,

    /// Hosted assistant backing the remote tier.
    #[serde(default)]
    pub remote: CompletionConfig,

    /// Keyword rules for the last-resort tier.
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Tools a decision may name.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Learning engine settings.
    #[serde(default)]
    pub learning: LearningConfig,

    /// Held-out split settings.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Artifact store settings.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SwitchyardConfig {
    fn default() -> Self {
        Self {
            router: RouterConfig::default(),
            embedded: default_embedded(),
            remote: CompletionConfig::default(),
            fallback: FallbackConfig::default(),
            catalog: CatalogConfig::default(),
            learning: LearningConfig::default(),
            dataset: DatasetConfig::default(),
            registry: RegistryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Router chain configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Tiers in priority order. Tiers not listed are never consulted.
    #[serde(default = "default_tier_order")]
    pub tier_order: Vec<TierId>,

    /// Per-tier policies.
    #[serde(default)]
    pub tiers: TierTable,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            tier_order: default_tier_order(),
            tiers: TierTable::default(),
        }
    }
}

fn default_tier_order() -> Vec<TierId> {
    TierId::DEFAULT_ORDER.to_vec()
}

/// Policy for each known tier, one table per tier id.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TierTable {
    #[serde(default = "default_embedded_tier")]
    pub embedded: TierSettings,
    #[serde(default = "default_pattern_tier")]
    pub pattern: TierSettings,
    #[serde(default = "default_remote_tier")]
    pub remote: TierSettings,
    #[serde(default = "default_fallback_tier")]
    pub fallback: TierSettings,
}

impl TierTable {
    pub fn get(&self, tier: TierId) -> &TierSettings {
        match tier {
            TierId::Embedded => &self.embedded,
            TierId::Pattern => &self.pattern,
            TierId::Remote => &self.remote,
            TierId::Fallback => &self.fallback,
        }
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self {
            embedded: default_embedded_tier(),
            pattern: default_pattern_tier(),
            remote: default_remote_tier(),
            fallback: default_fallback_tier(),
        }
    }
}

/// Floor and time budget for one tier.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TierSettings {
    /// Disabled tiers are skipped even when listed in `tier_order`.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// A decision below this confidence falls through to the next tier.
    pub min_confidence: f64,

    /// Upper bound on one attempt, in milliseconds.
    pub timeout_ms: u64,
}

impl TierSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

fn default_true() -> bool {
    true
}

fn default_embedded_tier() -> TierSettings {
    TierSettings {
        enabled: true,
        min_confidence: 0.7,
        timeout_ms: 2_000,
    }
}

fn default_pattern_tier() -> TierSettings {
    TierSettings {
        enabled: true,
        min_confidence: 0.6,
        timeout_ms: 100,
    }
}

fn default_remote_tier() -> TierSettings {
    TierSettings {
        enabled: true,
        min_confidence: 0.6,
        timeout_ms: 10_000,
    }
}

fn default_fallback_tier() -> TierSettings {
    TierSettings {
        enabled: true,
        min_confidence: 0.0,
        timeout_ms: 100,
    }
}

/// Endpoint settings for a completion-backed tier.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CompletionConfig {
    /// Base URL of an OpenAI-compatible server. `None` disables the tier.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Model name sent with each request.
    #[serde(default = "default_completion_model")]
    pub model: String,

    /// Bearer token. `None` sends no Authorization header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// HTTP client timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: default_completion_model(),
            api_key: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

fn default_embedded() -> CompletionConfig {
    CompletionConfig {
        model: "local".to_string(),
        ..CompletionConfig::default()
    }
}

fn default_completion_model() -> String {
    "default".to_string()
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

/// Last-resort keyword tier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FallbackConfig {
    /// Tool returned when no rule matches. `None` means decline.
    #[serde(default)]
    pub default_tool: Option<String>,

    /// Confidence reported for `default_tool`.
    #[serde(default = "default_fallback_confidence")]
    pub confidence: f64,

    /// Confidence reported when a keyword rule matches.
    #[serde(default = "default_match_confidence")]
    pub match_confidence: f64,

    /// Rules evaluated in order; first match wins.
    #[serde(default)]
    pub rules: Vec<KeywordRuleConfig>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            default_tool: None,
            confidence: default_fallback_confidence(),
            match_confidence: default_match_confidence(),
            rules: Vec::new(),
        }
    }
}

fn default_fallback_confidence() -> f64 {
    0.3
}

fn default_match_confidence() -> f64 {
    0.45
}

/// A single keyword rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KeywordRuleConfig {
    pub tool: String,

    /// Phrases matched against the normalized query.
    pub keywords: Vec<String>,

    /// Argument name -> regex with a named capture `value`.
    #[serde(default)]
    pub arguments: BTreeMap<String, String>,
}

/// Tool catalog configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    #[serde(default)]
    pub tools: Vec<ToolConfig>,
}

impl CatalogConfig {
    pub fn to_catalog(&self) -> ToolCatalog {
        ToolCatalog::from_specs(self.tools.iter().map(|tool| {
            (
                tool.name.clone(),
                ToolSpec {
                    description: tool.description.clone(),
                    required_args: tool.required_args.clone(),
                },
            )
        }))
    }
}

/// One `[[catalog.tools]]` entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_args: Vec<String>,
}

/// Learning engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LearningConfig {
    /// Model kind used when the caller does not choose one.
    #[serde(default = "default_model_kind")]
    pub default_kind: ModelKind,

    /// Laplace smoothing for the classifier.
    #[serde(default = "default_smoothing")]
    pub smoothing: f64,

    /// Refuse to train on fewer examples than this.
    #[serde(default = "default_min_examples")]
    pub min_examples: usize,

    /// Exemplars kept per tool for argument extraction in the classifier.
    #[serde(default = "default_max_exemplars")]
    pub max_exemplars_per_tool: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            default_kind: default_model_kind(),
            smoothing: default_smoothing(),
            min_examples: default_min_examples(),
            max_exemplars_per_tool: default_max_exemplars(),
        }
    }
}

fn default_model_kind() -> ModelKind {
    ModelKind::Pattern
}

fn default_smoothing() -> f64 {
    1.0
}

fn default_min_examples() -> usize {
    1
}

fn default_max_exemplars() -> usize {
    32
}

/// Held-out split configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatasetConfig {
    /// Fraction of examples held out for validation.
    #[serde(default = "default_held_out_ratio")]
    pub held_out_ratio: f64,

    /// Shuffle seed so splits are reproducible.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            held_out_ratio: default_held_out_ratio(),
            seed: default_seed(),
        }
    }
}

fn default_held_out_ratio() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

/// Artifact store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// Root directory holding `staging/`, `validated/`, `production/`, `archive/`.
    #[serde(default = "default_registry_root")]
    pub root: String,

    /// Prior production artifacts kept in the archive.
    #[serde(default = "default_archive_retention")]
    pub archive_retention: usize,
}

impl RegistryConfig {
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root: default_registry_root(),
            archive_retention: default_archive_retention(),
        }
    }
}

fn default_registry_root() -> String {
    dirs::data_local_dir()
        .map(|d| d.join("switchyard/artifacts"))
        .unwrap_or_else(|| PathBuf::from("./switchyard-artifacts"))
        .display()
        .to_string()
}

fn default_archive_retention() -> usize {
    5
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
