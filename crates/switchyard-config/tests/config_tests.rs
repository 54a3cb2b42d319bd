// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Switchyard configuration system.

use switchyard_config::diagnostic::{suggest_key, ConfigError};
use switchyard_config::model::SwitchyardConfig;
use switchyard_config::{load_and_validate_str, load_config_from_str};
use switchyard_core::{ModelKind, TierId};

/// Valid TOML with the main sections deserializes successfully.
#[test]
fn valid_toml_deserializes_into_switchyard_config() {
    let toml = r#"
[router]
tier_order = ["pattern", "remote", "fallback"]

[router.tiers.remote]
min_confidence = 0.75
timeout_ms = 4000

[remote]
endpoint = "https://assistant.example.com"
model = "router-small"
api_key = "sk-test"

[fallback]
default_tool = "chat"
match_confidence = 0.4

[[fallback.rules]]
tool = "list_dir"
keywords = ["list files", "show directory"]
arguments = { path = 'in (?P<value>\S+)' }

[[catalog.tools]]
name = "list_dir"
required_args = ["path"]

[learning]
default_kind = "classifier"
smoothing = 0.5

[dataset]
held_out_ratio = 0.25
seed = 7

[registry]
root = "/tmp/switchyard-test"
archive_retention = 3
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should load");
    assert_eq!(
        config.router.tier_order,
        vec![TierId::Pattern, TierId::Remote, TierId::Fallback]
    );
    assert_eq!(config.router.tiers.remote.min_confidence, 0.75);
    assert_eq!(config.router.tiers.remote.timeout_ms, 4000);
    assert_eq!(config.remote.endpoint.as_deref(), Some("https://assistant.example.com"));
    assert_eq!(config.remote.model, "router-small");
    assert_eq!(config.fallback.default_tool.as_deref(), Some("chat"));
    assert_eq!(config.fallback.rules.len(), 1);
    assert_eq!(config.fallback.rules[0].keywords.len(), 2);
    assert_eq!(config.catalog.tools[0].required_args, vec!["path"]);
    assert_eq!(config.learning.default_kind, ModelKind::Classifier);
    assert_eq!(config.learning.smoothing, 0.5);
    assert_eq!(config.dataset.held_out_ratio, 0.25);
    assert_eq!(config.dataset.seed, 7);
    assert_eq!(config.registry.root, "/tmp/switchyard-test");
    assert_eq!(config.registry.archive_retention, 3);

    let catalog = config.catalog.to_catalog();
    assert!(catalog.get("list_dir").is_some());
}

/// A partial tier table keeps the defaults for keys it does not set.
#[test]
fn partial_tier_table_merges_with_defaults() {
    let toml = r#"
[router.tiers.pattern]
min_confidence = 0.5
"#;

    let config = load_config_from_str(toml).expect("partial table should merge");
    assert_eq!(config.router.tiers.pattern.min_confidence, 0.5);
    assert_eq!(config.router.tiers.pattern.timeout_ms, 100);
    assert!(config.router.tiers.pattern.enabled);
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.router.tier_order, TierId::DEFAULT_ORDER.to_vec());
    assert!(config.embedded.endpoint.is_none());
    assert_eq!(config.embedded.model, "local");
    assert!(config.remote.endpoint.is_none());
    assert!(config.fallback.default_tool.is_none());
    assert_eq!(config.fallback.confidence, 0.3);
    assert_eq!(config.fallback.match_confidence, 0.45);
    assert!(config.catalog.tools.is_empty());
    assert_eq!(config.learning.default_kind, ModelKind::Pattern);
    assert_eq!(config.registry.archive_retention, 5);
    assert_eq!(config.logging.level, "info");
}

/// Unknown field in a section is rejected.
#[test]
fn unknown_field_in_registry_produces_error() {
    let toml = r#"
[registry]
archive_retension = 3
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("archive_retension"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Unknown field becomes an UnknownKey diagnostic with a suggestion.
#[test]
fn unknown_field_diagnostic_suggests_correction() {
    let toml = r#"
[registry]
archive_retension = 3
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { suggestion: Some(s), .. } if s == "archive_retention"
    )));
}

/// A misspelled tier id becomes an UnknownVariant diagnostic with a suggestion.
#[test]
fn unknown_tier_variant_suggests_correction() {
    let toml = r#"
[router]
tier_order = ["patern", "fallback"]
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject unknown tier");
    assert!(
        errors.iter().any(|e| matches!(
            e,
            ConfigError::UnknownVariant { suggestion: Some(s), .. } if s == "pattern"
        )),
        "got: {errors:?}"
    );
}

/// Dotted overrides (the shape env vars are mapped to) replace file values.
#[test]
fn dotted_override_replaces_file_value() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let toml_content = r#"
[registry]
archive_retention = 2
"#;

    let config: SwitchyardConfig = Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("registry.archive_retention", 9))
        .extract()
        .expect("should merge override");

    assert_eq!(config.registry.archive_retention, 9);
}

/// Missing config files are silently skipped (Figment's Toml::file() behavior).
#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let config: SwitchyardConfig = Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(Toml::file("/nonexistent/path/switchyard.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.logging.level, "info");
}

/// Semantic validation runs after a successful parse.
#[test]
fn semantic_validation_runs_after_parse() {
    let toml = r#"
[fallback]
confidence = 0.8

[registry]
archive_retention = 0
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

#[test]
fn diagnostic_no_suggestion_for_distant_typo() {
    let valid_keys = &["tier_order", "tiers"];
    assert!(suggest_key("zzzzzz", valid_keys).is_none());
}
