// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as confidence ranges, regex syntax, and duplicate names.

use std::collections::HashSet;

use regex::Regex;
use switchyard_core::TierId;

use crate::diagnostic::ConfigError;
use crate::model::SwitchyardConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SwitchyardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    // Router chain
    if config.router.tier_order.is_empty() {
        invalid("router.tier_order must list at least one tier".to_string());
    }
    let mut seen_tiers = HashSet::new();
    for tier in &config.router.tier_order {
        if !seen_tiers.insert(*tier) {
            invalid(format!("router.tier_order lists `{tier}` more than once"));
        }
    }
    for tier in [TierId::Embedded, TierId::Pattern, TierId::Remote, TierId::Fallback] {
        let settings = config.router.tiers.get(tier);
        if !(0.0..=1.0).contains(&settings.min_confidence) {
            invalid(format!(
                "router.tiers.{tier}.min_confidence must be within [0, 1], got {}",
                settings.min_confidence
            ));
        }
        if settings.timeout_ms == 0 {
            invalid(format!("router.tiers.{tier}.timeout_ms must be greater than 0"));
        }
    }

    // Fallback tier reports a fixed low band
    for (key, value) in [
        ("confidence", config.fallback.confidence),
        ("match_confidence", config.fallback.match_confidence),
    ] {
        if !(0.3..=0.5).contains(&value) {
            invalid(format!("fallback.{key} must be within [0.3, 0.5], got {value}"));
        }
    }
    if let Some(tool) = &config.fallback.default_tool
        && tool.trim().is_empty()
    {
        invalid("fallback.default_tool must not be empty when set".to_string());
    }
    for (i, rule) in config.fallback.rules.iter().enumerate() {
        if rule.tool.trim().is_empty() {
            invalid(format!("fallback.rules[{i}].tool must not be empty"));
        }
        if rule.keywords.iter().all(|k| k.trim().is_empty()) {
            invalid(format!("fallback.rules[{i}].keywords must contain a keyword"));
        }
        for (arg, pattern) in &rule.arguments {
            match Regex::new(pattern) {
                Ok(re) if re.capture_names().flatten().any(|n| n == "value") => {}
                Ok(_) => invalid(format!(
                    "fallback.rules[{i}].arguments.{arg} must have a named capture `value`"
                )),
                Err(e) => invalid(format!(
                    "fallback.rules[{i}].arguments.{arg} is not a valid regex: {e}"
                )),
            }
        }
    }

    // Completion endpoints
    for (section, completion) in [("embedded", &config.embedded), ("remote", &config.remote)] {
        if let Some(endpoint) = &completion.endpoint
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            invalid(format!("{section}.endpoint `{endpoint}` must be an http(s) URL"));
        }
        if completion.request_timeout_ms == 0 {
            invalid(format!("{section}.request_timeout_ms must be greater than 0"));
        }
    }

    // Catalog
    let mut seen_tools = HashSet::new();
    for (i, tool) in config.catalog.tools.iter().enumerate() {
        if tool.name.trim().is_empty() {
            invalid(format!("catalog.tools[{i}].name must not be empty"));
        } else if !seen_tools.insert(tool.name.as_str()) {
            invalid(format!("duplicate tool name `{}` in [[catalog.tools]]", tool.name));
        }
    }

    // Learning and dataset
    if config.learning.smoothing <= 0.0 || config.learning.smoothing.is_nan() {
        invalid(format!(
            "learning.smoothing must be positive, got {}",
            config.learning.smoothing
        ));
    }
    if config.learning.min_examples == 0 {
        invalid("learning.min_examples must be at least 1".to_string());
    }
    if config.learning.max_exemplars_per_tool == 0 {
        invalid("learning.max_exemplars_per_tool must be at least 1".to_string());
    }
    let ratio = config.dataset.held_out_ratio;
    if !(ratio > 0.0 && ratio < 1.0) {
        invalid(format!("dataset.held_out_ratio must be within (0, 1), got {ratio}"));
    }

    // Registry
    if config.registry.root.trim().is_empty() {
        invalid("registry.root must not be empty".to_string());
    }
    if config.registry.archive_retention == 0 {
        invalid("registry.archive_retention must be at least 1".to_string());
    }

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        invalid(format!(
            "logging.level `{}` must be one of: {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
