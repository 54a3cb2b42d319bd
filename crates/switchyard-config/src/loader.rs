// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./switchyard.toml` > `~/.config/switchyard/switchyard.toml` >
//! `/etc/switchyard/switchyard.toml` with environment variable overrides via `SWITCHYARD_` prefix.

// figment::Error is external and cannot be boxed without a wrapper.
#![allow(clippy::result_large_err)]

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SwitchyardConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/switchyard/switchyard.toml` (system-wide)
/// 3. `~/.config/switchyard/switchyard.toml` (user XDG config)
/// 4. `./switchyard.toml` (local directory)
/// 5. `SWITCHYARD_*` environment variables
pub fn load_config() -> Result<SwitchyardConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<SwitchyardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SwitchyardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SwitchyardConfig::default()))
        .merge(Toml::file("/etc/switchyard/switchyard.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("switchyard/switchyard.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("switchyard.toml"))
        .merge(env_provider())
}

/// Map `SWITCHYARD_<SECTION>_<KEY>` onto `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` so that keys containing
/// underscores survive: `SWITCHYARD_REGISTRY_ARCHIVE_RETENTION` must map to
/// `registry.archive_retention`, not `registry.archive.retention`.
fn env_provider() -> Env {
    Env::prefixed("SWITCHYARD_").map(|key| map_env_key(key.as_str()).into())
}

/// Section-prefix rewrite applied to lowercased, prefix-stripped env keys.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: &[&str] = &[
        "router", "embedded", "remote", "fallback", "learning", "dataset", "registry", "logging",
    ];
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_keep_inner_underscores() {
        assert_eq!(map_env_key("registry_archive_retention"), "registry.archive_retention");
        assert_eq!(map_env_key("remote_api_key"), "remote.api_key");
        assert_eq!(map_env_key("logging_level"), "logging.level");
        assert_eq!(map_env_key("unrelated"), "unrelated");
    }
}
