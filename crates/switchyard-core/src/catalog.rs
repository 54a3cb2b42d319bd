// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Known tools and the argument keys each one requires.
//!
//! The tool set is externally extensible, so it is a name-keyed map checked at
//! runtime rather than a closed enum. An empty catalog accepts every decision.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::Arguments;

/// Description of one tool a decision may name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ToolSpec {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_args: Vec<String>,
}

/// Name-keyed registry of tool specs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCatalog {
    tools: BTreeMap<String, ToolSpec>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: impl IntoIterator<Item = (String, ToolSpec)>) -> Self {
        Self {
            tools: specs.into_iter().collect(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, spec: ToolSpec) {
        self.tools.insert(name.into(), spec);
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ToolSpec> {
        self.tools.get(name)
    }

    /// `(name, spec)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ToolSpec)> {
        self.tools.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    /// Check a decision against the catalog.
    ///
    /// Returns a human-readable reason on rejection.
    pub fn check(&self, tool: &str, arguments: &Arguments) -> Result<(), String> {
        if self.tools.is_empty() {
            return Ok(());
        }
        let Some(spec) = self.tools.get(tool) else {
            return Err(format!("unknown tool `{tool}`"));
        };
        let missing: Vec<&str> = spec
            .required_args
            .iter()
            .filter(|key| !arguments.contains_key(key.as_str()))
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!(
                "tool `{tool}` missing required arguments: {}",
                missing.join(", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ToolCatalog {
        let mut catalog = ToolCatalog::new();
        catalog.register(
            "list_dir",
            ToolSpec {
                description: "List a directory".into(),
                required_args: vec!["path".into()],
            },
        );
        catalog
    }

    #[test]
    fn empty_catalog_accepts_anything() {
        assert!(ToolCatalog::new().check("whatever", &Arguments::new()).is_ok());
    }

    #[test]
    fn unknown_tool_rejected() {
        let err = catalog().check("rm_rf", &Arguments::new()).unwrap_err();
        assert!(err.contains("unknown tool"));
    }

    #[test]
    fn missing_required_argument_rejected() {
        let err = catalog().check("list_dir", &Arguments::new()).unwrap_err();
        assert!(err.contains("path"));

        let mut args = Arguments::new();
        args.insert("path".into(), serde_json::json!("docs"));
        assert!(catalog().check("list_dir", &args).is_ok());
    }
}
