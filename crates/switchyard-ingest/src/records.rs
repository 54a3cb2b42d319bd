// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Raw records supplied by the three upstream collaborators.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use switchyard_core::Arguments;

/// One executed tool call from the execution-history store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub query: String,
    /// Tool that ran. `None` when the request never reached a tool.
    #[serde(default)]
    pub tool: Option<String>,
    #[serde(default)]
    pub arguments: Arguments,
    /// Whether the tool call completed without error.
    pub success: bool,
    /// Set when a reviewer or heuristic flagged the mapping as unclear.
    #[serde(default)]
    pub ambiguous: bool,
    pub timestamp: DateTime<Utc>,
}

/// A parameterised query produced by the synthetic example generator.
///
/// `query` and string-valued `arguments` may contain `{slot}` placeholders;
/// each entry of `fills` yields one example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticTemplate {
    pub tool: String,
    pub query: String,
    #[serde(default)]
    pub arguments: Arguments,
    #[serde(default)]
    pub fills: Vec<BTreeMap<String, String>>,
    #[serde(default = "Utc::now")]
    pub generated_at: DateTime<Utc>,
}

/// A human correction from the review queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionEntry {
    pub id: String,
    pub query: String,
    pub tool: String,
    #[serde(default)]
    pub arguments: Arguments,
    pub corrected_at: DateTime<Utc>,
}
