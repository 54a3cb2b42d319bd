// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Training example fixtures.

use chrono::{DateTime, Utc};
use switchyard_core::{Arguments, Provenance, SourceKind, TrainingExample};

/// Six tools with distinct vocabularies.
pub const TOOLS: [&str; 6] = [
    "list_dir",
    "read_file",
    "post_social",
    "send_email",
    "query_erp",
    "schedule_event",
];

/// A history example at a fixed timestamp.
pub fn example(query: impl Into<String>, tool: &str) -> TrainingExample {
    example_with_args(query, tool, &[])
}

pub fn example_with_args(
    query: impl Into<String>,
    tool: &str,
    arguments: &[(&str, &str)],
) -> TrainingExample {
    TrainingExample {
        query: query.into(),
        expected_tool: tool.to_string(),
        expected_arguments: arguments
            .iter()
            .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
            .collect::<Arguments>(),
        provenance: Provenance {
            source: SourceKind::History,
            timestamp: DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap_or_default(),
            correction_id: None,
        },
    }
}

/// `per_tool` distinct examples for each tool, e.g. "list dir request 3".
pub fn corpus(tools: &[&str], per_tool: usize) -> Vec<TrainingExample> {
    tools
        .iter()
        .flat_map(|tool| {
            (0..per_tool)
                .map(move |i| example(format!("{} request {i}", tool.replace('_', " ")), tool))
        })
        .collect()
}
