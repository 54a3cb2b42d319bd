// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure transformations from raw records to canonical training examples.
//!
//! None of these functions touch the filesystem or the clock.

use std::collections::{BTreeMap, HashMap};

use switchyard_core::text::normalize_query;
use switchyard_core::{Arguments, Provenance, SourceKind, TrainingExample};
use tracing::debug;

use crate::records::{CorrectionEntry, HistoryRecord, SyntheticTemplate};

/// Examples from execution history. Unsuccessful, ambiguous, tool-less, and
/// empty-query records are dropped.
pub fn from_history(records: &[HistoryRecord]) -> Vec<TrainingExample> {
    let examples: Vec<TrainingExample> = records
        .iter()
        .filter(|r| r.success && !r.ambiguous)
        .filter(|r| !normalize_query(&r.query).is_empty())
        .filter_map(|r| {
            let tool = r.tool.as_deref()?.trim();
            if tool.is_empty() {
                return None;
            }
            Some(TrainingExample {
                query: r.query.trim().to_string(),
                expected_tool: tool.to_string(),
                expected_arguments: r.arguments.clone(),
                provenance: Provenance {
                    source: SourceKind::History,
                    timestamp: r.timestamp,
                    correction_id: None,
                },
            })
        })
        .collect();

    debug!(
        records = records.len(),
        kept = examples.len(),
        "converted history records"
    );
    examples
}

/// Examples expanded from synthetic templates.
///
/// A template without fills is taken literally. A fill that leaves a
/// placeholder unresolved is skipped.
pub fn from_templates(templates: &[SyntheticTemplate]) -> Vec<TrainingExample> {
    let mut examples = Vec::new();
    let empty = BTreeMap::new();

    for template in templates {
        let fills: Vec<&BTreeMap<String, String>> = if template.fills.is_empty() {
            vec![&empty]
        } else {
            template.fills.iter().collect()
        };

        for fill in fills {
            let query = substitute(&template.query, fill);
            let arguments: Arguments = template
                .arguments
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        serde_json::Value::String(s) => {
                            serde_json::Value::String(substitute(s, fill))
                        }
                        other => other.clone(),
                    };
                    (key.clone(), value)
                })
                .collect();

            let unresolved = has_placeholder(&query)
                || arguments
                    .values()
                    .any(|v| v.as_str().is_some_and(has_placeholder));
            if unresolved || normalize_query(&query).is_empty() {
                debug!(
                    tool = template.tool.as_str(),
                    query = query.as_str(),
                    "skipping unresolved template fill"
                );
                continue;
            }

            examples.push(TrainingExample {
                query,
                expected_tool: template.tool.clone(),
                expected_arguments: arguments,
                provenance: Provenance {
                    source: SourceKind::Synthetic,
                    timestamp: template.generated_at,
                    correction_id: None,
                },
            });
        }
    }

    examples
}

/// Examples from human corrections, tagged with their correction id.
pub fn from_corrections(entries: &[CorrectionEntry]) -> Vec<TrainingExample> {
    entries
        .iter()
        .filter(|e| !normalize_query(&e.query).is_empty() && !e.tool.trim().is_empty())
        .map(|e| TrainingExample {
            query: e.query.trim().to_string(),
            expected_tool: e.tool.trim().to_string(),
            expected_arguments: e.arguments.clone(),
            provenance: Provenance {
                source: SourceKind::Correction,
                timestamp: e.corrected_at,
                correction_id: Some(e.id.clone()),
            },
        })
        .collect()
}

/// Collapse examples sharing a normalized query down to one.
///
/// Corrections beat history, history beats synthetic; within a source the
/// latest timestamp wins. Output is ordered by normalized query.
pub fn merge(examples: impl IntoIterator<Item = TrainingExample>) -> Vec<TrainingExample> {
    let mut by_query: HashMap<String, TrainingExample> = HashMap::new();
    for example in examples {
        let key = normalize_query(&example.query);
        let replace = by_query
            .get(&key)
            .is_none_or(|existing| example.supersedes(existing));
        if replace {
            by_query.insert(key, example);
        }
    }

    let mut merged: Vec<(String, TrainingExample)> = by_query.into_iter().collect();
    merged.sort_by(|a, b| a.0.cmp(&b.0));
    merged.into_iter().map(|(_, example)| example).collect()
}

/// Convert and merge all three provenance classes in one call.
pub fn combine(
    history: &[HistoryRecord],
    templates: &[SyntheticTemplate],
    corrections: &[CorrectionEntry],
) -> Vec<TrainingExample> {
    let mut all = from_history(history);
    all.extend(from_templates(templates));
    all.extend(from_corrections(corrections));
    merge(all)
}

fn substitute(text: &str, fill: &BTreeMap<String, String>) -> String {
    let mut out = text.to_string();
    for (slot, value) in fill {
        out = out.replace(&format!("{{{slot}}}"), value);
    }
    out
}

fn has_placeholder(text: &str) -> bool {
    text.find('{')
        .is_some_and(|open| text[open..].find('}').is_some_and(|close| close > 1))
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use serde_json::json;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn history(query: &str, tool: Option<&str>, success: bool, ambiguous: bool) -> HistoryRecord {
        HistoryRecord {
            query: query.into(),
            tool: tool.map(str::to_string),
            arguments: Arguments::new(),
            success,
            ambiguous,
            timestamp: at(100),
        }
    }

    #[test]
    fn history_drops_failed_and_ambiguous_records() {
        let records = vec![
            history("list files in docs", Some("list_dir"), true, false),
            history("delete everything", Some("rm"), false, false),
            history("do the thing", Some("post"), true, true),
            history("hello", None, true, false),
            history("   ", Some("noop"), true, false),
        ];
        let examples = from_history(&records);
        assert_eq!(examples.len(), 1);
        assert_eq!(examples[0].expected_tool, "list_dir");
        assert_eq!(examples[0].provenance.source, SourceKind::History);
    }

    #[test]
    fn templates_expand_each_fill() {
        let template = SyntheticTemplate {
            tool: "list_dir".into(),
            query: "list files in {path}".into(),
            arguments: [
                ("path".to_string(), json!("{path}")),
                ("recursive".to_string(), json!(false)),
            ]
            .into(),
            fills: vec![
                [("path".to_string(), "docs".to_string())].into(),
                [("path".to_string(), "src".to_string())].into(),
                [("other".to_string(), "x".to_string())].into(),
            ],
            generated_at: at(5),
        };
        let examples = from_templates(&[template]);
        assert_eq!(examples.len(), 2, "third fill leaves {{path}} unresolved");
        assert_eq!(examples[0].query, "list files in docs");
        assert_eq!(examples[0].expected_arguments["path"], json!("docs"));
        assert_eq!(examples[0].expected_arguments["recursive"], json!(false));
        assert_eq!(examples[1].expected_arguments["path"], json!("src"));
        assert_eq!(examples[1].provenance.source, SourceKind::Synthetic);
    }

    #[test]
    fn literal_template_without_fills() {
        let template = SyntheticTemplate {
            tool: "status".into(),
            query: "what is the status".into(),
            arguments: Arguments::new(),
            fills: Vec::new(),
            generated_at: at(5),
        };
        assert_eq!(from_templates(&[template]).len(), 1);
    }

    #[test]
    fn corrections_override_regardless_of_age() {
        let mined = HistoryRecord {
            query: "List files in docs!".into(),
            tool: Some("read_file".into()),
            arguments: Arguments::new(),
            success: true,
            ambiguous: false,
            timestamp: at(1_000),
        };
        let correction = CorrectionEntry {
            id: "c-1".into(),
            query: "list files in docs".into(),
            tool: "list_dir".into(),
            arguments: [("path".to_string(), json!("docs"))].into(),
            corrected_at: at(10),
        };
        let synthetic = SyntheticTemplate {
            tool: "search".into(),
            query: "list files in docs".into(),
            arguments: Arguments::new(),
            fills: Vec::new(),
            generated_at: at(5_000),
        };

        let merged = combine(&[mined], &[synthetic], &[correction]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].expected_tool, "list_dir");
        assert_eq!(merged[0].provenance.correction_id.as_deref(), Some("c-1"));
    }

    #[test]
    fn merge_prefers_latest_within_source() {
        let mut older = history("open readme", Some("read_file"), true, false);
        older.timestamp = at(1);
        let mut newer = history("open readme", Some("open_file"), true, false);
        newer.timestamp = at(2);
        let merged = merge(from_history(&[newer, older]));
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].expected_tool, "open_file");
    }

    #[test]
    fn merge_output_is_sorted_by_normalized_query() {
        let merged = merge(from_history(&[
            history("zebra facts", Some("search"), true, false),
            history("Apple pie", Some("search"), true, false),
        ]));
        assert_eq!(merged[0].query, "Apple pie");
        assert_eq!(merged[1].query, "zebra facts");
    }
}
