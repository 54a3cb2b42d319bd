// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stored example queries and argument re-derivation.
//!
//! When a training query contains an argument value right after some word
//! (the anchor), a new query for the same tool is assumed to carry its own
//! value after the same anchor. "list files in docs" with `path = "docs"`
//! learns the anchor `in`, so "list files in src" yields `path = "src"`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use switchyard_core::text::{normalize_query, tokenize};
use switchyard_core::{Arguments, TrainingExample};

/// Where an argument value sat in its training query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// Lowercased word immediately before the value.
    pub after: String,
    /// Number of words the value spans.
    pub span: usize,
}

/// One training query kept by a model for matching and argument extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exemplar {
    /// Normalized query text.
    pub query: String,
    pub tokens: Vec<String>,
    pub arguments: Arguments,
    #[serde(default)]
    pub anchors: BTreeMap<String, Anchor>,
}

impl Exemplar {
    pub fn learn(example: &TrainingExample) -> Self {
        let query_words = words(&example.query);
        let anchors = example
            .expected_arguments
            .iter()
            .filter_map(|(name, value)| {
                let value_words = words(value.as_str()?);
                find_anchor(&query_words, &value_words).map(|anchor| (name.clone(), anchor))
            })
            .collect();

        Self {
            query: normalize_query(&example.query),
            tokens: tokenize(&example.query),
            arguments: example.expected_arguments.clone(),
            anchors,
        }
    }

    /// Arguments for `query`, re-extracting anchored values where possible.
    ///
    /// An exact normalized match returns the stored arguments unchanged.
    pub fn arguments_for(&self, query: &str) -> Arguments {
        if normalize_query(query) == self.query {
            return self.arguments.clone();
        }

        let query_words = words(query);
        self.arguments
            .iter()
            .map(|(name, stored)| {
                let value = self
                    .anchors
                    .get(name)
                    .and_then(|anchor| extract(&query_words, anchor))
                    .map(serde_json::Value::String)
                    .unwrap_or_else(|| stored.clone());
                (name.clone(), value)
            })
            .collect()
    }
}

/// A whitespace word with surrounding punctuation removed, plus its lowercase form.
#[derive(Debug, Clone, PartialEq)]
struct Word {
    raw: String,
    key: String,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '/' | '.' | '_' | '-')
}

fn words(text: &str) -> Vec<Word> {
    text.split_whitespace()
        .filter_map(|w| {
            let raw = w.trim_matches(|c: char| !is_word_char(c)).trim_end_matches('.');
            (!raw.is_empty()).then(|| Word {
                raw: raw.to_string(),
                key: raw.to_lowercase(),
            })
        })
        .collect()
}

fn find_anchor(query: &[Word], value: &[Word]) -> Option<Anchor> {
    if value.is_empty() || value.len() >= query.len() {
        return None;
    }
    (1..=query.len() - value.len())
        .find(|&start| {
            query[start..start + value.len()]
                .iter()
                .zip(value)
                .all(|(q, v)| q.key == v.key)
        })
        .map(|start| Anchor {
            after: query[start - 1].key.clone(),
            span: value.len(),
        })
}

fn extract(query: &[Word], anchor: &Anchor) -> Option<String> {
    let position = query.iter().position(|w| w.key == anchor.after)?;
    let taken = query.get(position + 1..position + 1 + anchor.span)?;
    Some(
        taken
            .iter()
            .map(|w| w.raw.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    )
}
