// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query normalization shared by ingestion, training, and serving.
//!
//! Every component that compares queries must agree on what "the same query"
//! means, so normalization lives here and nowhere else.

use std::collections::BTreeSet;

/// Lowercase, replace punctuation with spaces, and collapse whitespace.
///
/// Path-like characters (`/`, `.`, `_`, `-`) are kept so that arguments such
/// as `docs/api.md` survive normalization as a single token.
pub fn normalize_query(query: &str) -> String {
    let mapped: String = query
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '/' | '.' | '_' | '-') {
                c.to_ascii_lowercase()
            } else {
                ' '
            }
        })
        .collect();

    mapped
        .split_whitespace()
        .map(|token| token.trim_end_matches('.'))
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tokens of the normalized query, in order.
pub fn tokenize(query: &str) -> Vec<String> {
    normalize_query(query)
        .split(' ')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Token-overlap ratio (Jaccard index) between two token sequences.
///
/// Returns 0.0 when both are empty.
pub fn overlap_ratio(a: &[String], b: &[String]) -> f64 {
    let left: BTreeSet<&str> = a.iter().map(String::as_str).collect();
    let right: BTreeSet<&str> = b.iter().map(String::as_str).collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    shared as f64 / union as f64
}
