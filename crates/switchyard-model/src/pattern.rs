// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lookup model: example queries grouped per tool.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use switchyard_core::text::{normalize_query, overlap_ratio, tokenize};
use switchyard_core::{SwitchyardError, TrainingExample};

use crate::exemplar::Exemplar;
use crate::Prediction;

/// Scale applied to the token-overlap ratio; an exact match scores 0.89.
pub const PATTERN_CONFIDENCE_SCALE: f64 = 0.89;

/// Normalized example queries grouped by the tool they resolve to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternModel {
    tools: BTreeMap<String, Vec<Exemplar>>,
}

impl PatternModel {
    /// Group examples per tool. The first example wins for a repeated
    /// normalized query.
    pub fn fit(examples: &[TrainingExample]) -> Result<Self, SwitchyardError> {
        let mut tools: BTreeMap<String, Vec<Exemplar>> = BTreeMap::new();
        let mut seen = HashSet::new();

        for example in examples {
            let normalized = normalize_query(&example.query);
            if normalized.is_empty() || !seen.insert(normalized) {
                continue;
            }
            tools
                .entry(example.expected_tool.clone())
                .or_default()
                .push(Exemplar::learn(example));
        }

        if tools.is_empty() {
            return Err(SwitchyardError::InvalidInput(
                "pattern model needs at least one non-empty query".into(),
            ));
        }
        Ok(Self { tools })
    }

    pub fn tool_coverage(&self) -> BTreeSet<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn exemplar_count(&self) -> usize {
        self.tools.values().map(Vec::len).sum()
    }

    /// Best-overlapping stored query. `None` when nothing shares a token.
    ///
    /// Ties go to the first tool in name order, then the first stored query.
    pub fn predict(&self, query: &str) -> Option<Prediction> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return None;
        }

        let mut best: Option<(&str, &Exemplar, f64)> = None;
        for (tool, exemplars) in &self.tools {
            for exemplar in exemplars {
                let ratio = overlap_ratio(&tokens, &exemplar.tokens);
                if best.is_none_or(|(_, _, top)| ratio > top) {
                    best = Some((tool, exemplar, ratio));
                }
            }
        }

        let (tool, exemplar, ratio) = best.filter(|(_, _, ratio)| *ratio > 0.0)?;
        Some(Prediction {
            tool: tool.to_string(),
            arguments: exemplar.arguments_for(query),
            confidence: ratio * PATTERN_CONFIDENCE_SCALE,
        })
    }
}
