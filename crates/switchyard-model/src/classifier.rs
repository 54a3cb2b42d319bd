// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multinomial naive Bayes over bag-of-words query vectors.
//!
//! Classes are tool names. Tokens never seen in training are ignored at
//! prediction time; a query made only of unseen tokens is declined. All maps
//! are ordered so the serialized form and tie-breaking are deterministic.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use switchyard_core::text::{normalize_query, overlap_ratio, tokenize};
use switchyard_core::{SwitchyardError, TrainingExample};

use crate::exemplar::Exemplar;
use crate::Prediction;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ClassStats {
    documents: u64,
    token_total: u64,
    token_counts: BTreeMap<String, u64>,
    exemplars: Vec<Exemplar>,
}

/// Trained naive Bayes classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierModel {
    smoothing: f64,
    documents: u64,
    vocabulary: BTreeSet<String>,
    classes: BTreeMap<String, ClassStats>,
}

impl ClassifierModel {
    /// Fit on `examples` with Laplace `smoothing`, keeping up to
    /// `max_exemplars` stored queries per tool for argument extraction.
    pub fn fit(
        examples: &[TrainingExample],
        smoothing: f64,
        max_exemplars: usize,
    ) -> Result<Self, SwitchyardError> {
        if !(smoothing > 0.0 && smoothing.is_finite()) {
            return Err(SwitchyardError::InvalidInput(format!(
                "smoothing must be a positive finite number, got {smoothing}"
            )));
        }

        let mut classes: BTreeMap<String, ClassStats> = BTreeMap::new();
        let mut vocabulary = BTreeSet::new();
        let mut documents = 0;

        for example in examples {
            let tokens = tokenize(&example.query);
            if tokens.is_empty() {
                continue;
            }
            documents += 1;

            let stats = classes.entry(example.expected_tool.clone()).or_default();
            stats.documents += 1;
            stats.token_total += tokens.len() as u64;
            for token in &tokens {
                *stats.token_counts.entry(token.clone()).or_default() += 1;
                vocabulary.insert(token.clone());
            }

            let normalized = normalize_query(&example.query);
            if stats.exemplars.len() < max_exemplars
                && !stats.exemplars.iter().any(|e| e.query == normalized)
            {
                stats.exemplars.push(Exemplar::learn(example));
            }
        }

        if documents == 0 {
            return Err(SwitchyardError::InvalidInput(
                "classifier needs at least one non-empty query".into(),
            ));
        }

        Ok(Self {
            smoothing,
            documents,
            vocabulary,
            classes,
        })
    }

    pub fn tool_coverage(&self) -> BTreeSet<String> {
        self.classes.keys().cloned().collect()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Posterior probability of each tool for `query`, or `None` when no
    /// token of the query is in the vocabulary.
    pub fn posteriors(&self, query: &str) -> Option<BTreeMap<String, f64>> {
        let tokens: Vec<String> = tokenize(query)
            .into_iter()
            .filter(|t| self.vocabulary.contains(t))
            .collect();
        if tokens.is_empty() {
            return None;
        }

        let vocab = self.vocabulary.len() as f64;
        let log_scores: Vec<(&String, f64)> = self
            .classes
            .iter()
            .map(|(tool, stats)| {
                let prior = (stats.documents as f64 / self.documents as f64).ln();
                let denominator = stats.token_total as f64 + self.smoothing * vocab;
                let likelihood: f64 = tokens
                    .iter()
                    .map(|t| {
                        let count = stats.token_counts.get(t).copied().unwrap_or(0) as f64;
                        ((count + self.smoothing) / denominator).ln()
                    })
                    .sum();
                (tool, prior + likelihood)
            })
            .collect();

        // log-sum-exp for a stable softmax
        let max = log_scores
            .iter()
            .map(|(_, s)| *s)
            .fold(f64::NEG_INFINITY, f64::max);
        let total: f64 = log_scores.iter().map(|(_, s)| (s - max).exp()).sum();

        Some(
            log_scores
                .into_iter()
                .map(|(tool, s)| (tool.clone(), (s - max).exp() / total))
                .collect(),
        )
    }

    /// Most probable tool, with arguments taken from its closest stored query.
    pub fn predict(&self, query: &str) -> Option<Prediction> {
        let posteriors = self.posteriors(query)?;
        let (tool, confidence) = posteriors.into_iter().fold(
            None::<(String, f64)>,
            |best, (tool, p)| match best {
                Some((_, top)) if p <= top => best,
                _ => Some((tool, p)),
            },
        )?;

        let tokens = tokenize(query);
        let arguments = self
            .classes
            .get(&tool)
            .and_then(|stats| {
                stats.exemplars.iter().fold(None::<(&Exemplar, f64)>, |best, e| {
                    let ratio = overlap_ratio(&tokens, &e.tokens);
                    match best {
                        Some((_, top)) if ratio <= top => best,
                        _ => Some((e, ratio)),
                    }
                })
            })
            .map(|(exemplar, _)| exemplar.arguments_for(query))
            .unwrap_or_default();

        Some(Prediction {
            tool,
            arguments,
            confidence,
        })
    }
}
