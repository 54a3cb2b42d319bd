// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Validation gate: thresholds, per-example observations, and the report.
//!
//! Scoring is a pure function of the observations. Accuracy figures depend
//! only on predicted vs. expected tools, never on latency, so replaying the
//! same held-out set against the same artifact always yields the same
//! accuracy.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SwitchyardError;

/// Caller-supplied gate. There is intentionally no `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationThresholds {
    /// Inclusive lower bound on overall accuracy, in `[0.0, 1.0]`.
    pub min_accuracy: f64,
    /// Inclusive upper bound on p99 latency in milliseconds.
    pub max_latency_p99_ms: f64,
}

impl ValidationThresholds {
    pub fn new(min_accuracy: f64, max_latency_p99_ms: f64) -> Result<Self, SwitchyardError> {
        let thresholds = Self {
            min_accuracy,
            max_latency_p99_ms,
        };
        thresholds.check()?;
        Ok(thresholds)
    }

    /// Reject out-of-range values (also catches NaN).
    pub fn check(&self) -> Result<(), SwitchyardError> {
        if !(0.0..=1.0).contains(&self.min_accuracy) {
            return Err(SwitchyardError::InvalidInput(format!(
                "min_accuracy must be within [0, 1], got {}",
                self.min_accuracy
            )));
        }
        let max = self.max_latency_p99_ms;
        if max.is_nan() || max <= 0.0 || max.is_infinite() {
            return Err(SwitchyardError::InvalidInput(format!(
                "max_latency_p99_ms must be a positive finite number, got {}",
                self.max_latency_p99_ms
            )));
        }
        Ok(())
    }
}

/// One replayed held-out example.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub expected_tool: String,
    pub predicted_tool: Option<String>,
    pub latency_ms: f64,
}

impl Observation {
    pub fn is_correct(&self) -> bool {
        self.predicted_tool.as_deref() == Some(self.expected_tool.as_str())
    }
}

/// Outcome of replaying a held-out set through a candidate artifact.
///
/// Fields are private: a report is produced once by [`ValidationReport::score`]
/// and read through accessors afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    artifact_version: String,
    accuracy: f64,
    avg_latency_ms: f64,
    p99_latency_ms: f64,
    per_tool_accuracy: BTreeMap<String, f64>,
    sample_count: usize,
    passed: bool,
    thresholds: ValidationThresholds,
    created_at: DateTime<Utc>,
}

impl ValidationReport {
    /// Score observations against the thresholds.
    pub fn score(
        artifact_version: impl Into<String>,
        observations: &[Observation],
        thresholds: ValidationThresholds,
    ) -> Result<Self, SwitchyardError> {
        thresholds.check()?;
        if observations.is_empty() {
            return Err(SwitchyardError::InvalidInput(
                "held-out set must contain at least one example".into(),
            ));
        }

        let total = observations.len();
        let correct = observations.iter().filter(|o| o.is_correct()).count();
        let accuracy = correct as f64 / total as f64;

        let mut per_tool: BTreeMap<String, (usize, usize)> = BTreeMap::new();
        for obs in observations {
            let entry = per_tool.entry(obs.expected_tool.clone()).or_default();
            entry.1 += 1;
            if obs.is_correct() {
                entry.0 += 1;
            }
        }
        let per_tool_accuracy = per_tool
            .into_iter()
            .map(|(tool, (hits, count))| (tool, hits as f64 / count as f64))
            .collect();

        let mut latencies: Vec<f64> = observations.iter().map(|o| o.latency_ms).collect();
        let avg_latency_ms = latencies.iter().sum::<f64>() / total as f64;
        latencies.sort_by(f64::total_cmp);
        let p99_latency_ms = percentile_99(&latencies);

        let passed =
            accuracy >= thresholds.min_accuracy && p99_latency_ms <= thresholds.max_latency_p99_ms;

        Ok(Self {
            artifact_version: artifact_version.into(),
            accuracy,
            avg_latency_ms,
            p99_latency_ms,
            per_tool_accuracy,
            sample_count: total,
            passed,
            thresholds,
            created_at: Utc::now(),
        })
    }

    pub fn artifact_version(&self) -> &str {
        &self.artifact_version
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn avg_latency_ms(&self) -> f64 {
        self.avg_latency_ms
    }

    pub fn p99_latency_ms(&self) -> f64 {
        self.p99_latency_ms
    }

    pub fn per_tool_accuracy(&self) -> &BTreeMap<String, f64> {
        &self.per_tool_accuracy
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn thresholds(&self) -> ValidationThresholds {
        self.thresholds
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Value at 1-based rank `ceil(0.99 * n)` of an ascending slice.
fn percentile_99(sorted: &[f64]) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = (0.99 * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}
