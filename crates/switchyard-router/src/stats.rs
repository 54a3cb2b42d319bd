// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-tier and aggregate routing counters.
//!
//! Counters are only touched once an attempt has finished, so a `resolve`
//! future dropped mid-attempt leaves no trace in the statistics.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use switchyard_core::TierId;

/// Weight of the newest sample in the rolling latency average.
const LATENCY_ALPHA: f64 = 0.2;

/// How one tier attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    BelowFloor,
    Decline,
    Error,
    Timeout,
}

impl AttemptOutcome {
    pub fn label(self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::BelowFloor => "below_floor",
            AttemptOutcome::Decline => "decline",
            AttemptOutcome::Error => "error",
            AttemptOutcome::Timeout => "timeout",
        }
    }
}

/// Counters for one tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TierStats {
    pub attempts: u64,
    pub successes: u64,
    pub below_floor: u64,
    pub declines: u64,
    pub errors: u64,
    pub timeouts: u64,
    /// Exponentially weighted average over completed attempts.
    pub avg_latency_ms: f64,
}

/// Read-only snapshot for external polling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouterStats {
    pub requests: u64,
    pub resolved: u64,
    pub unresolved: u64,
    pub avg_latency_ms: f64,
    pub tiers: BTreeMap<TierId, TierStats>,
}

#[derive(Debug, Default)]
pub(crate) struct StatsRecorder {
    inner: Mutex<RouterStats>,
}

impl StatsRecorder {
    pub(crate) fn record_attempt(&self, tier: TierId, outcome: AttemptOutcome, latency_ms: f64) {
        let mut stats = self.lock();
        let entry = stats.tiers.entry(tier).or_default();
        entry.avg_latency_ms = rolling(entry.avg_latency_ms, entry.attempts, latency_ms);
        entry.attempts += 1;
        match outcome {
            AttemptOutcome::Success => entry.successes += 1,
            AttemptOutcome::BelowFloor => entry.below_floor += 1,
            AttemptOutcome::Decline => entry.declines += 1,
            AttemptOutcome::Error => entry.errors += 1,
            AttemptOutcome::Timeout => entry.timeouts += 1,
        }
    }

    pub(crate) fn record_request(&self, resolved: bool, latency_ms: f64) {
        let mut stats = self.lock();
        stats.avg_latency_ms = rolling(stats.avg_latency_ms, stats.requests, latency_ms);
        stats.requests += 1;
        if resolved {
            stats.resolved += 1;
        } else {
            stats.unresolved += 1;
        }
    }

    pub(crate) fn snapshot(&self) -> RouterStats {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, RouterStats> {
        // Counters stay meaningful even if a holder panicked.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn rolling(current: f64, samples: u64, latest: f64) -> f64 {
    if samples == 0 {
        latest
    } else {
        LATENCY_ALPHA * latest + (1.0 - LATENCY_ALPHA) * current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_seeds_the_average() {
        let recorder = StatsRecorder::default();
        recorder.record_attempt(TierId::Pattern, AttemptOutcome::Success, 10.0);
        recorder.record_attempt(TierId::Pattern, AttemptOutcome::Error, 20.0);

        let stats = recorder.snapshot();
        let pattern = &stats.tiers[&TierId::Pattern];
        assert_eq!(pattern.attempts, 2);
        assert_eq!(pattern.successes, 1);
        assert_eq!(pattern.errors, 1);
        assert!((pattern.avg_latency_ms - 12.0).abs() < 1e-9);
    }

    #[test]
    fn requests_split_into_resolved_and_unresolved() {
        let recorder = StatsRecorder::default();
        recorder.record_request(true, 1.0);
        recorder.record_request(false, 1.0);
        recorder.record_request(true, 1.0);
        let stats = recorder.snapshot();
        assert_eq!((stats.requests, stats.resolved, stats.unresolved), (3, 2, 1));
    }

    #[test]
    fn snapshot_serializes_with_tier_names() {
        let recorder = StatsRecorder::default();
        recorder.record_attempt(TierId::Fallback, AttemptOutcome::Timeout, 5.0);
        let json = serde_json::to_value(recorder.snapshot()).unwrap();
        assert_eq!(json["tiers"]["fallback"]["timeouts"], 1);
    }
}
