// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; without an installed recorder every call is a
//! no-op, so library code records unconditionally.

use metrics::{describe_counter, describe_histogram};

use crate::types::TierId;

/// Register all Switchyard metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "switchyard_tier_attempts_total",
        "Tier attempts by outcome (success, below_floor, decline, error, timeout)"
    );
    describe_histogram!(
        "switchyard_tier_latency_seconds",
        "Latency of completed tier attempts in seconds"
    );
    describe_counter!(
        "switchyard_resolve_total",
        "Resolve calls by whether a tool was chosen"
    );
    describe_counter!(
        "switchyard_promotions_total",
        "Artifact lifecycle transitions"
    );
}

/// Record one completed tier attempt.
pub fn record_tier_attempt(tier: TierId, outcome: &'static str, seconds: f64) {
    metrics::counter!(
        "switchyard_tier_attempts_total",
        "tier" => tier.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("switchyard_tier_latency_seconds", "tier" => tier.to_string())
        .record(seconds);
}

/// Record the outcome of a `resolve` call.
pub fn record_resolve(resolved: bool) {
    let label = if resolved { "true" } else { "false" };
    metrics::counter!("switchyard_resolve_total", "resolved" => label).increment(1);
}

/// Record a lifecycle transition (`validated`, `production`, `rollback`).
pub fn record_promotion(transition: &'static str) {
    metrics::counter!("switchyard_promotions_total", "transition" => transition).increment(1);
}
