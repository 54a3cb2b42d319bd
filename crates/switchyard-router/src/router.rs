// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ordered match-and-fallthrough over resolution tiers.
//!
//! Each tier is tried in turn, bounded by its own timeout. The first decision
//! at or above the tier's confidence floor wins. Errors, timeouts, declines,
//! catalog rejections, and low-confidence answers fall through. The last tier
//! in the chain (or a pinned tier) is accepted at any confidence, and when
//! nothing resolves the result carries the collected reasons instead of a tool.

use std::sync::Arc;

use switchyard_config::model::TierSettings;
use switchyard_core::recording::{record_resolve, record_tier_attempt};
use switchyard_core::types::clamp_confidence;
use switchyard_core::{
    ResolutionTier, RoutingRequest, RoutingResult, SwitchyardError, TierDecision, TierId,
    ToolCatalog,
};
use tokio::time::Instant;
use tokio::time::error::Elapsed;
use tracing::{debug, warn};

use crate::stats::{AttemptOutcome, RouterStats, StatsRecorder};

struct ChainEntry {
    tier: Arc<dyn ResolutionTier>,
    settings: TierSettings,
}

/// The decision router. Cheap to share behind an `Arc`; `resolve` takes `&self`.
pub struct Router {
    chain: Vec<ChainEntry>,
    catalog: ToolCatalog,
    stats: StatsRecorder,
}

impl Router {
    /// An empty router. Decisions are checked against `catalog` unless it is empty.
    pub fn new(catalog: ToolCatalog) -> Self {
        Self {
            chain: Vec::new(),
            catalog,
            stats: StatsRecorder::default(),
        }
    }

    /// Append a tier to the end of the chain.
    pub fn with_tier(mut self, tier: impl ResolutionTier, settings: TierSettings) -> Self {
        self.push_tier(Arc::new(tier), settings);
        self
    }

    pub fn push_tier(&mut self, tier: Arc<dyn ResolutionTier>, settings: TierSettings) {
        debug!(
            tier = %tier.name(),
            min_confidence = settings.min_confidence,
            timeout_ms = settings.timeout_ms,
            "tier added"
        );
        self.chain.push(ChainEntry { tier, settings });
    }

    /// Tier ids in chain order.
    pub fn tier_order(&self) -> Vec<TierId> {
        self.chain.iter().map(|e| e.tier.id()).collect()
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn stats(&self) -> RouterStats {
        self.stats.snapshot()
    }

    /// Resolve `request` to a tool call. Never fails: problems are reported in
    /// the result's `error` field with zero confidence.
    pub async fn resolve(&self, request: &RoutingRequest) -> RoutingResult {
        let started = Instant::now();
        let result = self.run_chain(request, started).await;

        self.stats.record_request(result.is_resolved(), result.latency_ms);
        record_resolve(result.is_resolved());
        result
    }

    async fn run_chain(&self, request: &RoutingRequest, started: Instant) -> RoutingResult {
        let candidates: Vec<&ChainEntry> = match request.pinned_tier {
            Some(pinned) => self
                .chain
                .iter()
                .filter(|e| e.settings.enabled && e.tier.id() == pinned)
                .take(1)
                .collect(),
            None => self.chain.iter().filter(|e| e.settings.enabled).collect(),
        };

        let Some(last_index) = candidates.len().checked_sub(1) else {
            let (tier, message) = match request.pinned_tier {
                Some(tier) => (tier, format!("tier {tier} is not configured")),
                None => (TierId::Fallback, "no tiers configured".to_string()),
            };
            return RoutingResult::failed(tier, message, elapsed_ms(started));
        };

        let mut failures = Vec::with_capacity(candidates.len());
        for (index, entry) in candidates.iter().enumerate() {
            let tier_id = entry.tier.id();
            let attempt_started = Instant::now();
            let attempted =
                tokio::time::timeout(entry.settings.timeout(), entry.tier.attempt(request)).await;
            let attempt_ms = elapsed_ms(attempt_started);

            let (outcome, step) = self.judge(entry, index == last_index, attempted);
            self.stats.record_attempt(tier_id, outcome, attempt_ms);
            record_tier_attempt(tier_id, outcome.label(), attempt_ms / 1000.0);

            match step {
                Ok(decision) => {
                    debug!(
                        tier = %tier_id,
                        tool = decision.tool_name.as_str(),
                        confidence = decision.confidence,
                        latency_ms = attempt_ms,
                        "request resolved"
                    );
                    return RoutingResult::decided(
                        tier_id,
                        decision.tool_name,
                        decision.arguments,
                        decision.confidence,
                        elapsed_ms(started),
                    );
                }
                Err(reason) => {
                    match outcome {
                        AttemptOutcome::Error | AttemptOutcome::Timeout => warn!(
                            tier = %entry.tier.name(),
                            reason = reason.as_str(),
                            "tier failed, falling through"
                        ),
                        _ => debug!(
                            tier = %entry.tier.name(),
                            reason = reason.as_str(),
                            "falling through"
                        ),
                    }
                    failures.push(format!("{tier_id}: {reason}"));
                }
            }
        }

        RoutingResult::failed(
            candidates[last_index].tier.id(),
            failures.join("; "),
            elapsed_ms(started),
        )
    }

    /// Classify one finished attempt and decide whether it ends the chain.
    fn judge(
        &self,
        entry: &ChainEntry,
        final_tier: bool,
        attempted: Result<Result<Option<TierDecision>, SwitchyardError>, Elapsed>,
    ) -> (AttemptOutcome, Result<TierDecision, String>) {
        let tier = entry.tier.id();
        let decision = match attempted {
            Err(_) => {
                let err = SwitchyardError::TierTimeout {
                    tier,
                    duration: entry.settings.timeout(),
                };
                return (AttemptOutcome::Timeout, Err(err.to_string()));
            }
            Ok(Err(err)) => return (AttemptOutcome::Error, Err(err.to_string())),
            Ok(Ok(None)) => return (AttemptOutcome::Decline, Err("declined".into())),
            Ok(Ok(Some(decision))) => decision,
        };

        if let Err(message) = self.catalog.check(&decision.tool_name, &decision.arguments) {
            let err = SwitchyardError::ParseError { tier, message };
            return (AttemptOutcome::Error, Err(err.to_string()));
        }

        let confidence = clamp_confidence(decision.confidence);
        if final_tier || confidence >= entry.settings.min_confidence {
            (
                AttemptOutcome::Success,
                Ok(TierDecision {
                    confidence,
                    ..decision
                }),
            )
        } else {
            (
                AttemptOutcome::BelowFloor,
                Err(format!(
                    "confidence {confidence:.2} below floor {:.2}",
                    entry.settings.min_confidence
                )),
            )
        }
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
