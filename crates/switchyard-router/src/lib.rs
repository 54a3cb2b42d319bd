// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decision router for the Switchyard engine.
//!
//! Maps a natural-language request to a tool call through an ordered chain
//! of [`ResolutionTier`](switchyard_core::ResolutionTier)s: completion-backed
//! tiers (embedded and remote), the trained tier serving the production
//! artifact, and a keyword fallback. The serving path never returns an error;
//! see [`Router::resolve`].

pub mod backend;
pub mod builder;
pub mod router;
pub mod stats;
pub mod tiers;

pub use backend::{CompletionBackend, CompletionPrompt, HttpCompletionBackend};
pub use builder::build_router;
pub use router::Router;
pub use stats::{AttemptOutcome, RouterStats, TierStats};
pub use tiers::{CompletionTier, FallbackTier, KeywordRule, TrainedTier};
