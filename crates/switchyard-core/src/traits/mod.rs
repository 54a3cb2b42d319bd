// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams of the routing engine.

pub mod tier;

pub use tier::{ResolutionTier, TierDecision};
