// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The capability every resolution tier implements.

use async_trait::async_trait;

use crate::error::SwitchyardError;
use crate::types::{Arguments, RoutingRequest, TierId};

/// A tier's candidate answer, before the router applies floors and the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct TierDecision {
    pub tool_name: String,
    pub arguments: Arguments,
    /// Native confidence in `[0.0, 1.0]`.
    pub confidence: f64,
}

impl TierDecision {
    pub fn new(tool_name: impl Into<String>, arguments: Arguments, confidence: f64) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
            confidence,
        }
    }
}

/// One strategy in the router's ordered fallback chain.
///
/// `attempt` returns `Ok(None)` when the tier has no candidate for the query
/// (a decline), and `Err` when it could not run or produced unusable output.
/// Both cause fallthrough. Implementations must not mutate shared model
/// state; the router may call `attempt` from many tasks at once.
#[async_trait]
pub trait ResolutionTier: Send + Sync + 'static {
    /// Which slot of the chain this tier fills.
    fn id(&self) -> TierId;

    /// Human-readable name for logs (defaults to the tier id).
    fn name(&self) -> String {
        self.id().to_string()
    }

    async fn attempt(
        &self,
        request: &RoutingRequest,
    ) -> Result<Option<TierDecision>, SwitchyardError>;
}
