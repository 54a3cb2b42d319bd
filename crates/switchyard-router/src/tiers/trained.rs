// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The tier served by a trained model artifact.

use std::sync::Arc;

use async_trait::async_trait;
use switchyard_core::{
    ResolutionTier, RoutingRequest, SwitchyardError, TierDecision, TierId, TrainingExample,
};
use switchyard_model::{PatternModel, ServingSlot, TrainedModel};

enum Source {
    /// Whatever version control has installed as production.
    Serving(ServingSlot),
    /// A fixed model, e.g. a candidate under validation.
    Fixed { label: String, model: Arc<TrainedModel> },
}

/// Resolves queries with a pattern or classifier model.
pub struct TrainedTier {
    source: Source,
}

impl TrainedTier {
    /// Serve the production artifact, following every swap.
    pub fn serving(slot: ServingSlot) -> Self {
        Self {
            source: Source::Serving(slot),
        }
    }

    /// Serve one model regardless of what is in production.
    pub fn pinned(label: impl Into<String>, model: TrainedModel) -> Self {
        Self {
            source: Source::Fixed {
                label: label.into(),
                model: Arc::new(model),
            },
        }
    }

    /// Serve a pattern model built directly from `examples`.
    pub fn seeded(examples: &[TrainingExample]) -> Result<Self, SwitchyardError> {
        let model = PatternModel::fit(examples)?;
        Ok(Self::pinned("seeded", TrainedModel::Pattern(model)))
    }
}

#[async_trait]
impl ResolutionTier for TrainedTier {
    fn id(&self) -> TierId {
        TierId::Pattern
    }

    fn name(&self) -> String {
        match &self.source {
            Source::Serving(slot) => match slot.load().as_ref() {
                Some(current) => format!("pattern:{}", current.artifact.version),
                None => "pattern:none".into(),
            },
            Source::Fixed { label, .. } => format!("pattern:{label}"),
        }
    }

    async fn attempt(
        &self,
        request: &RoutingRequest,
    ) -> Result<Option<TierDecision>, SwitchyardError> {
        let prediction = match &self.source {
            Source::Serving(slot) => {
                let current = slot.load_full().ok_or_else(|| SwitchyardError::TierUnavailable {
                    tier: TierId::Pattern,
                    message: "no production artifact installed".into(),
                })?;
                current.model.predict(&request.query)
            }
            Source::Fixed { model, .. } => model.predict(&request.query),
        };

        Ok(prediction.map(|p| TierDecision::new(p.tool, p.arguments, p.confidence)))
    }
}
