// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The lock-free reference to the model currently serving traffic.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use switchyard_core::ModelArtifact;

use crate::trained::TrainedModel;

/// A loaded model together with the artifact metadata it came from.
#[derive(Debug, Clone)]
pub struct ServingModel {
    pub artifact: ModelArtifact,
    pub model: TrainedModel,
}

/// Shared between the router (readers) and version control (the one writer).
///
/// Readers call `load_full()` and keep their `Arc` for the whole request, so a
/// concurrent swap never changes the model under an in-flight lookup.
pub type ServingSlot = Arc<ArcSwapOption<ServingModel>>;

pub fn empty_slot() -> ServingSlot {
    Arc::new(ArcSwapOption::empty())
}

pub fn slot_with(model: ServingModel) -> ServingSlot {
    Arc::new(ArcSwapOption::from_pointee(model))
}
