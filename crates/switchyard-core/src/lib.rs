// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Switchyard decision-routing engine.
//!
//! This crate provides the data model shared by every component (requests,
//! results, training examples, artifacts, validation reports), the single
//! error type, the [`ResolutionTier`] trait that router tiers implement, and
//! the query normalization all components agree on.

pub mod catalog;
pub mod error;
pub mod recording;
pub mod report;
pub mod text;
pub mod traits;
pub mod types;

pub use catalog::{ToolCatalog, ToolSpec};
pub use error::SwitchyardError;
pub use report::{Observation, ValidationReport, ValidationThresholds};
pub use traits::{ResolutionTier, TierDecision};
pub use types::{
    Arguments, ModelArtifact, ModelKind, Provenance, RoutingRequest, RoutingResult, SourceKind,
    Stage, TierId, TrainingExample,
};
