// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trained model kinds for the Switchyard routing engine.
//!
//! Two learners share one serialization contract ([`TrainedModel`]):
//! a per-tool lookup of normalized example queries ([`PatternModel`]) and a
//! naive Bayes classifier over bag-of-words vectors ([`ClassifierModel`]).
//! Both re-derive arguments for unseen queries through [`exemplar`].

pub mod classifier;
pub mod exemplar;
pub mod pattern;
pub mod slot;
pub mod trained;

pub use classifier::ClassifierModel;
pub use exemplar::{Anchor, Exemplar};
pub use pattern::{PatternModel, PATTERN_CONFIDENCE_SCALE};
pub use slot::{empty_slot, slot_with, ServingModel, ServingSlot};
pub use trained::{Prediction, TrainedModel, MODEL_FORMAT_VERSION};
