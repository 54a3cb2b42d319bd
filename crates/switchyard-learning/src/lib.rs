// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Learning engine for the Switchyard routing engine.
//!
//! Trains a candidate model from training examples and writes it to the
//! staging area of the artifact store. Training is exclusive: within a
//! process through an engine-level mutex, across processes through an
//! advisory lock file in the staging directory.

pub mod engine;
pub mod lock;

pub use engine::LearningEngine;
pub use lock::StagingLock;
