// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output validator for Switchyard candidate artifacts.
//!
//! Replays a held-out set through a router pinned to the candidate and scores
//! the observations into a [`ValidationReport`](switchyard_core::ValidationReport).
//! The validator never writes to the artifact store.

pub mod validator;

pub use validator::{replay, Validator};
