// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Switchyard integration tests.
//!
//! Provides scripted tiers, a scripted completion backend, example fixtures,
//! and a lifecycle harness over a temporary artifact store.
//!
//! # Components
//!
//! - [`MockTier`] - Resolution tier that replays scripted steps
//! - [`MockBackend`] - Completion backend with pre-configured replies
//! - [`TestHarness`] - Store, engine, validator, version control, and router

pub mod fixtures;
pub mod harness;
pub mod mock_backend;
pub mod mock_tier;

pub use harness::TestHarness;
pub use mock_backend::MockBackend;
pub use mock_tier::{MockStep, MockTier};
