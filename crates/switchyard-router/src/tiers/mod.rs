// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in resolution tiers.

pub mod completion;
pub mod fallback;
pub mod trained;

pub use completion::{parse_decision, CompletionTier};
pub use fallback::{FallbackTier, KeywordRule};
pub use trained::TrainedTier;
