// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command implementations behind the `switchyard` binary.

pub mod lifecycle;
pub mod resolve;
pub mod serve;
