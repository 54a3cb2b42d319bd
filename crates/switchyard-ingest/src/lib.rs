// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input processor for the Switchyard routing engine.
//!
//! Converts records from the execution-history store, the synthetic example
//! generator, and the human-correction queue into canonical
//! [`TrainingExample`](switchyard_core::TrainingExample)s. The conversions are
//! pure; the JSON Lines export is the only operation that writes anything.

pub mod jsonl;
pub mod processor;
pub mod records;
pub mod split;

pub use jsonl::{export_examples, import_examples, read_records};
pub use processor::{combine, from_corrections, from_history, from_templates, merge};
pub use records::{CorrectionEntry, HistoryRecord, SyntheticTemplate};
pub use split::{split_held_out, DatasetSplit};
