// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic train / held-out split.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use switchyard_core::{SwitchyardError, TrainingExample};

/// Examples partitioned for training and validation.
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub train: Vec<TrainingExample>,
    pub held_out: Vec<TrainingExample>,
}

/// Shuffle with a seeded RNG and hold out `ratio` of the examples.
///
/// The same input order, ratio, and seed always produce the same split. Both
/// halves are non-empty, so at least two examples are required.
pub fn split_held_out(
    examples: Vec<TrainingExample>,
    ratio: f64,
    seed: u64,
) -> Result<DatasetSplit, SwitchyardError> {
    if !(ratio > 0.0 && ratio < 1.0) {
        return Err(SwitchyardError::InvalidInput(format!(
            "held-out ratio must be within (0, 1), got {ratio}"
        )));
    }
    if examples.len() < 2 {
        return Err(SwitchyardError::InvalidInput(format!(
            "need at least 2 examples to split, got {}",
            examples.len()
        )));
    }

    let mut shuffled = examples;
    shuffled.shuffle(&mut StdRng::seed_from_u64(seed));

    let n = shuffled.len();
    let held = ((n as f64) * ratio).round() as usize;
    let held = held.clamp(1, n - 1);
    let held_out = shuffled.split_off(n - held);

    Ok(DatasetSplit {
        train: shuffled,
        held_out,
    })
}
