// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-trial epoch spike counts
//!
//! Converts one trial's spike sequence into four scalars: spikes in the
//! sample, delay, and response periods, plus a wide preference window
//! spanning all three. Windows are half-open `[start, end)` on the
//! trial-relative time axis:
//!
//! ```text
//! sample      = [pole_in,  pole_out)
//! delay       = [pole_out, cue)
//! response    = [cue,      cue + response_s)
//! preference  = [pole_in,  cue + response_s)
//! ```
//!
//! A trial with no spikes counts as a zero vector and stays in every mean.

use crate::slicer::TrialSpikes;
use spikealign_structures::{EpochBounds, Trial};

/// Epoch-count vector: sample, delay, response, preference window
pub type EpochCounts = [f64; 4];

pub const EPOCH_SAMPLE: usize = 0;
pub const EPOCH_DELAY: usize = 1;
pub const EPOCH_RESPONSE: usize = 2;
pub const EPOCH_PREFERENCE: usize = 3;

/// Default response-period duration after the go cue, in seconds
pub const DEFAULT_RESPONSE_S: f64 = 1.5;

fn in_window(t: f64, start: f64, end: f64) -> bool {
    t >= start && t < end
}

/// Count one trial's spikes per epoch
pub fn count_epochs(spikes: &[f64], bounds: &EpochBounds, response_s: f64) -> EpochCounts {
    let response_end = bounds.cue + response_s;
    let mut counts = [0.0; 4];
    for &t in spikes {
        if in_window(t, bounds.pole_in, bounds.pole_out) {
            counts[EPOCH_SAMPLE] += 1.0;
        }
        if in_window(t, bounds.pole_out, bounds.cue) {
            counts[EPOCH_DELAY] += 1.0;
        }
        if in_window(t, bounds.cue, response_end) {
            counts[EPOCH_RESPONSE] += 1.0;
        }
        if in_window(t, bounds.pole_in, response_end) {
            counts[EPOCH_PREFERENCE] += 1.0;
        }
    }
    counts
}

/// Count epochs for a whole trial set, in the given trial order
///
/// Trials absent from `spike_map` contribute zero vectors.
pub fn count_for_trials(
    trials: &[&Trial],
    spike_map: &TrialSpikes,
    response_s: f64,
) -> Vec<EpochCounts> {
    trials
        .iter()
        .map(|trial| {
            let spikes = spike_map
                .get(&trial.trial_id)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            count_epochs(spikes, &trial.epochs, response_s)
        })
        .collect()
}

/// Column-wise mean of a set of epoch-count vectors
///
/// An empty set yields the zero vector; callers comparing means must have
/// already guarded trial counts.
pub fn mean_counts(rows: &[EpochCounts]) -> EpochCounts {
    let mut mean = [0.0; 4];
    if rows.is_empty() {
        return mean;
    }
    for row in rows {
        for (m, v) in mean.iter_mut().zip(row) {
            *m += v;
        }
    }
    let n = rows.len() as f64;
    for m in &mut mean {
        *m /= n;
    }
    mean
}

/// Extract one epoch's counts across a trial set
pub fn epoch_column(rows: &[EpochCounts], epoch: usize) -> Vec<f64> {
    rows.iter().map(|row| row[epoch]).collect()
}
