// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-trial spike slicing
//!
//! Partitions a unit's flat (spike time, trial id) arrays into per-trial
//! spike-time sequences. Pure filtering: the times are already trial-relative
//! and no shifting happens here. Every requested trial id gets an entry, an
//! empty one when the unit recorded nothing on that trial.

use ahash::AHashMap;
use spikealign_structures::UnitSpikes;

/// Per-trial spike times, keyed by trial id. Each sequence is sorted
/// ascending regardless of the input order.
pub type TrialSpikes = AHashMap<i32, Vec<f64>>;

/// Slice a unit's spike arrays down to the requested trial ids
pub fn slice_spikes(unit: &UnitSpikes, trial_ids: &[i32]) -> TrialSpikes {
    let mut by_trial: TrialSpikes = AHashMap::with_capacity(trial_ids.len());
    for &id in trial_ids {
        by_trial.insert(id, Vec::new());
    }

    for (time, trial) in unit.iter() {
        if let Some(spikes) = by_trial.get_mut(&trial) {
            spikes.push(time);
        }
    }

    // Raw spike times carry no ordering guarantee
    for spikes in by_trial.values_mut() {
        spikes.sort_unstable_by(f64::total_cmp);
    }
    by_trial
}
