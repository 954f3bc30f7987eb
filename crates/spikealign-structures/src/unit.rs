// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Raw spike data for one sorted unit
//!
//! A unit carries two parallel arrays produced by the ingestion layer: spike
//! times (seconds, already trial-relative) and the trial id each spike was
//! assigned to. The arrays are validated to be parallel at construction;
//! nothing downstream may assume the times are sorted.

use serde::{Deserialize, Serialize};

use crate::error::{Result, StructureError};

/// Spike times and trial assignments for one unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpikes {
    spike_times: Vec<f64>,
    spike_trials: Vec<i32>,
    /// Probe channel the unit was sorted from
    pub channel: Option<u32>,
    /// Putative cell type from the sorting output, e.g. "wide width"
    pub cell_type: Option<String>,
}

impl UnitSpikes {
    /// Build a unit from its parallel spike arrays
    ///
    /// # Errors
    /// * `StructureError::ArrayMismatch` - the arrays have different lengths
    pub fn new(spike_times: Vec<f64>, spike_trials: Vec<i32>) -> Result<Self> {
        if spike_times.len() != spike_trials.len() {
            return Err(StructureError::ArrayMismatch {
                times: spike_times.len(),
                trials: spike_trials.len(),
            });
        }
        Ok(Self {
            spike_times,
            spike_trials,
            channel: None,
            cell_type: None,
        })
    }

    pub fn with_channel(mut self, channel: u32) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn with_cell_type(mut self, cell_type: impl Into<String>) -> Self {
        self.cell_type = Some(cell_type.into());
        self
    }

    /// Spike times in seconds, trial-relative. Not guaranteed sorted.
    pub fn spike_times(&self) -> &[f64] {
        &self.spike_times
    }

    /// Trial id of each spike, parallel to [`Self::spike_times`]
    pub fn spike_trials(&self) -> &[i32] {
        &self.spike_trials
    }

    pub fn len(&self) -> usize {
        self.spike_times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spike_times.is_empty()
    }

    /// Inclusive (min, max) of the observed trial assignments
    ///
    /// The unit may not have been held for the session's full trial range, so
    /// every trial selection is clamped to this observed span. `None` when
    /// the unit recorded no spikes at all.
    pub fn trial_span(&self) -> Option<(i32, i32)> {
        let first = *self.spike_trials.first()?;
        let span = self
            .spike_trials
            .iter()
            .fold((first, first), |(lo, hi), &t| (lo.min(t), hi.max(t)));
        Some(span)
    }

    /// Iterate (time, trial) pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, i32)> + '_ {
        self.spike_times
            .iter()
            .copied()
            .zip(self.spike_trials.iter().copied())
    }
}
