// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-unit selectivity analysis
//!
//! Orchestrates trial resolution, spike slicing, epoch counting, significance
//! testing, and PSTH estimation for one (unit, trial condition, stimulation
//! configuration) key:
//!
//! 1. Clamp trial selection to the unit's observed trial span.
//! 2. Resolve right-report and left-report trial-id sets.
//! 3. Guard: both sides need strictly more than `min_trials_per_side` trials.
//! 4. t-test the per-epoch spike counts (sample, delay, response) between
//!    sides; the unit is selective if any epoch is significant.
//! 5. Shuffle each side and split it into a screening prefix and a disjoint
//!    test remainder; the side with the higher screening-subset mean over the
//!    wide preference window is the preferred side.
//! 6. Report full-set PSTHs per side and test-subset PSTHs for the
//!    preferred/non-preferred pair.
//!
//! All intermediate stages accumulate in locals; the [`SelectivityResult`] is
//! constructed once, at the end, and never mutated afterwards.

use ahash::AHashMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::epochs::{self, EPOCH_DELAY, EPOCH_PREFERENCE, EPOCH_RESPONSE, EPOCH_SAMPLE};
use crate::epochs::{EpochCounts, DEFAULT_RESPONSE_S};
use crate::error::Result;
use crate::psth::{self, PsthWindow};
use crate::slicer::{self, TrialSpikes};
use crate::split;
use crate::stats;
use crate::trial_index::{self, TrialFilter};
use spikealign_structures::{
    PhotoStimCondition, ReportSide, StimId, Trial, TrialCondition, UnitKey, UnitSpikes,
};

/// Baseline analyses need more than this many trials per side
pub const BASELINE_MIN_TRIALS: usize = 8;
/// Stimulation-aligned analyses relax the guard to this
pub const STIM_ON_MIN_TRIALS: usize = 2;
/// Two-sided significance level for the epoch t-tests
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Preferred trial type of a selective unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preference {
    Right,
    Left,
    /// Not selective; no preference is assigned
    None,
}

impl From<ReportSide> for Preference {
    fn from(side: ReportSide) -> Self {
        match side {
            ReportSide::Right => Preference::Right,
            ReportSide::Left => Preference::Left,
        }
    }
}

/// Parameters for one analysis task
///
/// The guard-threshold/condition/stim variants of this analysis differ only
/// in these fields; there is one orchestration path.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisParams {
    pub condition: TrialCondition,
    pub stim_id: StimId,
    /// Strict lower bound: a side with `<= min_trials_per_side` trials skips
    pub min_trials_per_side: usize,
    /// Screening-subset size for preference determination
    pub screen_size: usize,
    pub alpha: f64,
    /// Response-period duration after the go cue, seconds
    pub response_s: f64,
    pub window: PsthWindow,
}

impl AnalysisParams {
    /// Baseline parameters for a stimulation configuration; the screening
    /// size comes from the configuration's metadata
    pub fn baseline(condition: TrialCondition, stim: &PhotoStimCondition) -> Self {
        Self {
            condition,
            stim_id: stim.stim_id.clone(),
            min_trials_per_side: BASELINE_MIN_TRIALS,
            screen_size: stim.screen_size(),
            alpha: DEFAULT_ALPHA,
            response_s: DEFAULT_RESPONSE_S,
            window: PsthWindow::default(),
        }
    }
}

/// Why a unit/condition task produced no result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The unit has no spike assignments at all
    NoSpikes,
    /// One side's trial set is at or below the guard threshold
    InsufficientTrials {
        side: ReportSide,
        got: usize,
        need_more_than: usize,
    },
    /// The screening subset consumed the whole side
    EmptyTestSubset { side: ReportSide },
    /// Stim-aligned mode: the baseline unit was not selective
    BaselineNotSelective,
    /// Stim-aligned mode: no baseline record exists for this unit
    MissingBaseline,
    /// Stim-aligned mode: control or excluded stimulation configuration
    ExcludedStim { stim_id: StimId },
}

impl core::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SkipReason::NoSpikes => write!(f, "unit has no spike assignments"),
            SkipReason::InsufficientTrials {
                side,
                got,
                need_more_than,
            } => write!(
                f,
                "{side} side has {got} trials, needs more than {need_more_than}"
            ),
            SkipReason::EmptyTestSubset { side } => {
                write!(f, "{side} side has no test trials after screening")
            }
            SkipReason::BaselineNotSelective => write!(f, "baseline unit is not selective"),
            SkipReason::MissingBaseline => write!(f, "no baseline record for this unit"),
            SkipReason::ExcludedStim { stim_id } => {
                write!(f, "stimulation configuration '{stim_id}' is not analyzable")
            }
        }
    }
}

/// Outcome of one analysis task: a result, or a reasoned skip
///
/// Skips are expected over real data and never abort a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Analyzed(T),
    Skipped(SkipReason),
}

impl<T> Outcome<T> {
    pub fn analyzed(self) -> Option<T> {
        match self {
            Outcome::Analyzed(value) => Some(value),
            Outcome::Skipped(_) => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped(_))
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Outcome::Skipped(reason) => Some(reason),
            Outcome::Analyzed(_) => None,
        }
    }
}

/// Frozen per-(unit, condition, stim) analysis record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectivityResult {
    pub unit: UnitKey,
    pub condition: TrialCondition,
    pub stim_id: StimId,

    pub r_trial_number: usize,
    pub l_trial_number: usize,
    pub r_trial_ids: Vec<i32>,
    pub l_trial_ids: Vec<i32>,

    /// Mean epoch counts over the full right/left sets
    pub mean_fr_r: EpochCounts,
    pub mean_fr_l: EpochCounts,

    /// Bin grid shared by every PSTH in this record
    pub window: PsthWindow,
    /// Full-set rate estimates per side
    pub psth_r: Vec<f64>,
    pub psth_l: Vec<f64>,

    pub sample_selectivity: bool,
    pub delay_selectivity: bool,
    pub response_selectivity: bool,

    /// Screening subsets the preference was determined from
    pub trial_ids_screened_r: Vec<i32>,
    pub trial_ids_screened_l: Vec<i32>,
    pub preference: Preference,

    /// Test-subset rate estimates, assigned by screening winner
    pub psth_prefer: Vec<f64>,
    pub psth_non_prefer: Vec<f64>,
    /// Preferred minus non-preferred, derived
    pub psth_diff: Vec<f64>,
}

impl SelectivityResult {
    /// Any epoch significant
    pub fn is_selective(&self) -> bool {
        self.sample_selectivity || self.delay_selectivity || self.response_selectivity
    }

    pub fn time_window(&self) -> (f64, f64) {
        self.window.time_window()
    }

    pub fn bin_edges(&self) -> Vec<f64> {
        self.window.edges()
    }
}

fn trials_by_id(trials: &[Trial]) -> AHashMap<i32, &Trial> {
    trials.iter().map(|t| (t.trial_id, t)).collect()
}

fn select<'a>(by_id: &AHashMap<i32, &'a Trial>, ids: &[i32]) -> Vec<&'a Trial> {
    ids.iter().filter_map(|id| by_id.get(id).copied()).collect()
}

/// Shift each trial's spikes onto the cue-aligned axis (0 = go cue)
fn cue_aligned(trials: &[&Trial], spike_map: &TrialSpikes) -> Vec<Vec<f64>> {
    trials
        .iter()
        .map(|trial| {
            spike_map
                .get(&trial.trial_id)
                .map(Vec::as_slice)
                .unwrap_or(&[])
                .iter()
                .map(|t| t - trial.epochs.cue)
                .collect()
        })
        .collect()
}

fn elementwise_diff(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// Analyze one unit under one condition/stim key
///
/// Returns `Outcome::Skipped` for data-dependent shortfalls; errors only on
/// contract violations (see [`crate::error::AnalysisError`]).
pub fn analyze_unit<R: Rng + ?Sized>(
    unit_key: &UnitKey,
    unit: &UnitSpikes,
    trials: &[Trial],
    params: &AnalysisParams,
    rng: &mut R,
) -> Result<Outcome<SelectivityResult>> {
    let Some((min_trial, max_trial)) = unit.trial_span() else {
        return Ok(skip(unit_key, SkipReason::NoSpikes));
    };

    let filter_for = |side: ReportSide| TrialFilter {
        side,
        condition: params.condition,
        stim_id: params.stim_id.clone(),
    };
    let r_ids = trial_index::resolve(trials, min_trial, max_trial, &filter_for(ReportSide::Right));
    let l_ids = trial_index::resolve(trials, min_trial, max_trial, &filter_for(ReportSide::Left));

    for (side, ids) in [(ReportSide::Right, &r_ids), (ReportSide::Left, &l_ids)] {
        if ids.len() <= params.min_trials_per_side {
            return Ok(skip(
                unit_key,
                SkipReason::InsufficientTrials {
                    side,
                    got: ids.len(),
                    need_more_than: params.min_trials_per_side,
                },
            ));
        }
    }

    let by_id = trials_by_id(trials);
    let r_trials = select(&by_id, &r_ids);
    let l_trials = select(&by_id, &l_ids);

    let spikes_r = slicer::slice_spikes(unit, &r_ids);
    let spikes_l = slicer::slice_spikes(unit, &l_ids);

    let counts_r = epochs::count_for_trials(&r_trials, &spikes_r, params.response_s);
    let counts_l = epochs::count_for_trials(&l_trials, &spikes_l, params.response_s);

    // Epoch-wise significance between sides; each epoch is its own test
    let selectivity_for = |epoch: usize| {
        stats::ttest_ind(
            &epochs::epoch_column(&counts_r, epoch),
            &epochs::epoch_column(&counts_l, epoch),
        )
        .significant(params.alpha)
    };
    let sample_selectivity = selectivity_for(EPOCH_SAMPLE);
    let delay_selectivity = selectivity_for(EPOCH_DELAY);
    let response_selectivity = selectivity_for(EPOCH_RESPONSE);
    let selective = sample_selectivity || delay_selectivity || response_selectivity;

    let psth_r = psth::estimate(&cue_aligned(&r_trials, &spikes_r), &params.window)?;
    let psth_l = psth::estimate(&cue_aligned(&l_trials, &spikes_l), &params.window)?;

    // Screen/test split; preference comes from the screening subsets only
    let split_r = split::screen_test_split(&r_ids, params.screen_size, rng);
    let split_l = split::screen_test_split(&l_ids, params.screen_size, rng);
    for (side, part) in [(ReportSide::Right, &split_r), (ReportSide::Left, &split_l)] {
        if part.test.is_empty() {
            return Ok(skip(unit_key, SkipReason::EmptyTestSubset { side }));
        }
    }

    let mean_screen_r = epochs::mean_counts(&epochs::count_for_trials(
        &select(&by_id, &split_r.screened),
        &spikes_r,
        params.response_s,
    ));
    let mean_screen_l = epochs::mean_counts(&epochs::count_for_trials(
        &select(&by_id, &split_l.screened),
        &spikes_l,
        params.response_s,
    ));
    let screen_winner = if mean_screen_r[EPOCH_PREFERENCE] > mean_screen_l[EPOCH_PREFERENCE] {
        ReportSide::Right
    } else {
        ReportSide::Left
    };

    let psth_r_test = psth::estimate(
        &cue_aligned(&select(&by_id, &split_r.test), &spikes_r),
        &params.window,
    )?;
    let psth_l_test = psth::estimate(
        &cue_aligned(&select(&by_id, &split_l.test), &spikes_l),
        &params.window,
    )?;
    let (psth_prefer, psth_non_prefer) = match screen_winner {
        ReportSide::Right => (psth_r_test, psth_l_test),
        ReportSide::Left => (psth_l_test, psth_r_test),
    };
    let psth_diff = elementwise_diff(&psth_prefer, &psth_non_prefer);

    // A non-selective unit carries no preference label
    let preference = if selective {
        Preference::from(screen_winner)
    } else {
        Preference::None
    };

    Ok(Outcome::Analyzed(SelectivityResult {
        unit: unit_key.clone(),
        condition: params.condition,
        stim_id: params.stim_id.clone(),
        r_trial_number: r_ids.len(),
        l_trial_number: l_ids.len(),
        r_trial_ids: r_ids,
        l_trial_ids: l_ids,
        mean_fr_r: epochs::mean_counts(&counts_r),
        mean_fr_l: epochs::mean_counts(&counts_l),
        window: params.window,
        psth_r,
        psth_l,
        sample_selectivity,
        delay_selectivity,
        response_selectivity,
        trial_ids_screened_r: split_r.screened,
        trial_ids_screened_l: split_l.screened,
        preference,
        psth_prefer,
        psth_non_prefer,
        psth_diff,
    }))
}

fn skip<T>(unit_key: &UnitKey, reason: SkipReason) -> Outcome<T> {
    trace!(target: "spikealign-engine", unit = %unit_key, %reason, "skipping analysis");
    Outcome::Skipped(reason)
}
