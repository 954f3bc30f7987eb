// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Stimulation-aligned PSTHs for selective units
//!
//! Re-estimates a unit's preferred/non-preferred PSTH pair on the trials of
//! one specific stimulation configuration, reusing the preference label and
//! bin grid of the unit's no-stimulation baseline result. Nothing is
//! re-tested here: a unit that was not selective at baseline is skipped, and
//! the control/excluded configurations are meaningless in this mode. The
//! trial guard relaxes to more than [`STIM_ON_MIN_TRIALS`] per side because
//! stimulation trials are sparse.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::psth::{self, PsthWindow};
use crate::selectivity::{
    Outcome, Preference, SelectivityResult, SkipReason, STIM_ON_MIN_TRIALS,
};
use crate::slicer;
use crate::trial_index::{self, TrialFilter};
use spikealign_structures::{
    PhotoStimCondition, ReportSide, StimId, Trial, TrialCondition, UnitKey, UnitSpikes,
};

use ahash::AHashMap;

/// Frozen per-(unit, stim configuration) record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StimAlignedPsth {
    pub unit: UnitKey,
    pub stim_id: StimId,
    pub condition: TrialCondition,
    /// Preference carried over from the baseline result
    pub preference: Preference,

    pub r_trial_number: usize,
    pub l_trial_number: usize,
    pub r_trial_ids: Vec<i32>,
    pub l_trial_ids: Vec<i32>,

    /// Bin grid reused from the baseline result
    pub window: PsthWindow,
    pub psth_r: Vec<f64>,
    pub psth_l: Vec<f64>,
    pub psth_prefer: Vec<f64>,
    pub psth_non_prefer: Vec<f64>,
    pub psth_diff: Vec<f64>,
}

/// Estimate stimulation-trial PSTHs for one unit against its baseline
pub fn analyze_stim_aligned(
    unit_key: &UnitKey,
    unit: &UnitSpikes,
    trials: &[Trial],
    stim: &PhotoStimCondition,
    baseline: &SelectivityResult,
) -> Result<Outcome<StimAlignedPsth>> {
    if stim.stim_id.is_control() || stim.stim_id.is_excluded() {
        return Ok(Outcome::Skipped(SkipReason::ExcludedStim {
            stim_id: stim.stim_id.clone(),
        }));
    }
    let preferred_side = match baseline.preference {
        Preference::Right => ReportSide::Right,
        Preference::Left => ReportSide::Left,
        Preference::None => {
            return Ok(Outcome::Skipped(SkipReason::BaselineNotSelective));
        }
    };

    let Some((min_trial, max_trial)) = unit.trial_span() else {
        return Ok(Outcome::Skipped(SkipReason::NoSpikes));
    };
    let filter_for = |side: ReportSide| TrialFilter {
        side,
        condition: baseline.condition,
        stim_id: stim.stim_id.clone(),
    };
    let r_ids = trial_index::resolve(trials, min_trial, max_trial, &filter_for(ReportSide::Right));
    let l_ids = trial_index::resolve(trials, min_trial, max_trial, &filter_for(ReportSide::Left));
    for (side, ids) in [(ReportSide::Right, &r_ids), (ReportSide::Left, &l_ids)] {
        if ids.len() <= STIM_ON_MIN_TRIALS {
            return Ok(Outcome::Skipped(SkipReason::InsufficientTrials {
                side,
                got: ids.len(),
                need_more_than: STIM_ON_MIN_TRIALS,
            }));
        }
    }

    let by_id: AHashMap<i32, &Trial> = trials.iter().map(|t| (t.trial_id, t)).collect();
    let aligned_for = |ids: &[i32]| -> Vec<Vec<f64>> {
        let spike_map = slicer::slice_spikes(unit, ids);
        ids.iter()
            .filter_map(|id| by_id.get(id).copied())
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
    };

    let window = baseline.window;
    let psth_r = psth::estimate(&aligned_for(&r_ids), &window)?;
    let psth_l = psth::estimate(&aligned_for(&l_ids), &window)?;
    let (psth_prefer, psth_non_prefer) = match preferred_side {
        ReportSide::Right => (psth_r.clone(), psth_l.clone()),
        ReportSide::Left => (psth_l.clone(), psth_r.clone()),
    };
    let psth_diff: Vec<f64> = psth_prefer
        .iter()
        .zip(&psth_non_prefer)
        .map(|(p, n)| p - n)
        .collect();

    Ok(Outcome::Analyzed(StimAlignedPsth {
        unit: unit_key.clone(),
        stim_id: stim.stim_id.clone(),
        condition: baseline.condition,
        preference: baseline.preference,
        r_trial_number: r_ids.len(),
        l_trial_number: l_ids.len(),
        r_trial_ids: r_ids,
        l_trial_ids: l_ids,
        window,
        psth_r,
        psth_l,
        psth_prefer,
        psth_non_prefer,
        psth_diff,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selectivity::test_fixtures::{bounds, control_params, session, unit_key};
    use crate::selectivity::analyze_unit;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use spikealign_structures::TrialOutcome;

    fn lookup(id: &str) -> PhotoStimCondition {
        PhotoStimCondition::lookup_contents()
            .into_iter()
            .find(|c| c.stim_id == StimId::from(id))
            .unwrap()
    }

    /// Baseline session plus a block of stim trials under config "2"
    fn session_with_stim(n_stim_per_side: usize) -> (UnitSpikes, Vec<Trial>) {
        let (unit, mut trials) = session(20, 20, &[5, 4, 6, 5], &[1, 0, 2, 1]);
        let mut spike_times: Vec<f64> = unit.spike_times().to_vec();
        let mut spike_trials: Vec<i32> = unit.spike_trials().to_vec();

        let mut next_id = 2000;
        for side in [TrialOutcome::HitR, TrialOutcome::HitL] {
            for _ in 0..n_stim_per_side {
                trials.push(Trial {
                    trial_id: next_id,
                    epochs: bounds(),
                    outcome: side,
                    early_lick: false,
                    stim_id: StimId::from("2"),
                });
                spike_times.push(bounds().cue + 0.1);
                spike_trials.push(next_id);
                next_id += 1;
            }
        }
        (UnitSpikes::new(spike_times, spike_trials).unwrap(), trials)
    }

    fn baseline_for(unit: &UnitSpikes, trials: &[Trial]) -> SelectivityResult {
        analyze_unit(
            &unit_key(),
            unit,
            trials,
            &control_params(),
            &mut StdRng::seed_from_u64(11),
        )
        .unwrap()
        .analyzed()
        .unwrap()
    }

    #[test]
    fn test_stim_aligned_reuses_baseline_preference() {
        let (unit, trials) = session_with_stim(4);
        let baseline = baseline_for(&unit, &trials);
        let result = analyze_stim_aligned(&unit_key(), &unit, &trials, &lookup("2"), &baseline)
            .unwrap()
            .analyzed()
            .unwrap();

        assert_eq!(result.preference, baseline.preference);
        assert_eq!(result.window, baseline.window);
        assert_eq!(result.r_trial_number, 4);
        assert_eq!(result.l_trial_number, 4);
        // only the stim-condition trials are selected
        assert!(result.r_trial_ids.iter().all(|&id| id >= 2000));
    }

    #[test]
    fn test_relaxed_guard_needs_more_than_two() {
        let (unit, trials) = session_with_stim(2);
        let baseline = baseline_for(&unit, &trials);
        let outcome =
            analyze_stim_aligned(&unit_key(), &unit, &trials, &lookup("2"), &baseline).unwrap();
        assert!(matches!(
            outcome.skip_reason(),
            Some(SkipReason::InsufficientTrials { got: 2, .. })
        ));
    }

    #[test]
    fn test_control_and_excluded_configs_skip() {
        let (unit, trials) = session_with_stim(4);
        let baseline = baseline_for(&unit, &trials);
        for id in ["0", "NaN"] {
            let outcome =
                analyze_stim_aligned(&unit_key(), &unit, &trials, &lookup(id), &baseline).unwrap();
            assert!(matches!(
                outcome.skip_reason(),
                Some(SkipReason::ExcludedStim { .. })
            ));
        }
    }

    #[test]
    fn test_non_selective_baseline_skips() {
        let (unit, trials) = session_with_stim(4);
        let mut baseline = baseline_for(&unit, &trials);
        baseline.sample_selectivity = false;
        baseline.delay_selectivity = false;
        baseline.response_selectivity = false;
        baseline.preference = Preference::None;

        let outcome =
            analyze_stim_aligned(&unit_key(), &unit, &trials, &lookup("2"), &baseline).unwrap();
        assert_eq!(
            outcome.skip_reason(),
            Some(&SkipReason::BaselineNotSelective)
        );
    }
}
