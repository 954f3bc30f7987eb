// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Trial-id resolution
//!
//! Filters a session's trial table down to an ordered id set: one report
//! side, one trial condition, one stimulation configuration, clamped to the
//! inclusive id range the unit was actually held for. An empty result is a
//! valid answer, not an error.

use spikealign_structures::{ReportSide, StimId, Trial, TrialCondition};

/// Trial-selection filter for one side of a paired comparison
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialFilter {
    pub side: ReportSide,
    pub condition: TrialCondition,
    pub stim_id: StimId,
}

impl TrialFilter {
    pub fn matches(&self, trial: &Trial) -> bool {
        trial.outcome.report_side() == Some(self.side)
            && self.condition.matches_trial(trial)
            && trial.stim_id == self.stim_id
    }
}

/// Resolve the ordered set of trial ids matching `filter` within
/// `[min_trial_id, max_trial_id]`
pub fn resolve(
    trials: &[Trial],
    min_trial_id: i32,
    max_trial_id: i32,
    filter: &TrialFilter,
) -> Vec<i32> {
    let mut ids: Vec<i32> = trials
        .iter()
        .filter(|t| t.trial_id >= min_trial_id && t.trial_id <= max_trial_id)
        .filter(|t| filter.matches(t))
        .map(|t| t.trial_id)
        .collect();
    ids.sort_unstable();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use spikealign_structures::{EpochBounds, TrialOutcome};

    fn trial(id: i32, outcome: TrialOutcome, stim: &str) -> Trial {
        Trial {
            trial_id: id,
            epochs: EpochBounds {
                pole_in: 0.5,
                pole_out: 1.8,
                cue: 3.1,
            },
            outcome,
            early_lick: false,
            stim_id: StimId::from(stim),
        }
    }

    #[test]
    fn test_resolve_filters_side_and_range() {
        let trials = vec![
            trial(1, TrialOutcome::HitR, "0"),
            trial(2, TrialOutcome::HitL, "0"),
            trial(3, TrialOutcome::ErrR, "0"),
            trial(9, TrialOutcome::HitR, "0"), // outside unit span
        ];
        let filter = TrialFilter {
            side: ReportSide::Right,
            condition: TrialCondition::AllReport,
            stim_id: StimId::control(),
        };
        assert_eq!(resolve(&trials, 1, 5, &filter), vec![1, 3]);
    }

    #[test]
    fn test_resolve_filters_stim_condition() {
        let trials = vec![
            trial(1, TrialOutcome::HitR, "0"),
            trial(2, TrialOutcome::HitR, "2"),
        ];
        let filter = TrialFilter {
            side: ReportSide::Right,
            condition: TrialCondition::AllReport,
            stim_id: StimId::from("2"),
        };
        assert_eq!(resolve(&trials, 1, 10, &filter), vec![2]);
    }

    #[test]
    fn test_resolve_empty_is_not_an_error() {
        let trials = vec![trial(1, TrialOutcome::HitL, "0")];
        let filter = TrialFilter {
            side: ReportSide::Right,
            condition: TrialCondition::HitOnly,
            stim_id: StimId::control(),
        };
        assert!(resolve(&trials, 1, 10, &filter).is_empty());
    }

    #[test]
    fn test_resolve_returns_sorted_ids() {
        let trials = vec![
            trial(7, TrialOutcome::HitR, "0"),
            trial(2, TrialOutcome::HitR, "0"),
            trial(5, TrialOutcome::HitR, "0"),
        ];
        let filter = TrialFilter {
            side: ReportSide::Right,
            condition: TrialCondition::AllReport,
            stim_id: StimId::control(),
        };
        assert_eq!(resolve(&trials, 0, 100, &filter), vec![2, 5, 7]);
    }
}
