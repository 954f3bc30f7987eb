// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Parallel batch runner.

Each unit×condition analysis is independent, so the runner fans units out
over a rayon worker pool, one task per unit. Every task owns its own seeded
generator, derived from the batch base seed and the unit key, so a batch is
reproducible regardless of worker scheduling.

Soft skips (too few trials, empty test subset, missing/non-selective
baseline) are counted and logged at debug level. Hard failures (missing
upstream data, engine contract violations) fail only their own task and are
collected into the summary; an unknown stimulation-condition id fails the
whole batch before any unit is touched.
*/

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use spikealign_config::SpikealignConfig;
use spikealign_engine::psth::smooth_gaussian;
use spikealign_engine::{
    analyze_stim_aligned, analyze_unit, AnalysisParams, Outcome, PsthWindow,
    SelectivityResult, SkipReason, StimAlignedPsth,
};
use spikealign_structures::{
    PhotoStimCondition, StimId, StimKind, TrialCondition, UnitKey,
};

use crate::error::{ServiceError, ServiceResult};
use crate::traits::{ConditionStore, ResultStore, TrialStore, UnitStore};

/// Outcome counters for one batch run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub analyzed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<BatchFailure>,
}

/// One task's hard failure
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub unit: UnitKey,
    pub error: ServiceError,
}

/// Derive a task's generator seed from the batch seed and the unit key
///
/// FNV-1a over the key's display form: stable across runs, platforms, and
/// worker scheduling, so a fixed base seed reproduces every preference label.
pub fn task_seed(base_seed: u64, unit: &UnitKey) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in unit.to_string().bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash ^ base_seed
}

/// Build analysis parameters from configuration for one stim configuration
pub fn params_from_config(
    config: &SpikealignConfig,
    condition: TrialCondition,
    stim: &PhotoStimCondition,
) -> AnalysisParams {
    let screen_size = match stim.kind {
        Some(StimKind::Activation) => config.analysis.screen_size_activation,
        _ => config.analysis.screen_size_other,
    };
    AnalysisParams {
        condition,
        stim_id: stim.stim_id.clone(),
        min_trials_per_side: config.analysis.baseline_min_trials,
        screen_size,
        alpha: config.analysis.alpha,
        response_s: config.analysis.response_s,
        window: PsthWindow {
            start_s: config.psth.window_start_s,
            end_s: config.psth.window_end_s,
            bin_s: config.psth.bin_s,
        },
    }
}

/// Display smoothing for a persisted record; the diff curve is re-derived
/// from the smoothed pair rather than smoothed independently
fn smooth_selectivity(mut result: SelectivityResult, sigma_bins: f64) -> SelectivityResult {
    result.psth_r = smooth_gaussian(&result.psth_r, sigma_bins);
    result.psth_l = smooth_gaussian(&result.psth_l, sigma_bins);
    result.psth_prefer = smooth_gaussian(&result.psth_prefer, sigma_bins);
    result.psth_non_prefer = smooth_gaussian(&result.psth_non_prefer, sigma_bins);
    result.psth_diff = result
        .psth_prefer
        .iter()
        .zip(&result.psth_non_prefer)
        .map(|(p, n)| p - n)
        .collect();
    result
}

fn smooth_stim_aligned(mut result: StimAlignedPsth, sigma_bins: f64) -> StimAlignedPsth {
    result.psth_r = smooth_gaussian(&result.psth_r, sigma_bins);
    result.psth_l = smooth_gaussian(&result.psth_l, sigma_bins);
    result.psth_prefer = smooth_gaussian(&result.psth_prefer, sigma_bins);
    result.psth_non_prefer = smooth_gaussian(&result.psth_non_prefer, sigma_bins);
    result.psth_diff = result
        .psth_prefer
        .iter()
        .zip(&result.psth_non_prefer)
        .map(|(p, n)| p - n)
        .collect();
    result
}

/// Fans unit×condition analysis tasks out over a worker pool
pub struct BatchRunner<S> {
    store: Arc<S>,
    config: SpikealignConfig,
}

impl<S> BatchRunner<S>
where
    S: UnitStore + TrialStore + ConditionStore + ResultStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, SpikealignConfig::default())
    }

    pub fn with_config(store: Arc<S>, config: SpikealignConfig) -> Self {
        Self { store, config }
    }

    /// Run the baseline selectivity analysis for every unit
    ///
    /// # Errors
    /// * `ServiceError::InvalidCondition` - `stim_id` is outside the closed
    ///   lookup; rejected before any unit is analyzed
    pub fn run_baseline(
        &self,
        units: &[UnitKey],
        condition: TrialCondition,
        stim_id: &StimId,
    ) -> ServiceResult<BatchSummary> {
        let stim = self.store.fetch_condition(stim_id)?;
        let params = params_from_config(&self.config, condition, &stim);
        info!(
            target: "spikealign-services",
            units = units.len(),
            %condition,
            %stim_id,
            "starting baseline batch"
        );

        let statuses = self.install(|| {
            units
                .par_iter()
                .map(|key| (key.clone(), self.baseline_task(key, &params)))
                .collect::<Vec<_>>()
        });
        self.summarize(statuses)
    }

    /// Re-estimate PSTHs on one stimulation configuration's trials for every
    /// unit with a selective baseline
    ///
    /// # Errors
    /// * `ServiceError::InvalidCondition` - `stim_id` is outside the closed
    ///   lookup; rejected before any unit is analyzed
    pub fn run_stim_aligned(
        &self,
        units: &[UnitKey],
        condition: TrialCondition,
        stim_id: &StimId,
    ) -> ServiceResult<BatchSummary> {
        let stim = self.store.fetch_condition(stim_id)?;
        info!(
            target: "spikealign-services",
            units = units.len(),
            %condition,
            %stim_id,
            "starting stimulation-aligned batch"
        );

        let statuses = self.install(|| {
            units
                .par_iter()
                .map(|key| (key.clone(), self.stim_task(key, condition, &stim)))
                .collect::<Vec<_>>()
        });
        self.summarize(statuses)
    }

    fn baseline_task(
        &self,
        key: &UnitKey,
        params: &AnalysisParams,
    ) -> ServiceResult<Outcome<()>> {
        let unit = self.store.fetch_unit(key)?;
        let trials = self.store.fetch_trials(key.session())?;
        let mut rng = StdRng::seed_from_u64(task_seed(self.config.analysis.base_seed, key));

        match analyze_unit(key, &unit, &trials, params, &mut rng)? {
            Outcome::Analyzed(mut result) => {
                let sigma = self.config.psth.smoothing_sigma_bins;
                if sigma > 0.0 {
                    result = smooth_selectivity(result, sigma);
                }
                self.store.persist(result)?;
                Ok(Outcome::Analyzed(()))
            }
            Outcome::Skipped(reason) => Ok(Outcome::Skipped(reason)),
        }
    }

    fn stim_task(
        &self,
        key: &UnitKey,
        condition: TrialCondition,
        stim: &PhotoStimCondition,
    ) -> ServiceResult<Outcome<()>> {
        let Some(baseline) = self.store.fetch_baseline(key, condition)? else {
            return Ok(Outcome::Skipped(SkipReason::MissingBaseline));
        };
        let unit = self.store.fetch_unit(key)?;
        let trials = self.store.fetch_trials(key.session())?;

        match analyze_stim_aligned(key, &unit, &trials, stim, &baseline)? {
            Outcome::Analyzed(mut result) => {
                let sigma = self.config.psth.smoothing_sigma_bins;
                if sigma > 0.0 {
                    result = smooth_stim_aligned(result, sigma);
                }
                self.store.persist_stim_aligned(result)?;
                Ok(Outcome::Analyzed(()))
            }
            Outcome::Skipped(reason) => Ok(Outcome::Skipped(reason)),
        }
    }

    fn summarize(
        &self,
        statuses: Vec<(UnitKey, ServiceResult<Outcome<()>>)>,
    ) -> ServiceResult<BatchSummary> {
        let mut summary = BatchSummary::default();
        for (unit, status) in statuses {
            match status {
                Ok(Outcome::Analyzed(())) => summary.analyzed += 1,
                Ok(Outcome::Skipped(reason)) => {
                    debug!(target: "spikealign-services", %unit, %reason, "task skipped");
                    summary.skipped += 1;
                }
                Err(error) => {
                    warn!(target: "spikealign-services", %unit, %error, "task failed");
                    summary.failed += 1;
                    summary.failures.push(BatchFailure { unit, error });
                }
            }
        }
        info!(
            target: "spikealign-services",
            analyzed = summary.analyzed,
            skipped = summary.skipped,
            failed = summary.failed,
            "batch finished"
        );
        if self.config.batch.fail_fast {
            if let Some(failure) = summary.failures.first() {
                return Err(failure.error.clone());
            }
        }
        Ok(summary)
    }

    /// Run on a dedicated pool when `batch.worker_threads` is set
    fn install<T: Send>(&self, op: impl FnOnce() -> T + Send) -> T {
        let threads = self.config.batch.worker_threads;
        if threads == 0 {
            return op();
        }
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(op),
            Err(error) => {
                warn!(
                    target: "spikealign-services",
                    %error,
                    "could not build dedicated pool; using the global pool"
                );
                op()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use spikealign_structures::{
        EpochBounds, InsertionKey, SessionKey, Trial, TrialOutcome, UnitSpikes,
    };

    const CUE: f64 = 3.1;

    fn session_key() -> SessionKey {
        SessionKey {
            subject_id: "GR1523".to_string(),
            session_date: "2018-03-04".to_string(),
        }
    }

    fn unit_key(unit_id: u16) -> UnitKey {
        UnitKey {
            insertion: InsertionKey {
                session: session_key(),
                brain_location: "Fastigial".to_string(),
            },
            unit_id,
        }
    }

    fn bounds() -> EpochBounds {
        EpochBounds {
            pole_in: 0.5,
            pole_out: 1.8,
            cue: CUE,
        }
    }

    /// One selective unit: 20 hit trials per side, right responses much
    /// stronger than left
    fn seed_selective_session(store: &MemoryStore, unit_id: u16) {
        let mut trials = Vec::new();
        let mut spike_times = Vec::new();
        let mut spike_trials = Vec::new();
        let r_counts = [5usize, 4, 6, 5];
        let l_counts = [1usize, 0, 2, 1];

        for i in 0..20 {
            for (offset, outcome, counts) in [
                (0, TrialOutcome::HitR, &r_counts),
                (1000, TrialOutcome::HitL, &l_counts),
            ] {
                let id = offset + i as i32;
                trials.push(Trial {
                    trial_id: id,
                    epochs: bounds(),
                    outcome,
                    early_lick: false,
                    stim_id: StimId::control(),
                });
                for s in 0..counts[i % counts.len()] {
                    spike_times.push(CUE + 0.05 + 0.02 * s as f64);
                    spike_trials.push(id);
                }
            }
        }

        store.insert_session(session_key(), trials);
        store.insert_unit(
            unit_key(unit_id),
            UnitSpikes::new(spike_times, spike_trials).unwrap(),
        );
    }

    #[test]
    fn test_baseline_batch_persists_results() {
        let store = Arc::new(MemoryStore::new());
        seed_selective_session(&store, 1);
        let runner = BatchRunner::new(store.clone());

        let summary = runner
            .run_baseline(&[unit_key(1)], TrialCondition::AllReport, &StimId::control())
            .unwrap();

        assert_eq!(summary.analyzed, 1);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.failed, 0);
        assert_eq!(store.results().len(), 1);
        assert!(store.results()[0].is_selective());
    }

    #[test]
    fn test_missing_unit_fails_only_its_task() {
        let store = Arc::new(MemoryStore::new());
        seed_selective_session(&store, 1);
        let runner = BatchRunner::new(store.clone());

        let summary = runner
            .run_baseline(
                &[unit_key(1), unit_key(99)],
                TrialCondition::AllReport,
                &StimId::control(),
            )
            .unwrap();

        assert_eq!(summary.analyzed, 1);
        assert_eq!(summary.failed, 1);
        assert!(matches!(
            summary.failures[0].error,
            ServiceError::MissingUpstreamData { resource: "unit", .. }
        ));
    }

    #[test]
    fn test_unknown_condition_rejected_before_computation() {
        let store = Arc::new(MemoryStore::new());
        seed_selective_session(&store, 1);
        let runner = BatchRunner::new(store.clone());

        let err = runner
            .run_baseline(
                &[unit_key(1)],
                TrialCondition::AllReport,
                &StimId::from("77"),
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCondition { .. }));
        assert!(store.results().is_empty());
    }

    #[test]
    fn test_batch_is_reproducible_across_runs() {
        let run = || {
            let store = Arc::new(MemoryStore::new());
            seed_selective_session(&store, 1);
            BatchRunner::new(store.clone())
                .run_baseline(&[unit_key(1)], TrialCondition::AllReport, &StimId::control())
                .unwrap();
            store.results().remove(0)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_stim_batch_without_baseline_skips() {
        let store = Arc::new(MemoryStore::new());
        seed_selective_session(&store, 1);
        let runner = BatchRunner::new(store.clone());

        let summary = runner
            .run_stim_aligned(&[unit_key(1)], TrialCondition::AllReport, &StimId::from("2"))
            .unwrap();
        assert_eq!(summary.analyzed, 0);
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn test_configured_smoothing_spreads_the_psth() {
        let raw = {
            let store = Arc::new(MemoryStore::new());
            seed_selective_session(&store, 1);
            BatchRunner::new(store.clone())
                .run_baseline(&[unit_key(1)], TrialCondition::AllReport, &StimId::control())
                .unwrap();
            store.results().remove(0)
        };
        let smoothed = {
            let store = Arc::new(MemoryStore::new());
            seed_selective_session(&store, 1);
            let mut config = SpikealignConfig::default();
            config.psth.smoothing_sigma_bins = 5.0;
            BatchRunner::with_config(store.clone(), config)
                .run_baseline(&[unit_key(1)], TrialCondition::AllReport, &StimId::control())
                .unwrap();
            store.results().remove(0)
        };

        assert_eq!(raw.psth_r.len(), smoothed.psth_r.len());
        assert_ne!(raw.psth_r, smoothed.psth_r);
        // smoothing redistributes rate without creating it
        let raw_sum: f64 = raw.psth_r.iter().sum();
        let smoothed_sum: f64 = smoothed.psth_r.iter().sum();
        assert!((raw_sum - smoothed_sum).abs() / raw_sum < 0.01);
    }

    #[test]
    fn test_fail_fast_surfaces_first_failure() {
        let store = Arc::new(MemoryStore::new());
        seed_selective_session(&store, 1);
        let mut config = SpikealignConfig::default();
        config.batch.fail_fast = true;
        let runner = BatchRunner::with_config(store, config);

        let err = runner
            .run_baseline(
                &[unit_key(1), unit_key(99)],
                TrialCondition::AllReport,
                &StimId::control(),
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::MissingUpstreamData { .. }));
    }

    #[test]
    fn test_task_seed_is_stable_and_key_dependent() {
        let a = task_seed(7, &unit_key(1));
        let b = task_seed(7, &unit_key(1));
        let c = task_seed(7, &unit_key(2));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
