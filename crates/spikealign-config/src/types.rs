// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines the configuration structs that map to sections in
//! `spikealign_configuration.toml`.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SpikealignConfig {
    pub analysis: AnalysisConfig,
    pub psth: PsthConfig,
    pub batch: BatchConfig,
    pub logging: LoggingConfig,
}

/// Selectivity-analysis parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Two-sided significance level for the epoch t-tests
    pub alpha: f64,
    /// Response-period duration after the go cue, seconds
    pub response_s: f64,
    /// Baseline analyses need strictly more trials per side than this
    pub baseline_min_trials: usize,
    /// Stimulation-aligned analyses need strictly more trials per side than this
    pub stim_on_min_trials: usize,
    /// Screening-subset size under activation-type stimulation
    pub screen_size_activation: usize,
    /// Screening-subset size for every other configuration
    pub screen_size_other: usize,
    /// Base seed mixed with each unit key to give every task its own
    /// deterministic generator
    pub base_seed: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            response_s: 1.5,
            baseline_min_trials: 8,
            stim_on_min_trials: 2,
            screen_size_activation: 10,
            screen_size_other: 5,
            base_seed: 0,
        }
    }
}

/// PSTH bin-grid parameters, cue-aligned (0 = go cue)
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PsthConfig {
    pub window_start_s: f64,
    pub window_end_s: f64,
    pub bin_s: f64,
    /// Gaussian display smoothing, sigma in bins; 0 disables
    pub smoothing_sigma_bins: f64,
}

impl Default for PsthConfig {
    fn default() -> Self {
        Self {
            window_start_s: -3.5,
            window_end_s: 2.0,
            bin_s: 0.001,
            smoothing_sigma_bins: 0.0,
        }
    }
}

/// Batch-runner parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads for the unit fan-out; 0 = use the process default
    pub worker_threads: usize,
    /// Abort the batch on the first hard per-unit failure
    pub fail_fast: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            fail_fast: false,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SpikealignConfig::default();
        assert_eq!(config.analysis.alpha, 0.05);
        assert_eq!(config.analysis.baseline_min_trials, 8);
        assert_eq!(config.analysis.screen_size_activation, 10);
        assert_eq!(config.psth.bin_s, 0.001);
        assert_eq!(config.batch.worker_threads, 0);
    }
}
