// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Rejects configurations that would make the analysis meaningless before
//! any computation starts.

use crate::{ConfigError, ConfigResult, SpikealignConfig};

/// Validate a loaded configuration
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` naming the offending field
pub fn validate_config(config: &SpikealignConfig) -> ConfigResult<()> {
    let analysis = &config.analysis;
    if !(analysis.alpha > 0.0 && analysis.alpha < 1.0) {
        return Err(ConfigError::InvalidValue(format!(
            "analysis.alpha = {} must be in (0, 1)",
            analysis.alpha
        )));
    }
    if !(analysis.response_s > 0.0) {
        return Err(ConfigError::InvalidValue(format!(
            "analysis.response_s = {} must be positive",
            analysis.response_s
        )));
    }
    if analysis.screen_size_activation == 0 || analysis.screen_size_other == 0 {
        return Err(ConfigError::InvalidValue(
            "screening-subset sizes must be at least 1".to_string(),
        ));
    }

    let psth = &config.psth;
    if !(psth.window_end_s > psth.window_start_s) {
        return Err(ConfigError::InvalidValue(format!(
            "psth window [{}, {}) is empty or inverted",
            psth.window_start_s, psth.window_end_s
        )));
    }
    if !(psth.bin_s > 0.0) {
        return Err(ConfigError::InvalidValue(format!(
            "psth.bin_s = {} must be positive",
            psth.bin_s
        )));
    }
    if psth.smoothing_sigma_bins < 0.0 {
        return Err(ConfigError::InvalidValue(format!(
            "psth.smoothing_sigma_bins = {} must not be negative",
            psth.smoothing_sigma_bins
        )));
    }

    Ok(())
}
