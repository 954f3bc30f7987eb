// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Peri-stimulus time histogram estimation
//!
//! Pools cue-aligned spikes across a trial set into one fixed-width binned
//! histogram and normalizes by `n_trials × bin width`, yielding spikes/s per
//! bin. The estimate itself is convolution-free; an optional Gaussian
//! smoothing pass is available for display.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Bin grid for PSTH estimation, on the cue-aligned time axis (0 = go cue)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PsthWindow {
    pub start_s: f64,
    pub end_s: f64,
    pub bin_s: f64,
}

impl Default for PsthWindow {
    fn default() -> Self {
        // 1 ms bins over [-3.5 s, +2 s) around the cue
        Self {
            start_s: -3.5,
            end_s: 2.0,
            bin_s: 0.001,
        }
    }
}

impl PsthWindow {
    pub fn validate(&self) -> Result<()> {
        if !(self.end_s > self.start_s) || !(self.bin_s > 0.0) {
            return Err(AnalysisError::InvalidWindow {
                start_s: self.start_s,
                end_s: self.end_s,
                bin_s: self.bin_s,
            });
        }
        Ok(())
    }

    pub fn n_bins(&self) -> usize {
        ((self.end_s - self.start_s) / self.bin_s).round() as usize
    }

    /// Bin edges, length `n_bins() + 1`
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.n_bins())
            .map(|i| self.start_s + i as f64 * self.bin_s)
            .collect()
    }

    pub fn time_window(&self) -> (f64, f64) {
        (self.start_s, self.end_s)
    }
}

/// Estimate the pooled firing rate over a trial set
///
/// `trials` holds one cue-aligned spike sequence per trial; trials with no
/// spikes still count toward the normalization.
///
/// # Errors
/// * `AnalysisError::EmptyHistogram` - zero trials supplied; the caller's
///   trial-count guard should have fired first
/// * `AnalysisError::InvalidWindow` - degenerate bin grid
pub fn estimate(trials: &[Vec<f64>], window: &PsthWindow) -> Result<Vec<f64>> {
    window.validate()?;
    if trials.is_empty() {
        return Err(AnalysisError::EmptyHistogram);
    }

    let n_bins = window.n_bins();
    let mut counts = vec![0.0f64; n_bins];
    for spikes in trials {
        for &t in spikes {
            if t < window.start_s || t >= window.end_s {
                continue;
            }
            let bin = ((t - window.start_s) / window.bin_s) as usize;
            if bin < n_bins {
                counts[bin] += 1.0;
            }
        }
    }

    let norm = trials.len() as f64 * window.bin_s;
    for c in &mut counts {
        *c /= norm;
    }
    Ok(counts)
}

/// Gaussian-smooth a rate sequence, sigma in bins, mirror-padded at the edges
pub fn smooth_gaussian(rates: &[f64], sigma_bins: f64) -> Vec<f64> {
    if sigma_bins <= 0.0 || rates.is_empty() {
        return rates.to_vec();
    }

    let radius = (sigma_bins * 3.0).ceil() as usize;
    let size = radius * 2 + 1;
    let scale = -0.5 / (sigma_bins * sigma_bins);
    let mut kernel: Vec<f64> = (0..size)
        .map(|i| {
            let x = i as f64 - radius as f64;
            (x * x * scale).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= sum;
    }

    let n = rates.len() as isize;
    let mut smoothed = vec![0.0; rates.len()];
    for (i, out) in smoothed.iter_mut().enumerate() {
        let mut acc = 0.0;
        for (k, &w) in kernel.iter().enumerate() {
            let mut src = i as isize + k as isize - radius as isize;
            if src < 0 {
                src = -src;
            }
            if src >= n {
                src = 2 * (n - 1) - src;
            }
            acc += rates[src.clamp(0, n - 1) as usize] * w;
        }
        *out = acc;
    }
    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_dimensions() {
        let window = PsthWindow::default();
        assert_eq!(window.n_bins(), 5500);
        assert_eq!(window.edges().len(), 5501);
    }

    #[test]
    fn test_estimate_normalizes_by_trials_and_bin_width() {
        let window = PsthWindow {
            start_s: 0.0,
            end_s: 1.0,
            bin_s: 0.5,
        };
        // two trials, three spikes in the first bin
        let trials = vec![vec![0.1, 0.2], vec![0.3]];
        let rates = estimate(&trials, &window).unwrap();
        // 3 spikes / (2 trials * 0.5 s) = 3 Hz
        assert_eq!(rates, vec![3.0, 0.0]);
    }

    #[test]
    fn test_estimate_is_idempotent() {
        let window = PsthWindow::default();
        let trials = vec![vec![-2.0, -0.5, 0.25], vec![], vec![1.0]];
        let a = estimate(&trials, &window).unwrap();
        let b = estimate(&trials, &window).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_integral_recovers_mean_spike_count() {
        let window = PsthWindow::default();
        let trials = vec![vec![-3.0, -1.0, 0.5], vec![-0.2], vec![]];
        let rates = estimate(&trials, &window).unwrap();
        let integral: f64 = rates.iter().sum::<f64>() * window.bin_s;
        let mean_count = 4.0 / 3.0;
        assert!((integral - mean_count).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_window_spikes_are_ignored() {
        let window = PsthWindow::default();
        let trials = vec![vec![-10.0, 5.0, 2.0]]; // 2.0 == end, exclusive
        let rates = estimate(&trials, &window).unwrap();
        assert!(rates.iter().all(|&r| r == 0.0));
    }

    #[test]
    fn test_empty_trial_collection_is_an_error() {
        let err = estimate(&[], &PsthWindow::default()).unwrap_err();
        assert_eq!(err, AnalysisError::EmptyHistogram);
    }

    #[test]
    fn test_invalid_window_rejected() {
        let window = PsthWindow {
            start_s: 1.0,
            end_s: 1.0,
            bin_s: 0.001,
        };
        assert!(matches!(
            estimate(&[vec![0.0]], &window),
            Err(AnalysisError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_smoothing_preserves_mass() {
        let rates = vec![0.0, 0.0, 10.0, 0.0, 0.0];
        let smoothed = smooth_gaussian(&rates, 1.0);
        let before: f64 = rates.iter().sum();
        let after: f64 = smoothed.iter().sum();
        assert!((before - after).abs() < 0.5);
        assert!(smoothed[2] < 10.0);
        assert!(smoothed[1] > 0.0);
    }
}
