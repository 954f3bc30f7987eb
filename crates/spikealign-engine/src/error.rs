// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the analysis engine

use thiserror::Error;

/// Hard failures inside the analysis engine
///
/// Data-dependent shortfalls (too few trials, empty test subset) are not
/// errors; they are [`crate::selectivity::SkipReason`]s carried in the
/// analysis outcome. An `AnalysisError` means the caller violated a contract
/// that should have been guarded.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// A rate estimate was requested over zero trials; the caller must guard
    /// with the trial-count checks before estimating
    #[error("PSTH requested over an empty trial collection")]
    EmptyHistogram,

    /// Degenerate bin grid
    #[error("invalid PSTH window: [{start_s}, {end_s}) with {bin_s} s bins")]
    InvalidWindow { start_s: f64, end_s: f64, bin_s: f64 },
}

/// Result type for engine operations
pub type Result<T> = core::result::Result<T, AnalysisError>;
