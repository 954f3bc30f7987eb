// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for structure construction and label parsing

use thiserror::Error;

/// Errors raised while constructing or parsing foundation types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// The spike-time and spike-trial arrays of a unit must be parallel
    #[error("spike array length mismatch: {times} spike times vs {trials} trial assignments")]
    ArrayMismatch { times: usize, trials: usize },

    /// A behavioral outcome label outside the closed set
    #[error("unknown trial outcome label: '{0}'")]
    UnknownOutcome(String),

    /// A trial-condition name outside the closed set
    #[error("unknown trial condition: '{0}'")]
    UnknownCondition(String),
}

/// Result type for structure operations
pub type Result<T> = core::result::Result<T, StructureError>;
