// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Service layer error types.

Hard failures only: anything here aborts the single unit×condition task it
occurred in and is surfaced to the caller. Data-dependent skips travel as
`spikealign_engine::SkipReason` inside the analysis outcome instead.
*/

use spikealign_engine::AnalysisError;
use spikealign_structures::StimId;
use thiserror::Error;

/// Service layer errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    /// A unit or session is absent from the upstream store; never defaulted
    #[error("missing upstream data: {resource} '{key}'")]
    MissingUpstreamData { resource: &'static str, key: String },

    /// A stimulation-condition id outside the closed lookup
    #[error("invalid stimulation condition: '{stim_id}'")]
    InvalidCondition { stim_id: StimId },

    /// The engine rejected the computation
    #[error("analysis failed: {0}")]
    Engine(#[from] AnalysisError),
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
