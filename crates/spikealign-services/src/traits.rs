// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Storage collaborator traits.

The batch runner depends on these traits, not on any concrete store. All
calls are synchronous; implementations are expected to be cheap lookups or
local reads, and must be shareable across the worker pool.
*/

use spikealign_engine::{SelectivityResult, StimAlignedPsth};
use spikealign_structures::{
    PhotoStimCondition, SessionKey, StimId, Trial, TrialCondition, UnitKey, UnitSpikes,
};

use crate::error::ServiceResult;

/// Access to ingested unit spike data
pub trait UnitStore: Send + Sync {
    /// Fetch one unit's spike arrays
    ///
    /// # Errors
    /// * `ServiceError::MissingUpstreamData` - unit not ingested
    fn fetch_unit(&self, key: &UnitKey) -> ServiceResult<UnitSpikes>;
}

/// Access to ingested behavioral trials
pub trait TrialStore: Send + Sync {
    /// Fetch a session's full trial table, in no particular order
    ///
    /// # Errors
    /// * `ServiceError::MissingUpstreamData` - session not ingested
    fn fetch_trials(&self, key: &SessionKey) -> ServiceResult<Vec<Trial>>;
}

/// Access to the closed stimulation-configuration lookup
pub trait ConditionStore: Send + Sync {
    /// Resolve one configuration id
    ///
    /// # Errors
    /// * `ServiceError::InvalidCondition` - id outside the closed lookup
    fn fetch_condition(&self, stim_id: &StimId) -> ServiceResult<PhotoStimCondition>;
}

/// Persistence for analysis records
pub trait ResultStore: Send + Sync {
    /// Persist one frozen selectivity record
    fn persist(&self, result: SelectivityResult) -> ServiceResult<()>;

    /// Persist one stimulation-aligned record
    fn persist_stim_aligned(&self, result: StimAlignedPsth) -> ServiceResult<()>;

    /// Reload a unit's baseline (no-stimulation) record for the given trial
    /// condition, if one was persisted
    fn fetch_baseline(
        &self,
        unit: &UnitKey,
        condition: TrialCondition,
    ) -> ServiceResult<Option<SelectivityResult>>;
}
