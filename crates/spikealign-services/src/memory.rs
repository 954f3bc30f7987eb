// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
In-memory store implementation.

Backs the collaborator traits with `parking_lot`-guarded maps. Used by the
test suites and by in-process batch runs where the ingestion layer has
already materialized sessions in memory. Construction seeds the closed
stimulation lookup with its standard contents.
*/

use std::collections::HashMap;

use parking_lot::RwLock;

use spikealign_engine::{SelectivityResult, StimAlignedPsth};
use spikealign_structures::{
    PhotoStimCondition, SessionKey, StimId, Trial, TrialCondition, UnitKey, UnitSpikes,
};

use crate::error::{ServiceError, ServiceResult};
use crate::traits::{ConditionStore, ResultStore, TrialStore, UnitStore};

/// Map-backed store for all collaborator traits
pub struct MemoryStore {
    units: RwLock<HashMap<UnitKey, UnitSpikes>>,
    trials: RwLock<HashMap<SessionKey, Vec<Trial>>>,
    conditions: RwLock<HashMap<StimId, PhotoStimCondition>>,
    results: RwLock<Vec<SelectivityResult>>,
    stim_results: RwLock<Vec<StimAlignedPsth>>,
}

impl MemoryStore {
    /// Empty store with the standard stimulation lookup pre-seeded
    pub fn new() -> Self {
        let conditions = PhotoStimCondition::lookup_contents()
            .into_iter()
            .map(|c| (c.stim_id.clone(), c))
            .collect();
        Self {
            units: RwLock::new(HashMap::new()),
            trials: RwLock::new(HashMap::new()),
            conditions: RwLock::new(conditions),
            results: RwLock::new(Vec::new()),
            stim_results: RwLock::new(Vec::new()),
        }
    }

    pub fn insert_unit(&self, key: UnitKey, unit: UnitSpikes) {
        self.units.write().insert(key, unit);
    }

    pub fn insert_session(&self, key: SessionKey, session_trials: Vec<Trial>) {
        self.trials.write().insert(key, session_trials);
    }

    /// Snapshot of every persisted selectivity record
    pub fn results(&self) -> Vec<SelectivityResult> {
        self.results.read().clone()
    }

    /// Snapshot of every persisted stimulation-aligned record
    pub fn stim_results(&self) -> Vec<StimAlignedPsth> {
        self.stim_results.read().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitStore for MemoryStore {
    fn fetch_unit(&self, key: &UnitKey) -> ServiceResult<UnitSpikes> {
        self.units
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| ServiceError::MissingUpstreamData {
                resource: "unit",
                key: key.to_string(),
            })
    }
}

impl TrialStore for MemoryStore {
    fn fetch_trials(&self, key: &SessionKey) -> ServiceResult<Vec<Trial>> {
        self.trials
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| ServiceError::MissingUpstreamData {
                resource: "session trials",
                key: key.to_string(),
            })
    }
}

impl ConditionStore for MemoryStore {
    fn fetch_condition(&self, stim_id: &StimId) -> ServiceResult<PhotoStimCondition> {
        self.conditions
            .read()
            .get(stim_id)
            .cloned()
            .ok_or_else(|| ServiceError::InvalidCondition {
                stim_id: stim_id.clone(),
            })
    }
}

impl ResultStore for MemoryStore {
    fn persist(&self, result: SelectivityResult) -> ServiceResult<()> {
        self.results.write().push(result);
        Ok(())
    }

    fn persist_stim_aligned(&self, result: StimAlignedPsth) -> ServiceResult<()> {
        self.stim_results.write().push(result);
        Ok(())
    }

    fn fetch_baseline(
        &self,
        unit: &UnitKey,
        condition: TrialCondition,
    ) -> ServiceResult<Option<SelectivityResult>> {
        Ok(self
            .results
            .read()
            .iter()
            .find(|r| r.unit == *unit && r.condition == condition && r.stim_id.is_control())
            .cloned())
    }
}
