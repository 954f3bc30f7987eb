// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # spikealign-engine
//!
//! The trial-alignment and selectivity-analysis engine. Pure computation over
//! borrowed views of unit spike arrays and session trial metadata; fetching
//! and persistence belong to the services boundary.
//!
//! ## Pipeline
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  trial_index  - resolve side/condition/stim filters into     │
//! │                 ordered trial-id sets within the unit's span │
//! └──────────────────────────┬───────────────────────────────────┘
//!                            ↓
//! ┌──────────────────────────────────────────────────────────────┐
//! │  slicer       - partition the flat spike arrays per trial    │
//! └───────────┬──────────────────────────────┬───────────────────┘
//!             ↓                              ↓
//! ┌───────────────────────────┐  ┌───────────────────────────────┐
//! │  epochs - per-trial       │  │  psth - pooled, cue-aligned   │
//! │  sample/delay/response    │  │  binned rate estimate         │
//! │  spike counts             │  │                               │
//! └───────────┬───────────────┘  └──────────────┬────────────────┘
//!             ↓                                 ↓
//! ┌──────────────────────────────────────────────────────────────┐
//! │  selectivity  - t-tests per epoch, screen/test split,        │
//! │                 preference, frozen SelectivityResult         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The screen/test split draws its randomness from an explicitly passed,
//! seedable generator owned by the calling task; there is no process-global
//! generator anywhere in the engine.

pub mod epochs;
pub mod error;
pub mod psth;
pub mod selectivity;
pub mod slicer;
pub mod split;
pub mod stats;
pub mod stim_aligned;
pub mod trial_index;

pub use epochs::{EpochCounts, DEFAULT_RESPONSE_S, EPOCH_DELAY, EPOCH_PREFERENCE, EPOCH_RESPONSE, EPOCH_SAMPLE};
pub use error::{AnalysisError, Result};
pub use psth::PsthWindow;
pub use selectivity::{
    analyze_unit, AnalysisParams, Outcome, Preference, SelectivityResult, SkipReason,
    BASELINE_MIN_TRIALS, DEFAULT_ALPHA, STIM_ON_MIN_TRIALS,
};
pub use slicer::TrialSpikes;
pub use split::TrialSplit;
pub use stats::TTest;
pub use stim_aligned::{analyze_stim_aligned, StimAlignedPsth};
pub use trial_index::TrialFilter;
