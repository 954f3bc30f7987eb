//! # spikealign - Trial-Aligned Selectivity Analysis
//!
//! spikealign ingests per-session unit spike arrays and behavioral trial
//! tables from a mouse optogenetics/ephys experiment and computes per-neuron
//! trial-aligned firing statistics: peri-stimulus time histograms,
//! epoch-wise left/right selectivity, and a screened preference label.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! spikealign = "0.1"
//! ```
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use spikealign::prelude::*;
//!
//! let store = Arc::new(MemoryStore::new());
//! // ... ingest units and sessions into the store ...
//!
//! let runner = BatchRunner::new(store.clone());
//! let summary = runner.run_baseline(
//!     &[],                       // unit keys to analyze
//!     TrialCondition::AllReport, // trial partition to compare
//!     &StimId::control(),        // no-stimulation baseline
//! )?;
//! println!(
//!     "analyzed {} units, skipped {}, failed {}",
//!     summary.analyzed, summary.skipped, summary.failed
//! );
//! # Ok::<(), spikealign::services::ServiceError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: spikealign-structures, spikealign-config   │
//! │  (keys, trials, conditions; TOML configuration)         │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: spikealign-engine                          │
//! │  (slicing, epoch counts, PSTH, t-tests, preference)     │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Boundary: spikealign-services                          │
//! │  (storage collaborator traits, batch worker pool)       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export foundation
pub use spikealign_config as config;
pub use spikealign_structures as structures;

// Re-export algorithms
pub use spikealign_engine as engine;

// Re-export boundary layer
pub use spikealign_services as services;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::SpikealignConfig;
    pub use crate::engine::{
        analyze_stim_aligned, analyze_unit, AnalysisParams, Outcome, Preference, PsthWindow,
        SelectivityResult, SkipReason, StimAlignedPsth,
    };
    pub use crate::services::{
        BatchRunner, BatchSummary, ConditionStore, MemoryStore, ResultStore, ServiceError,
        TrialStore, UnitStore,
    };
    pub use crate::structures::{
        EpochBounds, PhotoStimCondition, ReportSide, SessionKey, StimId, Trial, TrialCondition,
        TrialOutcome, UnitKey, UnitSpikes,
    };
}
