// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # spikealign-structures
//!
//! The foundation crate for the spikealign pipeline: the data types shared by
//! the compute engine and the storage boundary. Nothing in here does I/O or
//! computation beyond field validation.
//!
//! - [`SessionKey`] / [`InsertionKey`] / [`UnitKey`] - addressing for one
//!   recorded neuron within one probe insertion within one session
//! - [`UnitSpikes`] - a unit's raw spike arrays (times + trial assignments)
//! - [`Trial`] / [`EpochBounds`] / [`TrialOutcome`] - per-trial behavior
//! - [`TrialCondition`] - named outcome partitions used to select trial sets
//! - [`PhotoStimCondition`] / [`StimId`] - the closed photostimulation lookup

pub mod condition;
pub mod error;
pub mod keys;
pub mod trial;
pub mod unit;

pub use condition::{PhotoStimCondition, StimId, StimKind, TrialCondition};
pub use error::{Result, StructureError};
pub use keys::{InsertionKey, SessionKey, UnitKey};
pub use trial::{EpochBounds, Hemisphere, ReportSide, Trial, TrialOutcome};
pub use unit::UnitSpikes;
