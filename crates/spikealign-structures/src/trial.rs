// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Behavioral trials and their epoch structure
//!
//! Each trial of the delayed-response task is divided by three behavioral
//! timestamps, all in seconds relative to trial start:
//!
//! ```text
//!   pole_in          pole_out            cue
//!      |---- sample ----|----- delay -----|--- response ---|
//! ```
//!
//! The animal reports left or right after the cue; the outcome label encodes
//! both the reported side and whether the report was correct.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::condition::StimId;
use crate::error::StructureError;

/// Which side the animal reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportSide {
    Right,
    Left,
}

impl fmt::Display for ReportSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportSide::Right => write!(f, "R"),
            ReportSide::Left => write!(f, "L"),
        }
    }
}

/// Recording hemisphere relative to the animal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hemisphere {
    Left,
    Right,
    Both,
}

/// Closed set of per-trial behavioral outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrialOutcome {
    HitR,
    HitL,
    ErrR,
    ErrL,
    NoLickR,
    NoLickL,
    NoResponse,
}

impl TrialOutcome {
    /// The reported side, if the animal reported at all
    pub fn report_side(&self) -> Option<ReportSide> {
        match self {
            TrialOutcome::HitR | TrialOutcome::ErrR | TrialOutcome::NoLickR => {
                Some(ReportSide::Right)
            }
            TrialOutcome::HitL | TrialOutcome::ErrL | TrialOutcome::NoLickL => {
                Some(ReportSide::Left)
            }
            TrialOutcome::NoResponse => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, TrialOutcome::HitR | TrialOutcome::HitL)
    }

    pub fn is_err(&self) -> bool {
        matches!(self, TrialOutcome::ErrR | TrialOutcome::ErrL)
    }

    pub fn label(&self) -> &'static str {
        match self {
            TrialOutcome::HitR => "HitR",
            TrialOutcome::HitL => "HitL",
            TrialOutcome::ErrR => "ErrR",
            TrialOutcome::ErrL => "ErrL",
            TrialOutcome::NoLickR => "NoLickR",
            TrialOutcome::NoLickL => "NoLickL",
            TrialOutcome::NoResponse => "NoResponse",
        }
    }
}

impl FromStr for TrialOutcome {
    type Err = StructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HitR" => Ok(TrialOutcome::HitR),
            "HitL" => Ok(TrialOutcome::HitL),
            "ErrR" => Ok(TrialOutcome::ErrR),
            "ErrL" => Ok(TrialOutcome::ErrL),
            "NoLickR" => Ok(TrialOutcome::NoLickR),
            "NoLickL" => Ok(TrialOutcome::NoLickL),
            "NoResponse" => Ok(TrialOutcome::NoResponse),
            other => Err(StructureError::UnknownOutcome(other.to_string())),
        }
    }
}

/// Trial-relative epoch boundary times, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochBounds {
    /// Pole descends; start of the sample period
    pub pole_in: f64,
    /// Pole withdraws; end of sample, start of delay
    pub pole_out: f64,
    /// Go cue; end of delay, start of the response period
    pub cue: f64,
}

/// One behavioral trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// Unique within a session; ids are not necessarily contiguous
    pub trial_id: i32,
    pub epochs: EpochBounds,
    pub outcome: TrialOutcome,
    /// The animal licked before the go cue
    pub early_lick: bool,
    /// Photostimulation configuration applied on this trial
    pub stim_id: StimId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_side() {
        assert_eq!(TrialOutcome::HitR.report_side(), Some(ReportSide::Right));
        assert_eq!(TrialOutcome::ErrL.report_side(), Some(ReportSide::Left));
        assert_eq!(TrialOutcome::NoLickR.report_side(), Some(ReportSide::Right));
        assert_eq!(TrialOutcome::NoResponse.report_side(), None);
    }

    #[test]
    fn test_outcome_labels_roundtrip() {
        for outcome in [
            TrialOutcome::HitR,
            TrialOutcome::HitL,
            TrialOutcome::ErrR,
            TrialOutcome::ErrL,
            TrialOutcome::NoLickR,
            TrialOutcome::NoLickL,
            TrialOutcome::NoResponse,
        ] {
            assert_eq!(outcome.label().parse::<TrialOutcome>().unwrap(), outcome);
        }
    }

    #[test]
    fn test_unknown_outcome_label() {
        assert!(matches!(
            "LickBoth".parse::<TrialOutcome>(),
            Err(StructureError::UnknownOutcome(_))
        ));
    }
}
