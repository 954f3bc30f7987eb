// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Trial-selection conditions and the photostimulation lookup
//!
//! [`TrialCondition`] names a partition of trial outcomes used when pairing
//! right-report against left-report trial sets. [`PhotoStimCondition`] is one
//! row of the closed stimulation-configuration lookup; id `"0"` is the
//! no-stimulation control and id `"NaN"` marks configurations recorded for
//! other purposes that must never be analyzed.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StructureError;
use crate::trial::{Hemisphere, Trial, TrialOutcome};

/// Named partition of trial outcomes used to select comparable trial sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrialCondition {
    /// Any trial with a left or right report
    AllReport,
    /// Correct reports only
    HitOnly,
    /// Incorrect reports only
    ErrOnly,
    /// Any report trial where the animal did not lick early
    NoEarlyLick,
}

impl TrialCondition {
    pub fn name(&self) -> &'static str {
        match self {
            TrialCondition::AllReport => "all_report",
            TrialCondition::HitOnly => "hit_only",
            TrialCondition::ErrOnly => "err_only",
            TrialCondition::NoEarlyLick => "no_early_lick",
        }
    }

    /// Whether a trial belongs to this condition's partition
    ///
    /// A trial with no report never matches: side-paired comparisons are only
    /// defined over report trials.
    pub fn matches(&self, outcome: TrialOutcome, early_lick: bool) -> bool {
        if outcome.report_side().is_none() {
            return false;
        }
        match self {
            TrialCondition::AllReport => true,
            TrialCondition::HitOnly => outcome.is_hit(),
            TrialCondition::ErrOnly => outcome.is_err(),
            TrialCondition::NoEarlyLick => !early_lick,
        }
    }

    pub fn matches_trial(&self, trial: &Trial) -> bool {
        self.matches(trial.outcome, trial.early_lick)
    }
}

impl fmt::Display for TrialCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrialCondition {
    type Err = StructureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all_report" => Ok(TrialCondition::AllReport),
            "hit_only" => Ok(TrialCondition::HitOnly),
            "err_only" => Ok(TrialCondition::ErrOnly),
            "no_early_lick" => Ok(TrialCondition::NoEarlyLick),
            other => Err(StructureError::UnknownCondition(other.to_string())),
        }
    }
}

/// Photostimulation configuration id, as stored upstream
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StimId(pub String);

impl StimId {
    /// The no-stimulation control configuration
    pub const CONTROL: &'static str = "0";
    /// Configurations recorded for other purposes; never analyzed
    pub const EXCLUDED: &'static str = "NaN";

    pub fn control() -> Self {
        StimId(Self::CONTROL.to_string())
    }

    pub fn is_control(&self) -> bool {
        self.0 == Self::CONTROL
    }

    pub fn is_excluded(&self) -> bool {
        self.0 == Self::EXCLUDED
    }
}

impl fmt::Display for StimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StimId {
    fn from(s: &str) -> Self {
        StimId(s.to_string())
    }
}

/// Whether a stimulation configuration excites or silences its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StimKind {
    Activation,
    Inhibition,
}

/// One row of the closed stimulation-configuration lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoStimCondition {
    pub stim_id: StimId,
    pub brain_location: Option<String>,
    pub hemisphere: Option<Hemisphere>,
    /// Trial period the stimulus is delivered in, e.g. "sample" or "delay"
    pub period: String,
    /// Stimulus location relative to the recording site
    pub relative_location: String,
    pub kind: Option<StimKind>,
    pub duration_ms: f64,
    /// Waveform shape, e.g. "5ms pulse" or "cosine"
    pub shape: String,
    pub freq_hz: f64,
    pub notes: String,
}

impl PhotoStimCondition {
    /// Screening-subset size for preference determination under this
    /// configuration: activation-type stimulation screens 10 trials per
    /// side, everything else screens 5.
    pub fn screen_size(&self) -> usize {
        match self.kind {
            Some(StimKind::Activation) => 10,
            _ => 5,
        }
    }

    fn null_entry(stim_id: &str, notes: &str) -> Self {
        Self {
            stim_id: StimId::from(stim_id),
            brain_location: None,
            hemisphere: None,
            period: String::new(),
            relative_location: String::new(),
            kind: None,
            duration_ms: 0.0,
            shape: String::new(),
            freq_hz: 0.0,
            notes: notes.to_string(),
        }
    }

    fn entry(
        stim_id: &str,
        brain_location: &str,
        hemisphere: Hemisphere,
        period: &str,
        relative_location: &str,
        kind: StimKind,
        duration_ms: f64,
        shape: &str,
        freq_hz: f64,
    ) -> Self {
        Self {
            stim_id: StimId::from(stim_id),
            brain_location: Some(brain_location.to_string()),
            hemisphere: Some(hemisphere),
            period: period.to_string(),
            relative_location: relative_location.to_string(),
            kind: Some(kind),
            duration_ms,
            shape: shape.to_string(),
            freq_hz,
            notes: String::new(),
        }
    }

    /// The full closed lookup used by this experiment series
    pub fn lookup_contents() -> Vec<PhotoStimCondition> {
        use Hemisphere::Right;
        use StimKind::{Activation, Inhibition};
        vec![
            Self::null_entry(StimId::CONTROL, "no stimulation control"),
            Self::entry("1", "Fastigial", Right, "sample", "contralateral", Activation, 500.0, "5ms pulse", 20.0),
            Self::entry("2", "Fastigial", Right, "delay", "contralateral", Activation, 500.0, "5ms pulse", 20.0),
            Self::entry("3", "Dentate", Right, "sample", "contralateral", Activation, 500.0, "5ms pulse", 20.0),
            Self::entry("4", "Dentate", Right, "delay", "contralateral", Activation, 500.0, "5ms pulse", 20.0),
            Self::entry("5", "DCN", Right, "delay", "contralateral", Inhibition, 500.0, "cosine", 40.0),
            Self::entry("6", "DCN", Right, "delay", "contralateral", Inhibition, 500.0, "cosine", 40.0),
            Self::null_entry(
                StimId::EXCLUDED,
                "stimulation configuration for other purposes, should not analyze",
            ),
        ]
    }
}
