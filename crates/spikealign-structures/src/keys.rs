// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Addressing keys for sessions, probe insertions, and units
//!
//! Keys mirror the upstream relational schema: a session is (subject, date),
//! an insertion is a session plus the targeted brain location, a unit is an
//! insertion plus the sorted unit id. They are plain value types so the
//! storage boundary can use them as map keys and the batch runner can derive
//! per-task seeds from them.

use core::fmt;
use serde::{Deserialize, Serialize};

/// One recording session: subject plus session date
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub subject_id: String,
    /// ISO date string, e.g. "2018-03-04"
    pub session_date: String,
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.subject_id, self.session_date)
    }
}

/// One probe insertion within a session, keyed by the recorded brain location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InsertionKey {
    pub session: SessionKey,
    pub brain_location: String,
}

impl fmt::Display for InsertionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.session, self.brain_location)
    }
}

/// One sorted unit within a probe insertion
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitKey {
    pub insertion: InsertionKey,
    pub unit_id: u16,
}

impl UnitKey {
    /// The session this unit was recorded in
    pub fn session(&self) -> &SessionKey {
        &self.insertion.session
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/unit{}", self.insertion, self.unit_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_key() -> UnitKey {
        UnitKey {
            insertion: InsertionKey {
                session: SessionKey {
                    subject_id: "GR1523".to_string(),
                    session_date: "2018-03-04".to_string(),
                },
                brain_location: "Fastigial".to_string(),
            },
            unit_id: 12,
        }
    }

    #[test]
    fn test_unit_key_display() {
        assert_eq!(unit_key().to_string(), "GR1523/2018-03-04/Fastigial/unit12");
    }

    #[test]
    fn test_keys_roundtrip_serde() {
        let key = unit_key();
        let json = serde_json::to_string(&key).unwrap();
        let back: UnitKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, back);
    }
}
