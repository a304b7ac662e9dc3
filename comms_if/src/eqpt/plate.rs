//! # Plate result records
//!
//! Results are reported to the scoring server as a single comma separated line:
//!
//! ```text
//! team,session,id,plate
//! ```
//!
//! The scorer treats a record with id `0` as the start of the timed run and a record with id `-1`
//! as its end.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single result line sent to the scoring server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateRecord {
    /// Team tag
    pub team: String,

    /// Session password/tag
    pub session: String,

    /// Parking id, or a sentinel
    pub id: String,

    /// Plate string, or a placeholder
    pub plate: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum PlateRecordParseError {
    #[error("Expected 4 comma separated fields, found {0}")]
    WrongFieldCount(usize),

    #[error("Field {0} is empty")]
    EmptyField(usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PlateRecord {
    pub fn new(team: &str, session: &str, id: &str, plate: &str) -> Self {
        Self {
            team: team.into(),
            session: session.into(),
            id: id.into(),
            plate: plate.into(),
        }
    }
}

impl Display for PlateRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.team, self.session, self.id, self.plate)
    }
}

impl FromStr for PlateRecord {
    type Err = PlateRecordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(',').map(str::trim).collect();

        if fields.len() != 4 {
            return Err(PlateRecordParseError::WrongFieldCount(fields.len()));
        }

        if let Some(i) = fields.iter().position(|f| f.is_empty()) {
            return Err(PlateRecordParseError::EmptyField(i));
        }

        Ok(Self::new(fields[0], fields[1], fields[2], fields[3]))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_record_line() {
        let rec = PlateRecord::new("TeamRed", "multi21", "-1", "AA00");
        assert_eq!(rec.to_string(), "TeamRed,multi21,-1,AA00");
        assert_eq!("TeamRed,multi21,-1,AA00".parse(), Ok(rec));
    }

    #[test]
    fn test_bad_record_line() {
        assert_eq!(
            "TeamRed,multi21,3".parse::<PlateRecord>(),
            Err(PlateRecordParseError::WrongFieldCount(3))
        );
        assert_eq!(
            "TeamRed,,3,AB12".parse::<PlateRecord>(),
            Err(PlateRecordParseError::EmptyField(1))
        );
    }
}
