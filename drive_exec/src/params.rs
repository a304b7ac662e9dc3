//! # Drive Executable Parameters
//!
//! This module provide parameters for the drive executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::nav_mgr::ResultTags;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveExecParams {
    /// Nominal rate frames are published at.
    ///
    /// Units: hertz
    pub frame_rate_hz: f64,

    /// Team tag sent with every plate record
    pub team: String,

    /// Session tag sent with every plate record
    pub session: String,

    /// Time the executable keeps publishing the end record for once the run is done.
    ///
    /// Units: seconds
    pub done_linger_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveExecParams {
    pub fn result_tags(&self) -> ResultTags {
        ResultTags {
            team: self.team.clone(),
            session: self.session.clone(),
        }
    }
}
