//! Serialisable snapshots of the evidence for session diagnostics

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;

use serde::Serialize;

use super::TrackLoop;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Snapshot of one loop's evidence.
#[derive(Debug, Clone, Serialize)]
pub struct LoopDiagnostics {
    pub track_loop: TrackLoop,
    pub finalized: bool,
    pub ids: BTreeMap<String, IdDiagnostics>,
    pub plates: BTreeMap<String, PlateDiagnostics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdDiagnostics {
    pub count: u32,
    pub probs: Vec<f64>,

    /// Plates read alongside this id
    pub plates: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlateDiagnostics {
    pub count: u32,
    pub char_maxima: Vec<f64>,
    pub energy: f64,
}
