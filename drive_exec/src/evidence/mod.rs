//! # Evidence aggregation
//!
//! Single frame reads of a plate are noisy. The [`EvidenceAggregator`] collects every reading of a
//! parking id together with the plate read alongside it, and once a loop of the track is complete
//! resolves the most likely plate for each id.
//!
//! Each loop of the track keeps its own ledger. Readings accumulate by elementwise sum, are
//! averaged exactly once when the loop is finalized, and ids are then resolved one at a time. A
//! resolved result is never changed.
//!
//! The best plate for an id is the one read most often with it. Equal counts are broken by the
//! confidence energy of the averaged plate (the sum of the squared per character maxima), and
//! equal energies by taking the lexicographically smaller plate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod diag;
mod stats;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    cmp::Reverse,
    collections::{BTreeMap, BTreeSet},
    fmt::Display,
};

use log::debug;
use ndarray::{Array1, Array2};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

pub use diag::{IdDiagnostics, LoopDiagnostics, PlateDiagnostics};
pub use stats::{IdStats, PlateStats};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct EvidenceParams {
    /// Ids drained when the outer loop is finalized, in the order they are reported. Ids never
    /// read are skipped.
    pub outer_ids: Vec<String>,

    /// Ids of the plates around the inner loop, in the order they are reported
    pub inner_ids: Vec<String>,
}

pub struct EvidenceAggregator {
    /// Ids reserved for the inner loop, every other id belongs to the outer loop
    inner_ids: BTreeSet<String>,

    outer: Ledger,
    inner: Ledger,

    /// Resolved plate for each id
    results: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct Ledger {
    ids: BTreeMap<String, IdStats>,
    id_plates: BTreeMap<String, BTreeSet<String>>,
    plates: BTreeMap<String, PlateStats>,
    finalized: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The two loops of the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackLoop {
    Outer,
    Inner,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum EvidenceError {
    #[error("Id {id} does not belong to the {track_loop} loop")]
    WrongLoop { id: String, track_loop: TrackLoop },

    #[error("Empty id or plate string")]
    EmptyReading,

    #[error("Id {id} probabilities have length {found}, expected {expected}")]
    IdShapeMismatch {
        id: String,
        expected: usize,
        found: usize,
    },

    #[error("Plate {plate} probabilities have shape {found:?}, expected {expected:?}")]
    PlateShapeMismatch {
        plate: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("The {0} loop has been finalized, no more evidence can be recorded")]
    LoopClosed(TrackLoop),

    #[error("The {0} loop has already been finalized")]
    AlreadyFinalized(TrackLoop),

    #[error("Cannot resolve id {id} before the {track_loop} loop is finalized")]
    NotFinalized { id: String, track_loop: TrackLoop },

    #[error("Id {0} has already been resolved")]
    AlreadyResolved(String),

    #[error("No evidence has been recorded for id {0}")]
    NoEvidence(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for EvidenceParams {
    fn default() -> Self {
        Self {
            outer_ids: (0..=6).map(|i| i.to_string()).collect(),
            inner_ids: vec!["7".into(), "8".into()],
        }
    }
}

impl Display for TrackLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrackLoop::Outer => write!(f, "outer"),
            TrackLoop::Inner => write!(f, "inner"),
        }
    }
}

impl EvidenceAggregator {
    pub fn new(params: &EvidenceParams) -> Self {
        Self {
            inner_ids: params.inner_ids.iter().cloned().collect(),
            outer: Ledger::default(),
            inner: Ledger::default(),
            results: BTreeMap::new(),
        }
    }

    /// The loop an id belongs to.
    pub fn loop_of(&self, id: &str) -> TrackLoop {
        if self.inner_ids.contains(id) {
            TrackLoop::Inner
        } else {
            TrackLoop::Outer
        }
    }

    /// Record a single reading of an id and the plate read alongside it, made while driving the
    /// given loop.
    ///
    /// The reading is rejected as a whole, leaving the aggregator unchanged, if the id belongs to
    /// the other loop, if the loop is already finalized, or if the probabilities do not match the
    /// shape of earlier readings.
    pub fn record(
        &mut self,
        track_loop: TrackLoop,
        id: &str,
        id_probs: &Array1<f64>,
        plate: &str,
        plate_probs: &Array2<f64>,
    ) -> Result<(), EvidenceError> {
        if id.is_empty() || plate.is_empty() {
            return Err(EvidenceError::EmptyReading);
        }

        if self.loop_of(id) != track_loop {
            return Err(EvidenceError::WrongLoop {
                id: id.into(),
                track_loop,
            });
        }

        let ledger = self.ledger_mut(track_loop);

        if ledger.finalized {
            return Err(EvidenceError::LoopClosed(track_loop));
        }

        // Validate shapes before touching anything
        if let Some(stats) = ledger.ids.get(id) {
            if stats.probs.len() != id_probs.len() {
                return Err(EvidenceError::IdShapeMismatch {
                    id: id.into(),
                    expected: stats.probs.len(),
                    found: id_probs.len(),
                });
            }
        }
        if let Some(stats) = ledger.plates.get(plate) {
            if stats.probs.dim() != plate_probs.dim() {
                return Err(EvidenceError::PlateShapeMismatch {
                    plate: plate.into(),
                    expected: stats.probs.dim(),
                    found: plate_probs.dim(),
                });
            }
        }

        match ledger.ids.get_mut(id) {
            Some(stats) => stats.add(id_probs),
            None => {
                ledger.ids.insert(id.into(), IdStats::new(id_probs.clone()));
            }
        }

        ledger
            .id_plates
            .entry(id.into())
            .or_default()
            .insert(plate.into());

        match ledger.plates.get_mut(plate) {
            Some(stats) => stats.add(plate_probs),
            None => {
                ledger
                    .plates
                    .insert(plate.into(), PlateStats::new(plate_probs.clone()));
            }
        }

        debug!("Recorded id {} with plate {} ({} loop)", id, plate, track_loop);

        Ok(())
    }

    /// Average the evidence of a loop. Must be called exactly once per loop, and no more
    /// evidence can be recorded for the loop afterwards.
    pub fn finalize(&mut self, track_loop: TrackLoop) -> Result<(), EvidenceError> {
        let ledger = self.ledger_mut(track_loop);

        if ledger.finalized {
            return Err(EvidenceError::AlreadyFinalized(track_loop));
        }

        ledger.ids.values_mut().for_each(IdStats::normalise);
        ledger.plates.values_mut().for_each(PlateStats::normalise);
        ledger.finalized = true;

        Ok(())
    }

    /// Resolve the best plate for an id, storing it in the result table.
    pub fn resolve(&mut self, id: &str) -> Result<String, EvidenceError> {
        let track_loop = self.loop_of(id);
        let ledger = self.ledger(track_loop);

        if !ledger.finalized {
            return Err(EvidenceError::NotFinalized {
                id: id.into(),
                track_loop,
            });
        }

        if self.results.contains_key(id) {
            return Err(EvidenceError::AlreadyResolved(id.into()));
        }

        let best = ledger
            .id_plates
            .get(id)
            .and_then(|plates| {
                plates
                    .iter()
                    .filter_map(|p| ledger.plates.get(p).map(|s| (p, s)))
                    .max_by_key(|(p, s)| (s.count, OrderedFloat(s.energy()), Reverse(*p)))
            })
            .map(|(p, _)| p.clone())
            .ok_or_else(|| EvidenceError::NoEvidence(id.into()))?;

        self.results.insert(id.into(), best.clone());

        Ok(best)
    }

    /// Number of readings accepted for an id.
    pub fn id_count(&self, id: &str) -> u32 {
        self.ledger(self.loop_of(id))
            .ids
            .get(id)
            .map(|s| s.count)
            .unwrap_or(0)
    }

    pub fn id_stats(&self, id: &str) -> Option<&IdStats> {
        self.ledger(self.loop_of(id)).ids.get(id)
    }

    pub fn plate_stats(&self, track_loop: TrackLoop, plate: &str) -> Option<&PlateStats> {
        self.ledger(track_loop).plates.get(plate)
    }

    /// Plates read alongside an id.
    pub fn plates_for(&self, id: &str) -> Option<&BTreeSet<String>> {
        self.ledger(self.loop_of(id)).id_plates.get(id)
    }

    pub fn is_finalized(&self, track_loop: TrackLoop) -> bool {
        self.ledger(track_loop).finalized
    }

    pub fn result(&self, id: &str) -> Option<&str> {
        self.results.get(id).map(String::as_str)
    }

    pub fn results(&self) -> &BTreeMap<String, String> {
        &self.results
    }

    /// Build a serialisable snapshot of a loop's evidence.
    pub fn diagnostics(&self, track_loop: TrackLoop) -> LoopDiagnostics {
        let ledger = self.ledger(track_loop);

        LoopDiagnostics {
            track_loop,
            finalized: ledger.finalized,
            ids: ledger
                .ids
                .iter()
                .map(|(id, s)| {
                    (
                        id.clone(),
                        IdDiagnostics {
                            count: s.count,
                            probs: s.probs.to_vec(),
                            plates: ledger
                                .id_plates
                                .get(id)
                                .map(|p| p.iter().cloned().collect())
                                .unwrap_or_default(),
                        },
                    )
                })
                .collect(),
            plates: ledger
                .plates
                .iter()
                .map(|(plate, s)| {
                    (
                        plate.clone(),
                        PlateDiagnostics {
                            count: s.count,
                            char_maxima: s.char_maxima(),
                            energy: s.energy(),
                        },
                    )
                })
                .collect(),
        }
    }

    fn ledger(&self, track_loop: TrackLoop) -> &Ledger {
        match track_loop {
            TrackLoop::Outer => &self.outer,
            TrackLoop::Inner => &self.inner,
        }
    }

    fn ledger_mut(&mut self, track_loop: TrackLoop) -> &mut Ledger {
        match track_loop {
            TrackLoop::Outer => &mut self.outer,
            TrackLoop::Inner => &mut self.inner,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
