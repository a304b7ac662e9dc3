//! # NavMgr Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::{
    evidence::EvidenceParams,
    line_aligner::LineAlignerParams,
    motion_detector::MotionGateParams,
    motion_policy::MotionPolicyParams,
    vision::{CropWindow, HsvRange},
};

use super::manoeuvre::ManoeuvrePhase;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct NavMgrParams {
    pub motion_policy: MotionPolicyParams,

    pub proximity: ProximityParams,

    pub crosswalk: CrosswalkParams,

    pub pedestrian: MotionWatchParams,

    pub obstacle: MotionWatchParams,

    pub line_aligner: LineAlignerParams,

    pub straighten: StraightenParams,

    pub start_seq: StartSeqParams,

    pub turn_to_inner: ManoeuvrePhase,

    pub merge: MergeParams,

    pub evidence: EvidenceParams,

    pub loop_gates: LoopGateParams,

    pub results: ResultParams,
}

/// Detection of a plate close enough to read.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ProximityParams {
    /// Colour of the cars the plates are mounted on
    pub colour: HsvRange,

    /// Part of the frame searched for the car
    pub window: CropWindow,

    /// The largest car region must be larger than this to count as near.
    ///
    /// Units: pixels
    pub min_area_px: u32,

    /// The largest car region must be smaller than this to count as near.
    ///
    /// Units: pixels
    pub max_area_px: u32,

    /// Number of frames the slow zone is held after the car is no longer near
    pub hold_frames: u32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CrosswalkParams {
    /// Colour of the crosswalk lines
    pub colour: HsvRange,

    /// A line region larger than this means the crosswalk has been reached.
    ///
    /// Units: pixels
    pub min_area_px: u32,

    /// Forward speed used while crossing.
    ///
    /// Units: meters/second
    pub crossing_speed_ms: f64,

    /// Number of frames spent crossing
    pub crossing_frames: u32,
}

/// A motion gate watching part of the frame.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MotionWatchParams {
    pub gate: MotionGateParams,
    pub window: CropWindow,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StraightenParams {
    /// Magnitude of the turn rate correction.
    ///
    /// Units: radians/second
    pub angular_rads: f64,

    /// Magnitude of the forward/backward correction.
    ///
    /// Units: meters/second
    pub linear_ms: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartSeqParams {
    /// Frames to wait before the start record is published
    pub wait_frames: u32,

    /// Phases driven after the start record
    pub phases: Vec<ManoeuvrePhase>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergeParams {
    pub phases: Vec<ManoeuvrePhase>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LoopGateParams {
    /// Minimum time before the outer loop may be left.
    ///
    /// Units: seconds
    pub outer_min_time_s: f64,

    /// Minimum number of crosswalk stops, including the current one, before the outer loop may
    /// be left
    pub outer_min_crosswalk_visits: u32,

    /// Number of readings of every inner id after which the inner loop is complete
    pub inner_min_id_count: u32,

    /// Time after which the inner loop is complete whatever was read.
    ///
    /// Units: seconds
    pub inner_max_time_s: f64,
}

/// Contents of the records bounding the run.
#[derive(Debug, Clone, Deserialize)]
pub struct ResultParams {
    pub start_id: String,
    pub end_id: String,

    /// Plate sent with the start and end records
    pub placeholder_plate: String,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ProximityParams {
    fn default() -> Self {
        Self {
            colour: HsvRange::BLUE,
            window: CropWindow {
                row_start: 0.4,
                ..CropWindow::FULL
            },
            min_area_px: 9000,
            max_area_px: 60000,
            hold_frames: 5,
        }
    }
}

impl Default for CrosswalkParams {
    fn default() -> Self {
        Self {
            colour: HsvRange::RED,
            min_area_px: 3500,
            crossing_speed_ms: 0.4,
            crossing_frames: 60,
        }
    }
}

impl MotionWatchParams {
    pub fn pedestrian() -> Self {
        Self {
            gate: MotionGateParams {
                settle_time_s: 1.0,
                low_threshold: 9.0,
                high_threshold: 40.0,
            },
            window: CropWindow {
                row_start: 0.25,
                row_end: 0.75,
                col_start: 0.25,
                col_end: 0.75,
            },
        }
    }

    pub fn obstacle() -> Self {
        Self {
            gate: MotionGateParams {
                settle_time_s: 0.5,
                low_threshold: 15.0,
                high_threshold: 70.0,
            },
            window: CropWindow {
                row_start: 1.0 / 3.0,
                row_end: 2.0 / 3.0,
                col_start: 1.0 / 2.65,
                col_end: 2.0 / 2.65,
            },
        }
    }
}

impl Default for NavMgrParams {
    fn default() -> Self {
        Self {
            motion_policy: MotionPolicyParams::default(),
            proximity: ProximityParams::default(),
            crosswalk: CrosswalkParams::default(),
            pedestrian: MotionWatchParams::pedestrian(),
            obstacle: MotionWatchParams::obstacle(),
            line_aligner: LineAlignerParams::default(),
            straighten: StraightenParams::default(),
            start_seq: StartSeqParams::default(),
            turn_to_inner: ManoeuvrePhase::default(),
            merge: MergeParams::default(),
            evidence: EvidenceParams::default(),
            loop_gates: LoopGateParams::default(),
            results: ResultParams::default(),
        }
    }
}

impl Default for StraightenParams {
    fn default() -> Self {
        Self {
            angular_rads: 0.1,
            linear_ms: 0.2,
        }
    }
}

impl Default for StartSeqParams {
    fn default() -> Self {
        Self {
            wait_frames: 10,
            phases: vec![
                ManoeuvrePhase::new(9, 0.7, 1.4),
                ManoeuvrePhase::new(6, 0.0, 2.8),
            ],
        }
    }
}

impl Default for MergeParams {
    fn default() -> Self {
        Self {
            phases: vec![
                ManoeuvrePhase::new(6, 1.0, 0.0),
                ManoeuvrePhase::new(12, 0.4, 1.6),
                ManoeuvrePhase::new(6, 0.0, 1.2),
            ],
        }
    }
}

impl Default for LoopGateParams {
    fn default() -> Self {
        Self {
            outer_min_time_s: 120.0,
            outer_min_crosswalk_visits: 4,
            inner_min_id_count: 4,
            inner_max_time_s: 230.0,
        }
    }
}

impl Default for ResultParams {
    fn default() -> Self {
        Self {
            start_id: "0".into(),
            end_id: "-1".into(),
            placeholder_plate: "AA00".into(),
        }
    }
}
