//! # [`NavMgr<CrosswalkStopped>`] state
//!
//! The robot waits at the crosswalk until a pedestrian has been seen crossing. This is also where
//! the outer loop is left once it has been driven for long enough.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::VelocityCommand;
use log::{info, trace};

use crate::{
    evidence::TrackLoop,
    motion_detector::{GatePolicy, MotionDetector},
    vision::{crop_gray, Frame},
};

use super::{
    states::{Crossing, FinalizeEvidence},
    MotionWatchParams, NavMgrParams, NavMgrPersistantData, NavState, StepOutput,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct CrosswalkStopped {
    /// True once this stop has been counted
    visit_counted: bool,

    detector: MotionDetector,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CrosswalkStopped {
    pub fn new(params: &MotionWatchParams, frame_rate_hz: f64) -> Self {
        Self {
            visit_counted: false,
            detector: MotionDetector::new(
                GatePolicy::PedestrianCrossing,
                &params.gate,
                frame_rate_hz,
            ),
        }
    }

    pub fn step(
        &mut self,
        params: &NavMgrParams,
        persistant: &mut NavMgrPersistantData,
        frame: &Frame,
    ) -> StepOutput {
        if !self.visit_counted {
            self.visit_counted = true;
            persistant.crosswalk_visits += 1;

            info!(
                "Stopped at crosswalk {} after {:.1} s",
                persistant.crosswalk_visits,
                persistant.elapsed_s()
            );
        }

        // Checked on every stopped frame, the minimum time can pass while waiting here
        let gates = &params.loop_gates;
        if persistant.elapsed_s() > gates.outer_min_time_s
            && persistant.crosswalk_visits >= gates.outer_min_crosswalk_visits
        {
            info!(
                "Outer loop complete after {:.1} s and {} crosswalks",
                persistant.elapsed_s(),
                persistant.crosswalk_visits
            );
            return StepOutput::stop_and(NavState::FinalizeOuter(FinalizeEvidence::new(
                TrackLoop::Outer,
                &params.evidence.outer_ids,
            )));
        }

        let pedestrian_crossed = match crop_gray(frame, &params.pedestrian.window) {
            Some(crop) => self.detector.observe(crop),
            None => {
                trace!("Empty pedestrian window");
                false
            }
        };

        if pedestrian_crossed {
            info!("Pedestrian has crossed, crossing");
            StepOutput::stop_and(NavState::Crossing(Crossing::new()))
        } else {
            StepOutput::cmd(VelocityCommand::stop())
        }
    }
}
