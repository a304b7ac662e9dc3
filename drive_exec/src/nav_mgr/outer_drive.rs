//! # [`NavMgr<OuterDrive>`] state
//!
//! Follows the outer loop using the outer steering model. Plates are read while in the slow zone
//! and the robot stops on reaching a crosswalk.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::infer::SteerModel;

use crate::{
    evidence::TrackLoop,
    vision::{Frame, Perception},
};

use super::{
    drive::{acquire, crosswalk_ahead, steer, update_slow_zone},
    states::CrosswalkStopped,
    NavMgrParams, NavMgrPersistantData, NavState, StepOutput,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct OuterDrive;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl OuterDrive {
    pub fn new() -> Self {
        Self
    }

    pub fn step(
        &mut self,
        params: &NavMgrParams,
        persistant: &mut NavMgrPersistantData,
        frame: &Frame,
        perception: &mut dyn Perception,
    ) -> StepOutput {
        let is_slow_zone = update_slow_zone(&params.proximity, persistant, frame);

        // Plates are only read in the slow zone
        if is_slow_zone {
            acquire(persistant, frame, perception, TrackLoop::Outer);
        }

        if crosswalk_ahead(&params.crosswalk, frame) {
            return StepOutput::stop_and(NavState::CrosswalkStopped(CrosswalkStopped::new(
                &params.pedestrian,
                persistant.frame_rate_hz,
            )));
        }

        match steer(
            &params.motion_policy,
            frame,
            perception,
            SteerModel::Outer,
            is_slow_zone,
        ) {
            Some(cmd) => StepOutput::cmd(cmd),
            None => StepOutput::none(),
        }
    }
}
