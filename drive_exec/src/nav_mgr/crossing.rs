//! # [`NavMgr<Crossing>`] state
//!
//! Crosses the crosswalk at a fixed speed while the outer steering model keeps the robot on the
//! road. The crosswalk lines are ignored for the duration of the crossing, but the slow zone is
//! still tracked and plates in view are still read.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{drive::VelocityCommand, infer::SteerModel};
use util::maths::with_magnitude;

use crate::{
    evidence::TrackLoop,
    vision::{Frame, Perception},
};

use super::{
    drive::{acquire, steer, update_slow_zone},
    states::OuterDrive,
    NavMgrParams, NavMgrPersistantData, NavState, StepOutput,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Crossing {
    frames: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Crossing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(
        &mut self,
        params: &NavMgrParams,
        persistant: &mut NavMgrPersistantData,
        frame: &Frame,
        perception: &mut dyn Perception,
    ) -> StepOutput {
        if self.frames >= params.crosswalk.crossing_frames {
            return StepOutput {
                next: Some(NavState::OuterDrive(OuterDrive::new())),
                ..StepOutput::none()
            };
        }
        self.frames += 1;

        let is_slow_zone = update_slow_zone(&params.proximity, persistant, frame);
        if is_slow_zone {
            acquire(persistant, frame, perception, TrackLoop::Outer);
        }

        // Only the forward speed is overridden
        match steer(
            &params.motion_policy,
            frame,
            perception,
            SteerModel::Outer,
            is_slow_zone,
        ) {
            Some(cmd) => StepOutput::cmd(VelocityCommand::new(
                with_magnitude(cmd.linear_ms, params.crosswalk.crossing_speed_ms),
                cmd.angular_rads,
            )),
            None => StepOutput::none(),
        }
    }
}
