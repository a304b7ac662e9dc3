//! # [`NavMgr<Straighten>`] state
//!
//! Squares the robot up to the crosswalk line before turning towards the inner loop. Rotation is
//! corrected first, and the distance to the line only once the rotation reads centred.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::VelocityCommand;
use log::trace;

use crate::{
    line_aligner::{AlignState, LineOffset},
    vision::Frame,
};

use super::{
    states::TurnToInner, NavMgrParams, NavMgrPersistantData, NavState, StepOutput,
    StraightenParams,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Straighten;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Straighten {
    pub fn new() -> Self {
        Self
    }

    pub fn step(
        &mut self,
        params: &NavMgrParams,
        persistant: &mut NavMgrPersistantData,
        frame: &Frame,
    ) -> StepOutput {
        let offset = match persistant.line_aligner.estimate(frame) {
            Some(o) => o,
            None => {
                trace!("No line found, holding");
                return StepOutput::cmd(VelocityCommand::stop());
            }
        };

        if offset.is_centred() {
            return StepOutput::stop_and(NavState::TurnToInner(TurnToInner::new(
                params.turn_to_inner,
            )));
        }

        StepOutput::cmd(correction(&params.straighten, &offset))
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Velocity demand correcting the given offset.
///
/// A line angled negative in the image is corrected by turning left. A line above the target row
/// is corrected by driving forwards, which is only done once the angle is centred.
fn correction(params: &StraightenParams, offset: &LineOffset) -> VelocityCommand {
    let angular_rads = -offset.angular.as_sign() * params.angular_rads;

    let linear_ms = if offset.angular == AlignState::Centre {
        -offset.lateral.as_sign() * params.linear_ms
    } else {
        0.0
    };

    VelocityCommand::new(linear_ms, angular_rads)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_correction() {
        let p = StraightenParams::default();

        let off = LineOffset {
            angular: AlignState::Low,
            lateral: AlignState::High,
        };
        assert_eq!(correction(&p, &off), VelocityCommand::new(0.0, 0.1));

        let off = LineOffset {
            angular: AlignState::Centre,
            lateral: AlignState::High,
        };
        assert_eq!(correction(&p, &off), VelocityCommand::new(-0.2, 0.0));

        let off = LineOffset {
            angular: AlignState::Centre,
            lateral: AlignState::Low,
        };
        assert_eq!(correction(&p, &off), VelocityCommand::new(0.2, 0.0));
    }
}
