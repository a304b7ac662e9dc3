//! # Motion policy module
//!
//! Maps the discrete action chosen by a steering classifier onto a velocity demand. Near a plate
//! the demand is damped so that the plate stays in view for long enough to be read.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::VelocityCommand;
use ndarray::Array1;
use ndarray_stats::QuantileExt;
use util::maths::with_magnitude;

pub use params::MotionPolicyParams;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The actions the steering classifiers choose between, in classifier output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveAction {
    Forward,
    TurnRight,
    TurnLeft,
    ForwardRight,
    ForwardLeft,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveAction {
    /// Number of actions, and so the length of a classifier output
    pub const NUM_ACTIONS: usize = 5;

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(DriveAction::Forward),
            1 => Some(DriveAction::TurnRight),
            2 => Some(DriveAction::TurnLeft),
            3 => Some(DriveAction::ForwardRight),
            4 => Some(DriveAction::ForwardLeft),
            _ => None,
        }
    }

    /// Select the most probable action from a classifier output.
    ///
    /// Returns `None` if the output has the wrong length or contains NaNs.
    pub fn from_probs(probs: &Array1<f64>) -> Option<Self> {
        if probs.len() != Self::NUM_ACTIONS {
            return None;
        }

        probs.argmax().ok().and_then(Self::from_index)
    }

    /// The action's template as signed unit factors `(linear, angular)`.
    ///
    /// Positive angular is a turn to the left.
    fn template(&self) -> (f64, f64) {
        match self {
            DriveAction::Forward => (1.0, 0.0),
            DriveAction::TurnRight => (0.0, -1.0),
            DriveAction::TurnLeft => (0.0, 1.0),
            DriveAction::ForwardRight => (1.0, -1.0),
            DriveAction::ForwardLeft => (1.0, 1.0),
        }
    }
}

/// Compute the velocity demand for an action.
///
/// On the inner loop the forward speed is replaced by the inner loop speed. In the slow zone both
/// components are replaced by the slow magnitudes of the current loop. Signs are always kept and
/// a component which the action does not demand stays zero.
pub fn decide(
    params: &MotionPolicyParams,
    action: DriveAction,
    is_slow_zone: bool,
    is_inner_loop: bool,
) -> VelocityCommand {
    let (lin, ang) = action.template();

    let mut linear_ms = lin * params.forward_ms;
    let mut angular_rads = ang * params.turn_rads;

    if is_inner_loop {
        linear_ms = with_magnitude(linear_ms, params.inner_forward_ms);
    }

    if is_slow_zone {
        let (slow_lin, slow_ang) = if is_inner_loop {
            (params.inner_slow_linear_ms, params.inner_slow_angular_rads)
        } else {
            (params.outer_slow_linear_ms, params.outer_slow_angular_rads)
        };

        linear_ms = with_magnitude(linear_ms, slow_lin);
        angular_rads = with_magnitude(angular_rads, slow_ang);
    }

    VelocityCommand::new(linear_ms, angular_rads)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_action_table() {
        let p = MotionPolicyParams::default();

        assert_eq!(
            decide(&p, DriveAction::Forward, false, false),
            VelocityCommand::new(0.5, 0.0)
        );
        assert_eq!(
            decide(&p, DriveAction::TurnRight, false, false),
            VelocityCommand::new(0.0, -1.0)
        );
        assert_eq!(
            decide(&p, DriveAction::ForwardLeft, false, false),
            VelocityCommand::new(0.5, 1.0)
        );
    }

    #[test]
    fn test_slow_zone_keeps_sign_and_zero() {
        let p = MotionPolicyParams::default();

        let cmd = decide(&p, DriveAction::Forward, true, false);
        assert_eq!(cmd.linear_ms, p.outer_slow_linear_ms);
        assert_eq!(cmd.angular_rads, 0.0);

        let cmd = decide(&p, DriveAction::ForwardRight, true, false);
        assert_eq!(cmd.linear_ms, p.outer_slow_linear_ms);
        assert_eq!(cmd.angular_rads, -p.outer_slow_angular_rads);

        let cmd = decide(&p, DriveAction::TurnLeft, true, true);
        assert_eq!(cmd.linear_ms, 0.0);
        assert_eq!(cmd.angular_rads, p.inner_slow_angular_rads);
    }

    #[test]
    fn test_inner_loop_speed() {
        let p = MotionPolicyParams {
            inner_forward_ms: 0.3,
            ..Default::default()
        };

        let cmd = decide(&p, DriveAction::ForwardLeft, false, true);
        assert_eq!(cmd, VelocityCommand::new(0.3, 1.0));

        let cmd = decide(&p, DriveAction::ForwardLeft, true, true);
        assert_eq!(
            cmd,
            VelocityCommand::new(p.inner_slow_linear_ms, p.inner_slow_angular_rads)
        );
    }

    #[test]
    fn test_from_probs() {
        assert_eq!(
            DriveAction::from_probs(&arr1(&[0.1, 0.1, 0.6, 0.1, 0.1])),
            Some(DriveAction::TurnLeft)
        );
        assert_eq!(DriveAction::from_probs(&arr1(&[0.5, 0.5])), None);
        assert_eq!(
            DriveAction::from_probs(&arr1(&[0.1, std::f64::NAN, 0.6, 0.1, 0.1])),
            None
        );
    }
}
