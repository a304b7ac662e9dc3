//! Counted open loop manoeuvres

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::VelocityCommand;
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A fixed velocity held for a number of frames.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ManoeuvrePhase {
    pub frames: u32,
    pub linear_ms: f64,
    pub angular_rads: f64,
}

/// Steps through a sequence of phases, one frame at a time.
#[derive(Debug)]
pub struct Manoeuvre {
    phases: Vec<ManoeuvrePhase>,
    frame: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ManoeuvrePhase {
    pub fn new(frames: u32, linear_ms: f64, angular_rads: f64) -> Self {
        Self {
            frames,
            linear_ms,
            angular_rads,
        }
    }
}

impl Default for ManoeuvrePhase {
    /// Turn towards the inner loop
    fn default() -> Self {
        Self::new(20, 0.0, 1.54)
    }
}

impl Manoeuvre {
    pub fn new(phases: Vec<ManoeuvrePhase>) -> Self {
        Self { phases, frame: 0 }
    }

    /// Get the command for the next frame, or `None` once every phase is complete.
    pub fn next_cmd(&mut self) -> Option<VelocityCommand> {
        let mut start = 0;

        for phase in &self.phases {
            if self.frame < start + phase.frames {
                self.frame += 1;
                return Some(VelocityCommand::new(phase.linear_ms, phase.angular_rads));
            }
            start += phase.frames;
        }

        None
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_phases() {
        let mut m = Manoeuvre::new(vec![
            ManoeuvrePhase::new(2, 1.0, 0.0),
            ManoeuvrePhase::new(0, 5.0, 5.0),
            ManoeuvrePhase::new(1, 0.0, 1.2),
        ]);

        assert_eq!(m.next_cmd(), Some(VelocityCommand::new(1.0, 0.0)));
        assert_eq!(m.next_cmd(), Some(VelocityCommand::new(1.0, 0.0)));
        assert_eq!(m.next_cmd(), Some(VelocityCommand::new(0.0, 1.2)));
        assert_eq!(m.next_cmd(), None);
        assert_eq!(m.next_cmd(), None);

        assert_eq!(Manoeuvre::new(vec![]).next_cmd(), None);
    }
}
