//! # [`NavMgr<TurnToInner>`] state

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{
    manoeuvre::{Manoeuvre, ManoeuvrePhase},
    states::WaitForGap,
    NavMgrParams, NavMgrPersistantData, NavState, StepOutput,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Turns on the spot towards the inner loop for a fixed number of frames.
#[derive(Debug)]
pub struct TurnToInner {
    turn: Manoeuvre,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TurnToInner {
    pub fn new(phase: ManoeuvrePhase) -> Self {
        Self {
            turn: Manoeuvre::new(vec![phase]),
        }
    }

    pub fn step(
        &mut self,
        params: &NavMgrParams,
        persistant: &mut NavMgrPersistantData,
    ) -> StepOutput {
        match self.turn.next_cmd() {
            Some(cmd) => StepOutput::cmd(cmd),
            None => StepOutput::stop_and(NavState::WaitForGap(WaitForGap::new(
                &params.obstacle,
                persistant.frame_rate_hz,
            ))),
        }
    }
}
