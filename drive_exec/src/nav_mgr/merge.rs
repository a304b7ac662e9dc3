//! # [`NavMgr<MergeIntoInner>`] state

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{
    manoeuvre::Manoeuvre, states::InnerDrive, MergeParams, NavMgrParams, NavMgrPersistantData,
    NavState, StepOutput,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Drives onto the inner loop with a counted open loop manoeuvre: straight ahead, then driving
/// while turning, then turning on the spot.
#[derive(Debug)]
pub struct MergeIntoInner {
    merge: Manoeuvre,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MergeIntoInner {
    pub fn new(params: &MergeParams) -> Self {
        Self {
            merge: Manoeuvre::new(params.phases.clone()),
        }
    }

    pub fn step(
        &mut self,
        _params: &NavMgrParams,
        _persistant: &mut NavMgrPersistantData,
    ) -> StepOutput {
        match self.merge.next_cmd() {
            Some(cmd) => StepOutput::cmd(cmd),
            None => StepOutput::stop_and(NavState::InnerDrive(InnerDrive::new())),
        }
    }
}
