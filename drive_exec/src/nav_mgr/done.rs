//! # [`NavMgr<Done>`] state

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::VelocityCommand;

use super::{NavMgrParams, NavMgrPersistantData, ResultParams, StepOutput};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Final state. The robot stays stopped and the end record is published on every frame.
#[derive(Debug)]
pub struct Done {
    end_id: String,
    placeholder_plate: String,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Done {
    pub fn new(params: &ResultParams) -> Self {
        Self {
            end_id: params.end_id.clone(),
            placeholder_plate: params.placeholder_plate.clone(),
        }
    }

    pub fn step(
        &mut self,
        _params: &NavMgrParams,
        persistant: &mut NavMgrPersistantData,
    ) -> StepOutput {
        StepOutput {
            records: vec![persistant.record(&self.end_id, &self.placeholder_plate)],
            ..StepOutput::cmd(VelocityCommand::stop())
        }
    }
}
