//! # [`NavMgr<StartSeq>`] state
//!
//! Opens the run. After a short wait the start record is published, which starts the scoring
//! clock, and a counted manoeuvre takes the robot out of the start position onto the outer loop.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::info;

use super::{
    manoeuvre::Manoeuvre, states::OuterDrive, NavMgrParams, NavMgrPersistantData, NavState,
    StartSeqParams, StepOutput,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct StartSeq {
    /// Number of frames seen in this state
    frames: u32,

    wait_frames: u32,

    manoeuvre: Manoeuvre,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StartSeq {
    pub fn new(params: &StartSeqParams) -> Self {
        Self {
            frames: 0,
            wait_frames: params.wait_frames,
            manoeuvre: Manoeuvre::new(params.phases.clone()),
        }
    }

    pub fn step(
        &mut self,
        params: &NavMgrParams,
        persistant: &mut NavMgrPersistantData,
    ) -> StepOutput {
        let frame = self.frames;
        self.frames = self.frames.saturating_add(1);

        if frame < self.wait_frames {
            return StepOutput::none();
        }

        if frame == self.wait_frames {
            info!("Starting run");
            let results = &params.results;
            return StepOutput {
                records: vec![persistant.record(&results.start_id, &results.placeholder_plate)],
                ..StepOutput::none()
            };
        }

        match self.manoeuvre.next_cmd() {
            Some(cmd) => StepOutput::cmd(cmd),
            None => StepOutput::stop_and(NavState::OuterDrive(OuterDrive::new())),
        }
    }
}
