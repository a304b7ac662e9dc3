//! # [`NavMgr<InnerDrive>`] state
//!
//! Follows the inner loop using the inner steering model, reading the inner loop plates. The loop
//! is complete once every inner id has been read enough times, or when time runs out.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::infer::SteerModel;
use log::{info, warn};

use crate::{
    evidence::TrackLoop,
    vision::{Frame, Perception},
};

use super::{
    drive::{acquire, steer, update_slow_zone},
    states::FinalizeEvidence,
    NavMgrParams, NavMgrPersistantData, NavState, StepOutput,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct InnerDrive;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl InnerDrive {
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

        if is_slow_zone {
            acquire(persistant, frame, perception, TrackLoop::Inner);
        }

        let gates = &params.loop_gates;
        let inner_ids = &params.evidence.inner_ids;

        let all_read = inner_ids
            .iter()
            .all(|id| persistant.evidence.id_count(id) >= gates.inner_min_id_count);
        let out_of_time = persistant.elapsed_s() > gates.inner_max_time_s;

        if all_read || out_of_time {
            if all_read {
                info!("All inner ids read, inner loop complete");
            } else {
                warn!(
                    "Out of time after {:.1} s, inner loop complete",
                    persistant.elapsed_s()
                );
            }

            return StepOutput::stop_and(NavState::FinalizeInner(FinalizeEvidence::new(
                TrackLoop::Inner,
                inner_ids,
            )));
        }

        match steer(
            &params.motion_policy,
            frame,
            perception,
            SteerModel::Inner,
            is_slow_zone,
        ) {
            Some(cmd) => StepOutput::cmd(cmd),
            None => StepOutput::none(),
        }
    }
}
