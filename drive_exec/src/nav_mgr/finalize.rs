//! # [`NavMgr<FinalizeEvidence>`] state
//!
//! Closes the evidence of one loop and publishes its results, one id per frame so that each
//! result goes out as soon as it is known. Once every id has been handled the loop's evidence is
//! saved to the session for later inspection.
//!
//! Ids with no evidence are skipped, nothing is published for them.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::VecDeque;

use comms_if::eqpt::drive::VelocityCommand;
use log::{error, info, warn};

use crate::evidence::TrackLoop;

use super::{
    states::{Done, Straighten},
    NavMgrParams, NavMgrPersistantData, NavState, StepOutput,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct FinalizeEvidence {
    track_loop: TrackLoop,

    /// Ids still to be resolved, `None` until the loop has been finalized
    pending: Option<VecDeque<String>>,

    /// Ids of the loop, in publishing order
    ids: Vec<String>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FinalizeEvidence {
    pub fn new(track_loop: TrackLoop, ids: &[String]) -> Self {
        Self {
            track_loop,
            pending: None,
            ids: ids.to_vec(),
        }
    }

    pub fn step(
        &mut self,
        params: &NavMgrParams,
        persistant: &mut NavMgrPersistantData,
    ) -> StepOutput {
        let track_loop = self.track_loop;
        let evidence = &mut persistant.evidence;

        let ids = &self.ids;

        // The loop is finalized on the first frame
        let pending = self.pending.get_or_insert_with(|| {
            if let Err(e) = evidence.finalize(track_loop) {
                error!("Could not finalize {} loop evidence: {}", track_loop, e);
            }

            ids.iter()
                .filter(|id| {
                    let has_evidence = evidence.id_count(id) > 0;
                    if !has_evidence {
                        warn!("No evidence for id {}, it will not be reported", id);
                    }
                    has_evidence
                })
                .cloned()
                .collect()
        });

        match pending.pop_front() {
            Some(id) => {
                let mut output = StepOutput::cmd(VelocityCommand::stop());

                match evidence.resolve(&id) {
                    Ok(plate) => {
                        info!(
                            "Id {} resolved to {} from {} readings",
                            id,
                            plate,
                            evidence.id_count(&id)
                        );
                        output.records.push(persistant.record(&id, &plate));
                    }
                    Err(e) => error!("Could not resolve id {}: {}", id, e),
                }

                output
            }
            None => {
                save_diagnostics(persistant, track_loop);

                let next = match track_loop {
                    TrackLoop::Outer => NavState::Straighten(Straighten::new()),
                    TrackLoop::Inner => NavState::Done(Done::new(&params.results)),
                };

                StepOutput::stop_and(next)
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn save_diagnostics(persistant: &NavMgrPersistantData, track_loop: TrackLoop) {
    let diag = persistant.evidence.diagnostics(track_loop);

    for (id, stats) in &diag.ids {
        info!(
            "{} loop id {}: {} readings, plates {:?}",
            track_loop, id, stats.count, stats.plates
        );
    }

    if let Some(ref session) = persistant.session {
        session.save(format!("evidence/{}_stats.json", track_loop), diag);
        session.save(
            "evidence/results.json",
            persistant.evidence.results().clone(),
        );
    }
}
