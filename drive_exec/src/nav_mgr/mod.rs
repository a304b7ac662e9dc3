//! # NavMgr module
//!
//! This module implements the [`NavMgr`] state machine, which decides what the robot does on every
//! camera frame. The run is broken down into the following states, visited in order:
//!
//! - `StartSeq` - Publish the start record and drive onto the track.
//! - `OuterDrive` - Follow the outer loop with the outer steering model, reading plates as they
//!   pass and stopping at crosswalks.
//! - `CrosswalkStopped` - Wait at a crosswalk until a pedestrian has crossed.
//! - `Crossing` - Drive over the crosswalk at a fixed speed.
//! - `FinalizeOuter` - Resolve and publish the outer loop plates.
//! - `Straighten` - Square up to the crosswalk line.
//! - `TurnToInner` - Turn towards the inner loop.
//! - `WaitForGap` - Wait for the obstacle on the inner loop to pass.
//! - `MergeIntoInner` - Drive onto the inner loop.
//! - `InnerDrive` - Follow the inner loop with the inner steering model, reading its plates.
//! - `FinalizeInner` - Resolve and publish the inner loop plates.
//! - `Done` - Stay stopped and keep publishing the end record.
//!
//! The manager never fails on a frame. A frame on which a detection is missing contributes nothing
//! and the state carries on with the next one.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod crossing;
mod crosswalk_stopped;
mod done;
mod drive;
mod finalize;
mod inner_drive;
mod manoeuvre;
mod merge;
mod outer_drive;
mod params;
mod start_seq;
mod straighten;
mod turn_to_inner;
mod wait_for_gap;

#[cfg(test)]
mod test;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use comms_if::eqpt::{drive::VelocityCommand, plate::PlateRecord};
use log::{debug, info};
use util::session::Session;

use crate::{
    evidence::EvidenceAggregator,
    line_aligner::LineAligner,
    vision::{Frame, Perception},
};

pub use self::{
    drive::PlateProximity,
    manoeuvre::{Manoeuvre, ManoeuvrePhase},
    params::*,
};

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub mod states {
    pub use super::crossing::Crossing;
    pub use super::crosswalk_stopped::CrosswalkStopped;
    pub use super::done::Done;
    pub use super::finalize::FinalizeEvidence;
    pub use super::inner_drive::InnerDrive;
    pub use super::merge::MergeIntoInner;
    pub use super::outer_drive::OuterDrive;
    pub use super::start_seq::StartSeq;
    pub use super::straighten::Straighten;
    pub use super::turn_to_inner::TurnToInner;
    pub use super::wait_for_gap::WaitForGap;
}

use states::*;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Navigation Manager
///
/// Owns the current state and the data which persists across states.
pub struct NavMgr {
    /// Parameters for the NavMgr and all its states.
    pub params: NavMgrParams,

    /// Persistant data of the NavMgr.
    ///
    /// This is data which is valid over all states, such as the plate evidence, so that it is not
    /// lost when a new state is entered.
    pub persistant: NavMgrPersistantData,

    state: NavState,
}

pub struct NavMgrPersistantData {
    /// Evidence of the plates read so far.
    pub evidence: EvidenceAggregator,

    /// Slow zone tracker, shared by both loops.
    pub proximity: PlateProximity,

    /// Reference line estimator, used when straightening up.
    pub line_aligner: LineAligner,

    /// Number of crosswalk stops made so far.
    pub crosswalk_visits: u32,

    /// Time of the first frame.
    ///
    /// Units: seconds
    pub start_time_s: Option<f64>,

    /// Time of the current frame.
    ///
    /// Units: seconds
    pub now_s: f64,

    /// Nominal frame rate, used to convert times into frame counts.
    ///
    /// Units: hertz
    pub frame_rate_hz: f64,

    /// Team and session tags of published records.
    pub tags: ResultTags,

    /// Session used to save diagnostics, if any.
    pub session: Option<Session>,
}

/// Tags identifying the team and session in every published record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTags {
    pub team: String,
    pub session: String,
}

/// Output of a state's step function.
#[derive(Debug, Default)]
pub struct StepOutput {
    /// State to change to after this frame
    pub next: Option<NavState>,

    /// Velocity demand for this frame, if any
    pub cmd: Option<VelocityCommand>,

    /// Records to publish
    pub records: Vec<PlateRecord>,
}

/// Output of the manager for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavOutput {
    /// Velocity demand, `None` leaves the last demand in place.
    pub cmd: Option<VelocityCommand>,

    pub records: Vec<PlateRecord>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur in the navigation manager.
#[derive(Debug, thiserror::Error)]
pub enum NavMgrError {
    #[error("Failed to load NavMgrParams: {0:?}")]
    ParamLoadError(util::params::LoadError),
}

#[derive(Debug)]
pub enum NavState {
    StartSeq(StartSeq),
    OuterDrive(OuterDrive),
    CrosswalkStopped(CrosswalkStopped),
    Crossing(Crossing),
    FinalizeOuter(FinalizeEvidence),
    Straighten(Straighten),
    TurnToInner(TurnToInner),
    WaitForGap(WaitForGap),
    MergeIntoInner(MergeIntoInner),
    InnerDrive(InnerDrive),
    FinalizeInner(FinalizeEvidence),
    Done(Done),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavMgr {
    /// Create a new manager, loading its parameters from the given file.
    pub fn init(
        params_path: &str,
        tags: ResultTags,
        frame_rate_hz: f64,
        session: Option<Session>,
    ) -> Result<Self, NavMgrError> {
        let params: NavMgrParams = match util::params::load(params_path) {
            Ok(p) => p,
            Err(e) => return Err(NavMgrError::ParamLoadError(e)),
        };

        Ok(Self::new(params, tags, frame_rate_hz, session))
    }

    pub fn new(
        params: NavMgrParams,
        tags: ResultTags,
        frame_rate_hz: f64,
        session: Option<Session>,
    ) -> Self {
        let persistant = NavMgrPersistantData {
            evidence: EvidenceAggregator::new(&params.evidence),
            proximity: PlateProximity::new(),
            line_aligner: LineAligner::new(params.line_aligner),
            crosswalk_visits: 0,
            start_time_s: None,
            now_s: 0.0,
            frame_rate_hz,
            tags,
            session,
        };

        let state = NavState::StartSeq(StartSeq::new(&params.start_seq));

        Self {
            params,
            persistant,
            state,
        }
    }

    /// Process a single frame captured at `now_s`.
    pub fn step(
        &mut self,
        frame: &Frame,
        now_s: f64,
        perception: &mut dyn Perception,
    ) -> NavOutput {
        if self.persistant.start_time_s.is_none() {
            self.persistant.start_time_s = Some(now_s);
        }
        self.persistant.now_s = now_s;

        let output = self
            .state
            .step(&self.params, &mut self.persistant, frame, perception);

        // Done repeats its record every frame
        for record in &output.records {
            if self.is_done() {
                debug!("Publishing result: {}", record);
            } else {
                info!("Publishing result: {}", record);
            }
        }

        if let Some(next) = output.next {
            self.state = next;
            info!("NavMgr state change to: {}", self.state);
        }

        NavOutput {
            cmd: output.cmd,
            records: output.records,
        }
    }

    pub fn state(&self) -> &NavState {
        &self.state
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, NavState::Done(_))
    }
}

impl NavMgrPersistantData {
    /// Seconds elapsed since the first frame
    pub fn elapsed_s(&self) -> f64 {
        self.now_s - self.start_time_s.unwrap_or(self.now_s)
    }

    /// Build a record carrying this run's tags
    pub fn record(&self, id: &str, plate: &str) -> PlateRecord {
        PlateRecord::new(&self.tags.team, &self.tags.session, id, plate)
    }
}

impl NavState {
    fn step(
        &mut self,
        params: &NavMgrParams,
        persistant: &mut NavMgrPersistantData,
        frame: &Frame,
        perception: &mut dyn Perception,
    ) -> StepOutput {
        match self {
            NavState::StartSeq(s) => s.step(params, persistant),
            NavState::OuterDrive(s) => s.step(params, persistant, frame, perception),
            NavState::CrosswalkStopped(s) => s.step(params, persistant, frame),
            NavState::Crossing(s) => s.step(params, persistant, frame, perception),
            NavState::FinalizeOuter(s) => s.step(params, persistant),
            NavState::Straighten(s) => s.step(params, persistant, frame),
            NavState::TurnToInner(s) => s.step(params, persistant),
            NavState::WaitForGap(s) => s.step(params, persistant, frame),
            NavState::MergeIntoInner(s) => s.step(params, persistant),
            NavState::InnerDrive(s) => s.step(params, persistant, frame, perception),
            NavState::FinalizeInner(s) => s.step(params, persistant),
            NavState::Done(s) => s.step(params, persistant),
        }
    }
}

impl Display for NavState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavState::StartSeq(_) => write!(f, "NavState::StartSeq"),
            NavState::OuterDrive(_) => write!(f, "NavState::OuterDrive"),
            NavState::CrosswalkStopped(_) => write!(f, "NavState::CrosswalkStopped"),
            NavState::Crossing(_) => write!(f, "NavState::Crossing"),
            NavState::FinalizeOuter(_) => write!(f, "NavState::FinalizeOuter"),
            NavState::Straighten(_) => write!(f, "NavState::Straighten"),
            NavState::TurnToInner(_) => write!(f, "NavState::TurnToInner"),
            NavState::WaitForGap(_) => write!(f, "NavState::WaitForGap"),
            NavState::MergeIntoInner(_) => write!(f, "NavState::MergeIntoInner"),
            NavState::InnerDrive(_) => write!(f, "NavState::InnerDrive"),
            NavState::FinalizeInner(_) => write!(f, "NavState::FinalizeInner"),
            NavState::Done(_) => write!(f, "NavState::Done"),
        }
    }
}

impl StepOutput {
    pub fn none() -> Self {
        Self::default()
    }

    /// Command the given velocity and stay in this state
    pub fn cmd(cmd: VelocityCommand) -> Self {
        Self {
            cmd: Some(cmd),
            ..Self::default()
        }
    }

    /// Stop and change to the given state
    pub fn stop_and(next: NavState) -> Self {
        Self {
            next: Some(next),
            cmd: Some(VelocityCommand::stop()),
            records: Vec::new(),
        }
    }
}
