//! # [`NavMgr<WaitForGap>`] state
//!
//! Waits, without commanding any motion, for the obstacle circling the inner loop to pass in front
//! of the robot. Once it has gone by the robot can merge behind it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{info, trace};

use crate::{
    motion_detector::{GatePolicy, MotionDetector},
    vision::{crop_gray, Frame},
};

use super::{
    states::MergeIntoInner, MotionWatchParams, NavMgrParams, NavMgrPersistantData, NavState,
    StepOutput,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug)]
pub struct WaitForGap {
    detector: MotionDetector,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WaitForGap {
    pub fn new(params: &MotionWatchParams, frame_rate_hz: f64) -> Self {
        Self {
            detector: MotionDetector::new(GatePolicy::ObstacleGap, &params.gate, frame_rate_hz),
        }
    }

    pub fn step(
        &mut self,
        params: &NavMgrParams,
        _persistant: &mut NavMgrPersistantData,
        frame: &Frame,
    ) -> StepOutput {
        let gap = match crop_gray(frame, &params.obstacle.window) {
            Some(crop) => self.detector.observe(crop),
            None => {
                trace!("Empty obstacle window");
                false
            }
        };

        if gap {
            info!("Obstacle has passed, merging");
            StepOutput {
                next: Some(NavState::MergeIntoInner(MergeIntoInner::new(&params.merge))),
                ..StepOutput::none()
            }
        } else {
            StepOutput::none()
        }
    }
}
