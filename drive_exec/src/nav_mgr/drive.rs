//! Helpers shared by the classifier driven states

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{drive::VelocityCommand, infer::SteerModel};
use log::{debug, trace};

use crate::{
    evidence::TrackLoop,
    motion_policy::{self, DriveAction, MotionPolicyParams},
    vision::{component_areas, crop, in_range, Frame, Perception},
};

use super::{CrosswalkParams, NavMgrPersistantData, ProximityParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Tracks whether the robot is in the slow zone around a plate.
///
/// The zone is entered whenever a car is near and held for a number of frames after it leaves
/// view. The hold counter starts at zero so the first frames of a run are slow.
#[derive(Debug, Default)]
pub struct PlateProximity {
    frames_since_near: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PlateProximity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update with this frame's reading, returning true if the robot is in the slow zone.
    pub fn update(&mut self, is_near: bool, hold_frames: u32) -> bool {
        if is_near {
            self.frames_since_near = 0;
        } else {
            self.frames_since_near = self.frames_since_near.saturating_add(1);
        }

        self.frames_since_near <= hold_frames
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Returns true if a car is near enough for its plate to be read.
pub fn car_is_near(params: &ProximityParams, frame: &Frame) -> bool {
    let window = match crop(frame, &params.window) {
        Some(w) => w,
        None => return false,
    };

    match component_areas(&in_range(&window, &params.colour)).first() {
        Some(&area) => area > params.min_area_px && area < params.max_area_px,
        None => false,
    }
}

/// Returns true if the crosswalk line is close ahead.
pub fn crosswalk_ahead(params: &CrosswalkParams, frame: &Frame) -> bool {
    match component_areas(&in_range(frame, &params.colour)).first() {
        Some(&area) => area > params.min_area_px,
        None => false,
    }
}

/// Update the slow zone from this frame.
pub fn update_slow_zone(
    params: &ProximityParams,
    persistant: &mut NavMgrPersistantData,
    frame: &Frame,
) -> bool {
    let is_near = car_is_near(params, frame);
    persistant.proximity.update(is_near, params.hold_frames)
}

/// Attempt to read a plate from the frame and record it as evidence for the given loop.
///
/// The id is read first, and the plate only if an id was found.
pub fn acquire(
    persistant: &mut NavMgrPersistantData,
    frame: &Frame,
    perception: &mut dyn Perception,
    track_loop: TrackLoop,
) {
    let id = match perception.read_id(frame) {
        Some(id) => id,
        None => {
            trace!("No id read");
            return;
        }
    };

    let plate = match perception.read_plate(frame) {
        Some(p) => p,
        None => {
            trace!("Id {} read but no plate", id.id);
            return;
        }
    };

    if let Err(e) =
        persistant
            .evidence
            .record(track_loop, &id.id, &id.probs, &plate.plate, &plate.probs)
    {
        debug!("Reading rejected: {}", e);
    }
}

/// Get the velocity demand of the steering classifier for this frame, if it gave a usable output.
pub fn steer(
    params: &MotionPolicyParams,
    frame: &Frame,
    perception: &mut dyn Perception,
    model: SteerModel,
    is_slow_zone: bool,
) -> Option<VelocityCommand> {
    let action = match perception.steer(frame, model).as_ref().and_then(DriveAction::from_probs) {
        Some(a) => a,
        None => {
            trace!("No steering action for this frame");
            return None;
        }
    };

    Some(motion_policy::decide(
        params,
        action,
        is_slow_zone,
        model == SteerModel::Inner,
    ))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_proximity_hold() {
        let mut p = PlateProximity::new();

        // Slow at the start of the run
        assert!(p.update(false, 2));
        assert!(p.update(false, 2));
        assert!(!p.update(false, 2));

        assert!(p.update(true, 2));
        assert!(p.update(false, 2));
        assert!(p.update(false, 2));
        assert!(!p.update(false, 2));
    }

    #[test]
    fn test_car_is_near() {
        let params = ProximityParams::default();

        let mut frame = Frame::from_pixel(400, 400, Rgb([128, 128, 128]));
        assert!(!car_is_near(&params, &frame));

        // 100 x 100 car in the lower part of the frame
        for y in 250..350 {
            for x in 100..200 {
                frame.put_pixel(x, y, Rgb([20, 20, 200]));
            }
        }
        assert!(car_is_near(&params, &frame));

        // Too far away
        let small = ProximityParams {
            min_area_px: 20000,
            ..params
        };
        assert!(!car_is_near(&small, &frame));
    }

    #[test]
    fn test_crosswalk_ahead() {
        let params = CrosswalkParams::default();

        let mut frame = Frame::from_pixel(400, 100, Rgb([128, 128, 128]));
        for y in 40..50 {
            for x in 0..300 {
                frame.put_pixel(x, y, Rgb([220, 20, 20]));
            }
        }
        assert!(!crosswalk_ahead(&params, &frame));

        for y in 50..60 {
            for x in 0..300 {
                frame.put_pixel(x, y, Rgb([220, 20, 20]));
            }
        }
        assert!(crosswalk_ahead(&params, &frame));
    }
}
