//! # Motion detector
//!
//! A frame differencing motion gate. Each observation is a grayscale crop of the current frame,
//! which is compared to the previous crop by mean squared difference. After a settling period the
//! sequence of readings is judged by a [`GatePolicy`]:
//!
//! - `PedestrianCrossing` opens once the scene has been still, then moving (someone crossing), and
//!   then still again.
//! - `ObstacleGap` opens on the first still reading after the obstacle has been seen moving past.
//!
//! Readings which are not strictly beyond either threshold change nothing.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use image::GrayImage;
use log::{debug, trace};
use serde::Deserialize;

use crate::vision::mean_squared_diff;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MotionGateParams {
    /// Time after the detector is created during which readings are ignored, letting the robot
    /// come to rest.
    ///
    /// Units: seconds
    pub settle_time_s: f64,

    /// Readings strictly below this value are still
    pub low_threshold: f64,

    /// Readings strictly above this value are moving
    pub high_threshold: f64,
}

#[derive(Debug)]
pub struct MotionDetector {
    policy: GatePolicy,

    settle_frames: u32,
    low_threshold: f64,
    high_threshold: f64,

    previous: Option<GrayImage>,
    settle_counter: u32,
    saw_low: bool,
    saw_high: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePolicy {
    PedestrianCrossing,
    ObstacleGap,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MotionDetector {
    pub fn new(policy: GatePolicy, params: &MotionGateParams, frame_rate_hz: f64) -> Self {
        Self::with_settle_frames(
            policy,
            util::time::seconds_to_frames(params.settle_time_s, frame_rate_hz),
            params.low_threshold,
            params.high_threshold,
        )
    }

    pub fn with_settle_frames(
        policy: GatePolicy,
        settle_frames: u32,
        low_threshold: f64,
        high_threshold: f64,
    ) -> Self {
        Self {
            policy,
            settle_frames,
            low_threshold,
            high_threshold,
            previous: None,
            settle_counter: 0,
            saw_low: false,
            saw_high: false,
        }
    }

    /// Observe a new crop, returning true when the gate opens.
    ///
    /// A crop of a different size to the previous one restarts the comparison from this crop.
    pub fn observe(&mut self, crop: GrayImage) -> bool {
        let previous = match self.previous.replace(crop) {
            Some(p) => p,
            None => return false,
        };

        let diff = match self
            .previous
            .as_ref()
            .and_then(|current| mean_squared_diff(&previous, current))
        {
            Some(d) => d,
            None => {
                debug!("{:?} detector: crop size changed, comparison restarted", self.policy);
                return false;
            }
        };

        if self.settle_counter < self.settle_frames {
            self.settle_counter += 1;
            return false;
        }

        trace!("{:?} detector reading: {:.2}", self.policy, diff);

        let is_low = diff < self.low_threshold;
        let is_high = diff > self.high_threshold;

        match self.policy {
            GatePolicy::PedestrianCrossing => {
                if is_low {
                    if self.saw_low && self.saw_high {
                        self.reset();
                        return true;
                    }
                    self.saw_low = true;
                } else if is_high && !self.saw_high {
                    debug!("Pedestrian crossing detected");
                    self.saw_high = true;
                }
                false
            }
            GatePolicy::ObstacleGap => {
                if is_high && !self.saw_high {
                    debug!("Obstacle passing detected");
                    self.saw_high = true;
                    false
                } else if is_low && self.saw_high {
                    self.reset();
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Forget all history, including the settling period.
    pub fn reset(&mut self) {
        self.previous = None;
        self.settle_counter = 0;
        self.saw_low = false;
        self.saw_high = false;
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use image::Luma;

    /// Build a sequence of crops whose consecutive differences have the given mean squares.
    fn crops_with_diffs(diffs: &[f64]) -> Vec<GrayImage> {
        let mut level = 0.0;
        let mut crops = vec![GrayImage::from_pixel(8, 8, Luma([0]))];
        for d in diffs {
            // Alternate direction to stay within the u8 range
            level = if level > 100.0 { level - d.sqrt() } else { level + d.sqrt() };
            crops.push(GrayImage::from_pixel(8, 8, Luma([level.round() as u8])));
        }
        crops
    }

    fn run(det: &mut MotionDetector, crops: Vec<GrayImage>) -> Vec<bool> {
        crops.into_iter().map(|c| det.observe(c)).collect()
    }

    #[test]
    fn test_pedestrian_sequence() {
        let mut det =
            MotionDetector::with_settle_frames(GatePolicy::PedestrianCrossing, 3, 9.0, 40.0);

        // First crop, three settle frames, then low, high, low
        let out = run(&mut det, crops_with_diffs(&[0.0, 0.0, 0.0, 0.0, 64.0, 0.0]));
        assert_eq!(out, vec![false, false, false, false, false, false, true]);
    }

    #[test]
    fn test_pedestrian_needs_movement() {
        let mut det =
            MotionDetector::with_settle_frames(GatePolicy::PedestrianCrossing, 0, 9.0, 40.0);

        // Still and in-between readings alone never open the gate
        let out = run(&mut det, crops_with_diffs(&[0.0, 25.0, 0.0, 0.0, 16.0]));
        assert_eq!(out, vec![false; 6]);

        let out = run(&mut det, crops_with_diffs(&[64.0, 25.0, 0.0]));
        assert_eq!(out, vec![false, false, false, true]);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let pedestrian =
            || MotionDetector::with_settle_frames(GatePolicy::PedestrianCrossing, 0, 9.0, 49.0);
        let obstacle = || MotionDetector::with_settle_frames(GatePolicy::ObstacleGap, 0, 16.0, 64.0);

        // Readings exactly on a threshold are in-between
        let out = run(&mut pedestrian(), crops_with_diffs(&[9.0, 49.0, 9.0]));
        assert_eq!(out, vec![false; 4]);

        let out = run(&mut pedestrian(), crops_with_diffs(&[4.0, 64.0, 4.0]));
        assert_eq!(out, vec![false, false, false, true]);

        let out = run(&mut obstacle(), crops_with_diffs(&[64.0, 16.0, 81.0, 16.0]));
        assert_eq!(out, vec![false; 5]);

        let out = run(&mut obstacle(), crops_with_diffs(&[81.0, 9.0]));
        assert_eq!(out, vec![false, false, true]);
    }

    #[test]
    fn test_obstacle_sequence() {
        let mut det = MotionDetector::with_settle_frames(GatePolicy::ObstacleGap, 2, 15.0, 70.0);

        let out = run(&mut det, crops_with_diffs(&[0.0, 0.0, 81.0, 0.0]));
        assert_eq!(out, vec![false, false, false, false, true]);
    }

    #[test]
    fn test_obstacle_never_seen() {
        let mut det = MotionDetector::with_settle_frames(GatePolicy::ObstacleGap, 2, 15.0, 70.0);

        let out = run(&mut det, crops_with_diffs(&[0.0; 20]));
        assert!(out.iter().all(|o| !o));

        let out = run(&mut det, crops_with_diffs(&[36.0, 0.0, 36.0, 0.0]));
        assert!(out.iter().all(|o| !o));
    }

    #[test]
    fn test_settle_frames_from_time() {
        let params = MotionGateParams {
            settle_time_s: 1.0,
            low_threshold: 9.0,
            high_threshold: 40.0,
        };
        let det = MotionDetector::new(GatePolicy::PedestrianCrossing, &params, 20.0);
        assert_eq!(det.settle_frames, 20);
    }
}
