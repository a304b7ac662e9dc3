//! # Vision module
//!
//! Deterministic image primitives used by the navigation manager (colour masks, region areas,
//! grayscale crops, frame differencing and line segment fitting), plus the [`Perception`] trait
//! through which the learned models are reached.
//!
//! Every function in this module is total over its image inputs: a frame of an unexpected size
//! gives an empty crop or no detection, never a panic.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod contour;
pub mod gray;
pub mod hsv;
pub mod segment;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::infer::SteerModel;
use image::RgbImage;
use ndarray::{Array1, Array2};

pub use contour::{component_areas, components};
pub use gray::{crop, crop_gray, mean_squared_diff, CropWindow};
pub use hsv::{in_range, HsvRange};
pub use segment::{PrincipalAxisDetector, Segment, SegmentDetector, SegmentParams};

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// A single colour camera frame.
pub type Frame = RgbImage;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A parking id read from a plate.
#[derive(Debug, Clone, PartialEq)]
pub struct IdReading {
    pub id: String,

    /// Class probabilities the id was read from
    pub probs: Array1<f64>,
}

/// A license plate read from a plate.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateReading {
    pub plate: String,

    /// One row of class probabilities per character
    pub probs: Array2<f64>,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// The learned models the navigation manager consults each frame.
///
/// Implementations must not fail: anything that prevents a result (no plate in view, a network
/// error, a malformed reply) is reported as `None`.
pub trait Perception {
    /// Probability of each steering action for this frame.
    fn steer(&mut self, frame: &Frame, model: SteerModel) -> Option<Array1<f64>>;

    /// Read the parking id of a plate in the frame.
    fn read_id(&mut self, frame: &Frame) -> Option<IdReading>;

    /// Read the license plate characters of a plate in the frame.
    fn read_plate(&mut self, frame: &Frame) -> Option<PlateReading>;
}
