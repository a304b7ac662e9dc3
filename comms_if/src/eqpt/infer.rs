//! # Inference server interface
//!
//! The inference server hosts the steering classifiers and the plate reader. Each request carries
//! one encoded frame and the server replies with a single [`InferenceRep`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::cam::CamFrame;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Which steering classifier to run.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SteerModel {
    /// Model trained on the outer loop of the track
    Outer,

    /// Model trained on the inner loop of the track
    Inner,
}

/// Requests that can be sent to the inference server
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum InferenceCmd {
    /// Run the given steering classifier over the frame
    Steer { model: SteerModel, frame: CamFrame },

    /// Read the parking id from a plate in the frame
    ReadId { frame: CamFrame },

    /// Read the license plate characters from a plate in the frame
    ReadPlate { frame: CamFrame },
}

/// Replies that can be sent by the inference server
#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum InferenceRep {
    /// Probability of each steering action
    ActionProbs(Vec<f64>),

    /// Parking id string with the class probabilities it was read from
    Id { id: String, probs: Vec<f64> },

    /// Plate string with one probability row per character
    Plate { plate: String, probs: Vec<Vec<f64>> },

    /// No plate geometry was found in the frame
    NoDetection,

    /// An error occured in the server
    Error(String),
}
