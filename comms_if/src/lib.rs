//! # Communications interface crate.
//!
//! Provides the messages exchanged between the drive executable and the outside world (simulator
//! bridge, inference server, scoring server) and the network socket they travel over.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions for equipment (camera, drive base, inference server, result scorer)
pub mod eqpt;

/// Network module
pub mod net;
