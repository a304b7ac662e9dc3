//! # Drive library.
//!
//! This library holds everything the drive executable runs: the navigation manager and the
//! perception helpers it relies on, plus the network clients connecting it to the simulator, the
//! inference server and the scoring bridge.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Command server - publishes velocity demands and plate records
pub mod cmd_server;

/// Evidence aggregation - fuses single frame plate reads into a result per id
pub mod evidence;

/// Frame client - recieves camera frames from the simulator bridge
pub mod frame_client;

/// Inference client - requests steering actions and plate reads from the inference server
pub mod inference_client;

/// Line aligner - estimates the robot's offset from a painted reference line
pub mod line_aligner;

/// Motion detector - frame differencing gates for pedestrians and obstacles
pub mod motion_detector;

/// Motion policy - converts steering actions into velocity demands
pub mod motion_policy;

/// Navigation manager - the per frame state machine driving the robot
pub mod nav_mgr;

/// Drive executable parameters
pub mod params;

/// Vision primitives and the perception interface
pub mod vision;
