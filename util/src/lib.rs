//! Utility library for the Plate Runner software

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod logger;
pub mod maths;
pub mod params;
pub mod session;
pub mod time;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Software root environment variable, under which the `params` and `sessions` directories live.
pub const SW_ROOT_ENV_VAR: &str = "PLATE_RUNNER_SW_ROOT";

/// Get the software root directory from the environment.
pub fn get_sw_root() -> Result<std::path::PathBuf, std::env::VarError> {
    std::env::var(SW_ROOT_ENV_VAR).map(std::path::PathBuf::from)
}
