//! Parameter file loading
//!
//! Parameters are TOML files kept in `$PLATE_RUNNER_SW_ROOT/params`, each deserialised into the
//! parameter struct of the module it configures.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::de::DeserializeOwned;
use std::{fs, path::PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// An error that occurs during loading of a parameter file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("The software root environment variable (PLATE_RUNNER_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot read the parameter file {0:?}: {1}")]
    FileLoadError(PathBuf, std::io::Error),

    #[error("Cannot parse the parameters: {0}")]
    DeserialiseError(toml::de::Error),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Full path of a file in the parameters directory.
pub fn params_path(file_name: &str) -> Result<PathBuf, LoadError> {
    crate::get_sw_root()
        .map(|root| root.join("params").join(file_name))
        .map_err(|_| LoadError::SwRootNotSet)
}

/// Load a parameter file, the path being relative to the parameters directory.
pub fn load<P>(file_name: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    let path = params_path(file_name)?;

    let text = fs::read_to_string(&path).map_err(|e| LoadError::FileLoadError(path, e))?;

    from_str(&text)
}

/// Parse parameters from a TOML string.
pub fn from_str<P>(params_str: &str) -> Result<P, LoadError>
where
    P: DeserializeOwned,
{
    toml::from_str(params_str).map_err(LoadError::DeserialiseError)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Phase {
        frames: u32,
        linear_ms: f64,
    }

    #[derive(Debug, Deserialize)]
    struct Manoeuvre {
        wait_frames: u32,
        phases: Vec<Phase>,
    }

    #[test]
    fn test_from_str() -> Result<(), LoadError> {
        let m: Manoeuvre = from_str(
            "wait_frames = 10\n\
             [[phases]]\nframes = 9\nlinear_ms = 0.7\n\
             [[phases]]\nframes = 6\nlinear_ms = 0.0\n",
        )?;
        assert_eq!(m.wait_frames, 10);
        assert_eq!(m.phases.len(), 2);
        assert_eq!(m.phases[0].frames, 9);
        assert_eq!(m.phases[1].linear_ms, 0.0);

        // Missing field is a deserialise error
        assert!(matches!(
            from_str::<Manoeuvre>("wait_frames = 10"),
            Err(LoadError::DeserialiseError(_))
        ));

        Ok(())
    }
}
