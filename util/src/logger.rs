//! Logging setup
//!
//! Every crate logs through the `log` macros. The executable calls [`logger_init`] once, after
//! creating its session, which sends records both to stdout and to the session's log file:
//!
//! ```text
//! [  12.345678 INF] NavMgr state change to: NavState::CrosswalkStopped
//! [  12.412000 DBG] drive_lib::nav_mgr::drive: Reading rejected: ...
//! ```
//!
//! Records carry the session elapsed time, and their target when below info.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use colored::{ColoredString, Colorize};
use log::{info, Level, Record};
use std::{fmt::Arguments, str::FromStr};
use thiserror::Error;

use crate::session::{self, Session};

pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Targets which are capped at a level whatever the minimum level asked for.
const CAPPED_TARGETS: &[(&str, LevelFilter)] = &[
    ("zmq", LevelFilter::Info),
    ("drive_lib::vision", LevelFilter::Debug),
];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// `min_level` must be at least `Info`, state changes and published results are logged at info.
/// Must only be called once per process.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    let dispatch = CAPPED_TARGETS
        .iter()
        .fold(fern::Dispatch::new().level(min_level), |d, &(target, cap)| {
            d.level_for(target, cap.min(min_level))
        });

    dispatch
        .format(|out, message, record| {
            out.finish(format_args!("{}", format_record(message, record)))
        })
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    if let Some(epoch) = session::get_epoch() {
        info!("    Session epoch: {}", epoch);
    }
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

/// Parse a level name as given on the command line (`info`, `debug`, `trace`, ...).
///
/// Matching is case-insensitive. Returns `None` for unknown names.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    LevelFilter::from_str(name).ok()
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn format_record(message: &Arguments, record: &Record) -> String {
    let elapsed = session::get_elapsed_seconds();
    let tag = level_tag(record.level());

    if record.level() > Level::Info {
        format!("[{:10.6} {}] {}: {}", elapsed, tag, record.target(), message)
    } else {
        format!("[{:10.6} {}] {}", elapsed, tag, message)
    }
}

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Trace => "TRC".dimmed().italic(),
        Level::Debug => "DBG".dimmed(),
        Level::Info => "INF".normal(),
        Level::Warn => "WRN".yellow(),
        Level::Error => "ERR".red().bold(),
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("TRACE"), Some(LevelFilter::Trace));
        assert_eq!(parse_level("info"), Some(LevelFilter::Info));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_format_record() {
        let line = format_record(
            &format_args!("Publishing result: {}", "TeamRed,multi21,1,AB12"),
            &Record::builder()
                .level(Level::Info)
                .target("drive_lib::nav_mgr")
                .args(format_args!(""))
                .build(),
        );

        assert!(line.ends_with("] Publishing result: TeamRed,multi21,1,AB12"));
        assert!(!line.contains("drive_lib::nav_mgr"));
    }
}
