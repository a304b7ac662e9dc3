//! Session management
//!
//! A session is one run of an executable. It owns a timestamped directory under
//! `$PLATE_RUNNER_SW_ROOT/sessions` holding the log file and any JSON snapshots saved during the
//! run, and it fixes the epoch all elapsed times are measured from.
//!
//! Snapshots are written by a background thread so that saving never holds up the frame loop.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use conquer_once::OnceCell;
use log::{info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::mpsc::{channel, Receiver, Sender},
    thread,
};
use thiserror::Error;

use crate::time;

// ---------------------------------------------------------------------------
// STATICS
// ---------------------------------------------------------------------------

static SESSION_EPOCH: OnceCell<DateTime<Utc>> = OnceCell::uninit();

/// Format of the timestamp in session directory names, see `chrono::format::strftime`.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Handle to the current session. Clones share the same directory and snapshot writer.
#[derive(Clone)]
pub struct Session {
    /// The root directory for this session
    pub session_root: PathBuf,

    /// The path to the session's log file
    pub log_file_path: PathBuf,

    writer: Sender<WriterMsg>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors associated with the session module.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("The software root environment variable (PLATE_RUNNER_SW_ROOT) is not set")]
    SwRootNotSet,

    #[error("Cannot create the session directory: {0}")]
    CannotCreateDir(std::io::Error),

    #[error("A session has already been started in this process")]
    AlreadyStarted,
}

/// Reasons a snapshot could not be written.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Only .json snapshots are supported, got {0:?}")]
    NotJson(PathBuf),

    #[error("Cannot create the snapshot directory: {0}")]
    CreateDir(std::io::Error),

    #[error("Cannot create the snapshot file: {0}")]
    CreateFile(std::io::Error),

    #[error("Cannot serialize the snapshot: {0}")]
    Serialize(serde_json::Error),
}

enum WriterMsg {
    Save(PathBuf, serde_json::Value),

    /// Finish the queued snapshots then acknowledge on the sender
    Stop(Sender<()>),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Session {
    /// Start a new session within the given directory.
    ///
    /// This will create a new session directory named `{exec_name}_{timestamp}`. Only one session
    /// can be started per process.
    pub fn new(exec_name: &str, sessions_dir: &str) -> Result<Self, SessionError> {
        SESSION_EPOCH
            .try_init_once(Utc::now)
            .map_err(|_| SessionError::AlreadyStarted)?;

        let timestamp = get_epoch()
            .ok_or(SessionError::AlreadyStarted)?
            .format(TIMESTAMP_FORMAT);

        let session_root = crate::get_sw_root()
            .map_err(|_| SessionError::SwRootNotSet)?
            .join(sessions_dir)
            .join(format!("{}_{}", exec_name, timestamp));

        fs::create_dir_all(&session_root).map_err(SessionError::CannotCreateDir)?;

        let (writer, rx) = channel();
        let root = session_root.clone();
        thread::spawn(move || snapshot_writer(root, rx));

        Ok(Session {
            log_file_path: session_root.join(format!("{}.log", exec_name)),
            session_root,
            writer,
        })
    }

    /// Save a JSON snapshot of `data` to the given path, relative to the session root.
    ///
    /// The data is serialized straight away and written in the background.
    pub fn save<P: AsRef<Path>, T: serde::Serialize>(&self, path: P, data: T) {
        let path = path.as_ref();

        let value = match serde_json::to_value(&data) {
            Ok(v) => v,
            Err(e) => {
                warn!("Snapshot {:?} not saved: {}", path, SnapshotError::Serialize(e));
                return;
            }
        };

        if self
            .writer
            .send(WriterMsg::Save(path.to_path_buf(), value))
            .is_err()
        {
            warn!("Snapshot {:?} not saved, the writer has stopped", path);
        }
    }

    /// End the session, waiting until every snapshot saved so far has been written.
    pub fn exit(self) {
        info!("Writing remaining snapshots");

        let (ack_tx, ack_rx) = channel();
        if self.writer.send(WriterMsg::Stop(ack_tx)).is_ok() {
            // An error here means the writer is already gone, which is just as final
            let _ = ack_rx.recv();
        }

        info!("Session ended");
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Seconds elapsed since the session started, or zero if no session has been started.
pub fn get_elapsed_seconds() -> f64 {
    get_epoch()
        .and_then(|e| time::duration_to_seconds(Utc::now() - *e))
        .unwrap_or(0.0)
}

/// The time the session started, if one has been started.
pub fn get_epoch() -> Option<&'static DateTime<Utc>> {
    SESSION_EPOCH.get()
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn snapshot_writer(root: PathBuf, rx: Receiver<WriterMsg>) {
    // Ends when stopped or once every session handle has been dropped
    while let Ok(msg) = rx.recv() {
        match msg {
            WriterMsg::Save(path, value) => {
                if let Err(e) = write_json(&root.join(&path), &value) {
                    warn!("Snapshot {:?} not saved: {}", path, e);
                }
            }
            WriterMsg::Stop(ack) => {
                let _ = ack.send(());
                return;
            }
        }
    }
}

fn write_json(full_path: &Path, value: &serde_json::Value) -> Result<(), SnapshotError> {
    if full_path.extension().and_then(|s| s.to_str()) != Some("json") {
        return Err(SnapshotError::NotJson(full_path.to_path_buf()));
    }

    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).map_err(SnapshotError::CreateDir)?;
    }

    let file = fs::File::create(full_path).map_err(SnapshotError::CreateFile)?;

    serde_json::to_writer_pretty(file, value).map_err(SnapshotError::Serialize)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_write_json() {
        let dir = std::env::temp_dir().join(format!("plate_runner_snapshot_{}", std::process::id()));
        let value = serde_json::json!({ "1": "AB12" });

        write_json(&dir.join("evidence/results.json"), &value).unwrap();

        let text = fs::read_to_string(dir.join("evidence/results.json")).unwrap();
        assert_eq!(serde_json::from_str::<serde_json::Value>(&text).unwrap(), value);

        assert!(matches!(
            write_json(&dir.join("results.txt"), &value),
            Err(SnapshotError::NotJson(_))
        ));

        fs::remove_dir_all(&dir).unwrap();
    }
}
