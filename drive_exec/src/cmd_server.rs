//! # Command Server
//!
//! Publishes velocity demands to the drive base and plate records to the scoring bridge.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::{drive::VelocityCommand, plate::PlateRecord},
    net::{zmq, Link, LinkError, LinkRole, LinkTiming, MsgError, NetParams},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Topic velocity demands are published under
pub const CMD_TOPIC: &str = "cmd_vel";

/// Topic plate records are published under
pub const RESULT_TOPIC: &str = "license_plate";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct CmdServer {
    cmd_link: Link,
    result_link: Link,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CmdServerError {
    #[error("Link error: {0}")]
    LinkError(LinkError),

    #[error("Could not send the velocity demand: {0}")]
    CmdSendError(MsgError),

    #[error("Could not send the plate record: {0}")]
    ResultSendError(MsgError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CmdServer {
    /// Create a new instance of the command server.
    ///
    /// This function will not block until subscribers connect.
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, CmdServerError> {
        let publish = |endpoint: &str| {
            Link::open(ctx, LinkRole::Publisher, LinkTiming::default(), endpoint)
                .map_err(CmdServerError::LinkError)
        };

        let cmd_link = publish(&params.cmd_endpoint)?;
        let result_link = publish(&params.result_endpoint)?;

        Ok(Self {
            cmd_link,
            result_link,
        })
    }

    pub fn send_cmd(&mut self, cmd: &VelocityCommand) -> Result<(), CmdServerError> {
        self.cmd_link
            .send_json(Some(CMD_TOPIC), cmd)
            .map_err(CmdServerError::CmdSendError)
    }

    /// Publish a record as its `team,session,id,plate` line.
    pub fn send_record(&mut self, record: &PlateRecord) -> Result<(), CmdServerError> {
        self.result_link
            .send_text(Some(RESULT_TOPIC), &record.to_string())
            .map_err(CmdServerError::ResultSendError)
    }
}
