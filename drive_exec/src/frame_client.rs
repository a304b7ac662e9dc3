//! # Frame Client
//!
//! Receives the camera frames published by the simulator bridge. Only the latest frame is kept so
//! that a slow frame loop always works on the newest image.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::cam::{CamFrame, CamImage, FrameError},
    net::{zmq, Link, LinkError, LinkRole, LinkTiming, MsgError, NetParams},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Longest time to wait for a frame.
///
/// Units: milliseconds
const RECV_TIMEOUT_MS: i32 = 10;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct FrameClient {
    link: Link,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FrameClientError {
    #[error("Link error: {0}")]
    LinkError(LinkError),

    #[error("Could not recieve a frame: {0}")]
    MsgError(MsgError),

    #[error("Could not decode the frame: {0}")]
    FrameError(FrameError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FrameClient {
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, FrameClientError> {
        // Wait briefly for each frame so the frame loop doesn't spin when the simulator is idle
        let link = Link::open(
            ctx,
            LinkRole::latest(),
            LinkTiming::frame_loop(RECV_TIMEOUT_MS),
            &params.frame_endpoint,
        )
        .map_err(FrameClientError::LinkError)?;

        Ok(Self { link })
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_up()
    }

    /// Get the latest frame, or `Ok(None)` if no new frame has arrived.
    pub fn recv_frame(&mut self) -> Result<Option<CamImage>, FrameClientError> {
        let frame: CamFrame = match self
            .link
            .recv_json()
            .map_err(FrameClientError::MsgError)?
        {
            Some(f) => f,
            None => return Ok(None),
        };

        frame
            .to_cam_image()
            .map(Some)
            .map_err(FrameClientError::FrameError)
    }
}
