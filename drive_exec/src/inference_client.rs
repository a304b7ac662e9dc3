//! # Inference Client
//!
//! Requests steering actions and plate reads from the inference server, which hosts the learned
//! models. The client implements [`Perception`], so any failure to get an answer (a timeout, a
//! malformed reply, an error from the server) is logged and reported as no detection.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::Utc;
use comms_if::{
    eqpt::{
        cam::{CamFrame, CamImage, FrameError, ImageFormat},
        infer::{InferenceCmd, InferenceRep, SteerModel},
    },
    net::{zmq, Link, LinkError, LinkRole, LinkTiming, MsgError, NetParams},
};
use log::{trace, warn};
use ndarray::{Array1, Array2};

use crate::vision::{Frame, IdReading, Perception, PlateReading};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Format frames are sent to the server in
const FRAME_FORMAT: ImageFormat = ImageFormat::Jpeg(90);

/// Longest time to wait for the server to reply to a request.
///
/// Units: milliseconds
const REPLY_TIMEOUT_MS: i32 = 200;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct InferenceClient {
    link: Link,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum InferenceClientError {
    #[error("Link error: {0}")]
    LinkError(LinkError),

    #[error("The client is not connected to the server")]
    NotConnected,

    #[error("Could not encode the frame: {0}")]
    FrameError(FrameError),

    #[error("Message error: {0}")]
    MsgError(MsgError),

    #[error("The server did not reply in time")]
    NoReply,

    #[error("Inference server error: {0}")]
    ServerError(String),

    #[error("Unexpected reply from the server: {0}")]
    UnexpectedReply(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl InferenceClient {
    pub fn new(ctx: &zmq::Context, params: &NetParams) -> Result<Self, InferenceClientError> {
        let timing = LinkTiming {
            recv_timeout_ms: REPLY_TIMEOUT_MS,
            ..LinkTiming::default()
        };

        let link = Link::open(ctx, LinkRole::Requester, timing, &params.inference_endpoint)
            .map_err(InferenceClientError::LinkError)?;

        Ok(Self { link })
    }

    /// Make a single request of the server and wait for its reply.
    pub fn request(&mut self, cmd: &InferenceCmd) -> Result<InferenceRep, InferenceClientError> {
        if !self.link.is_up() {
            return Err(InferenceClientError::NotConnected);
        }

        self.link
            .send_json(None, cmd)
            .map_err(InferenceClientError::MsgError)?;

        match self
            .link
            .recv_json()
            .map_err(InferenceClientError::MsgError)?
        {
            Some(InferenceRep::Error(e)) => Err(InferenceClientError::ServerError(e)),
            Some(rep) => Ok(rep),
            None => Err(InferenceClientError::NoReply),
        }
    }

    fn encode(frame: &Frame) -> Result<CamFrame, InferenceClientError> {
        CamImage {
            timestamp: Utc::now(),
            image: frame.clone(),
        }
        .to_cam_frame(FRAME_FORMAT)
        .map_err(InferenceClientError::FrameError)
    }

    /// Encode the frame, make the request and hand the reply to `extract`, logging any failure.
    fn infer<T, C, E>(&mut self, frame: &Frame, make_cmd: C, extract: E) -> Option<T>
    where
        C: FnOnce(CamFrame) -> InferenceCmd,
        E: FnOnce(InferenceRep) -> Result<Option<T>, InferenceClientError>,
    {
        let result = Self::encode(frame)
            .and_then(|f| self.request(&make_cmd(f)))
            .and_then(extract);

        match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Inference request failed: {}", e);
                None
            }
        }
    }
}

impl Perception for InferenceClient {
    fn steer(&mut self, frame: &Frame, model: SteerModel) -> Option<Array1<f64>> {
        self.infer(
            frame,
            |frame| InferenceCmd::Steer { model, frame },
            |rep| match rep {
                InferenceRep::ActionProbs(p) => Ok(Some(Array1::from(p))),
                InferenceRep::NoDetection => Ok(None),
                r => Err(InferenceClientError::UnexpectedReply(format!("{:?}", r))),
            },
        )
    }

    fn read_id(&mut self, frame: &Frame) -> Option<IdReading> {
        self.infer(
            frame,
            |frame| InferenceCmd::ReadId { frame },
            |rep| match rep {
                InferenceRep::Id { id, probs } => Ok(Some(IdReading {
                    id,
                    probs: Array1::from(probs),
                })),
                InferenceRep::NoDetection => {
                    trace!("No id detected");
                    Ok(None)
                }
                r => Err(InferenceClientError::UnexpectedReply(format!("{:?}", r))),
            },
        )
    }

    fn read_plate(&mut self, frame: &Frame) -> Option<PlateReading> {
        self.infer(
            frame,
            |frame| InferenceCmd::ReadPlate { frame },
            |rep| match rep {
                InferenceRep::Plate { plate, probs } => plate_probs(probs)
                    .map(|probs| Some(PlateReading { plate, probs })),
                InferenceRep::NoDetection => {
                    trace!("No plate detected");
                    Ok(None)
                }
                r => Err(InferenceClientError::UnexpectedReply(format!("{:?}", r))),
            },
        )
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Convert per character rows into a matrix, which requires every row to be the same length.
fn plate_probs(rows: Vec<Vec<f64>>) -> Result<Array2<f64>, InferenceClientError> {
    let num_rows = rows.len();
    let num_cols = rows.first().map(Vec::len).unwrap_or(0);

    if rows.iter().any(|r| r.len() != num_cols) {
        return Err(InferenceClientError::UnexpectedReply(
            "plate probability rows differ in length".into(),
        ));
    }

    Array2::from_shape_vec((num_rows, num_cols), rows.into_iter().flatten().collect())
        .map_err(|e| InferenceClientError::UnexpectedReply(e.to_string()))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
