//! # Network Module
//!
//! Every message between the drive executable and the outside world travels over ZMQ. The drive
//! executable only ever plays three roles: it subscribes to camera frames, it makes requests of the
//! inference server, and it publishes velocity demands and plate records. A [`Link`] is a socket
//! set up for one of those roles, with a background monitor tracking whether its peer is there.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod monitor;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicBool, AtomicU8, Ordering},
    Arc,
};
use zmq::{Context, Socket, SocketType};

pub use zmq;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Network endpoints used by the drive executable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetParams {
    /// Endpoint the simulator bridge publishes camera frames on
    pub frame_endpoint: String,

    /// Endpoint of the inference server (steering classifiers and plate reader)
    pub inference_endpoint: String,

    /// Endpoint velocity demands are published on
    pub cmd_endpoint: String,

    /// Endpoint plate records are published on
    pub result_endpoint: String,
}

/// Timeouts of a link, all in milliseconds.
///
/// A negative receive timeout blocks until a message arrives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkTiming {
    pub connect_timeout_ms: i32,

    /// Interval between heartbeats, the peer is considered lost after two silent intervals. Zero
    /// disables heartbeats.
    pub heartbeat_ms: i32,

    pub recv_timeout_ms: i32,
    pub send_timeout_ms: i32,

    /// Time unsent messages are kept for once the link is dropped
    pub linger_ms: i32,
}

/// A ZMQ socket playing one role, watched by a monitor thread.
pub struct Link {
    socket: Socket,

    role: LinkRole,

    state: Arc<AtomicU8>,

    shutdown: Arc<AtomicBool>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The part a link plays in a conversation.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkRole {
    /// Receive messages from a publisher. An empty topic receives everything.
    ///
    /// If `latest_only` is set only the newest message is queued, older ones are dropped.
    Subscriber {
        topics: Vec<String>,
        latest_only: bool,
    },

    /// Make requests of a server. A request which got no reply does not block the next one.
    Requester,

    /// Bind to the endpoint and publish to whoever subscribes.
    Publisher,
}

/// Whether the peer of a link is reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LinkState {
    /// Connecting, no peer has been seen yet
    Pending = 0,

    /// Connected to the peer, or bound
    Up = 1,

    /// The peer was connected but has gone away
    Down = 2,
}

#[derive(thiserror::Error, Debug)]
pub enum LinkError {
    #[error("Error creating the socket: {0}")]
    CreateSocketError(zmq::Error),

    #[error("Error enabling monitoring for the socket: {0}")]
    MonitoringEnableError(zmq::Error),

    #[error("Could not set the {0} socket option: {1}")]
    SocketOptionError(&'static str, zmq::Error),

    #[error("Could not {verb} to {endpoint}: {err}")]
    EndpointError {
        verb: &'static str,
        endpoint: String,
        err: zmq::Error,
    },
}

/// Errors raised while moving messages over a link.
#[derive(thiserror::Error, Debug)]
pub enum MsgError {
    #[error("Could not send the message: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message: {0}")]
    RecvError(zmq::Error),

    #[error("Could not serialize the message: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the message: {0}")]
    DeserializeError(serde_json::Error),

    #[error("The message was not valid UTF-8")]
    NonUtf8Message,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Link {
    /// Open a link in the given role.
    ///
    /// Connecting links return straight away, in the [`LinkState::Pending`] state, and connect in
    /// the background. Publishers bind to the endpoint and are up as soon as they are created.
    pub fn open(
        ctx: &Context,
        role: LinkRole,
        timing: LinkTiming,
        endpoint: &str,
    ) -> Result<Self, LinkError> {
        let socket = ctx
            .socket(role.socket_type())
            .map_err(LinkError::CreateSocketError)?;

        let monitor = monitor::attach(ctx, &socket)?;

        timing.apply(&socket)?;
        role.apply(&socket)?;

        let state = Arc::new(AtomicU8::new(LinkState::Pending as u8));
        let shutdown = Arc::new(AtomicBool::new(false));

        if role.binds() {
            socket.bind(endpoint).map_err(|err| LinkError::EndpointError {
                verb: "bind",
                endpoint: endpoint.into(),
                err,
            })?;
            state.store(LinkState::Up as u8, Ordering::Relaxed);
        } else {
            socket
                .connect(endpoint)
                .map_err(|err| LinkError::EndpointError {
                    verb: "connect",
                    endpoint: endpoint.into(),
                    err,
                })?;
        }

        monitor::spawn(
            monitor,
            endpoint.to_string(),
            !role.binds(),
            state.clone(),
            shutdown.clone(),
        );

        Ok(Self {
            socket,
            role,
            state,
            shutdown,
        })
    }

    pub fn role(&self) -> &LinkRole {
        &self.role
    }

    pub fn state(&self) -> LinkState {
        LinkState::from_raw(self.state.load(Ordering::Relaxed))
    }

    pub fn is_up(&self) -> bool {
        self.state() == LinkState::Up
    }

    /// Send a text payload, preceded by a topic frame if one is given.
    pub fn send_text(&self, topic: Option<&str>, text: &str) -> Result<(), MsgError> {
        if let Some(topic) = topic {
            self.socket
                .send(topic, zmq::SNDMORE)
                .map_err(MsgError::SendError)?;
        }

        self.socket.send(text, 0).map_err(MsgError::SendError)
    }

    /// Send a value as a JSON payload, preceded by a topic frame if one is given.
    pub fn send_json<T: Serialize>(&self, topic: Option<&str>, value: &T) -> Result<(), MsgError> {
        let text = serde_json::to_string(value).map_err(MsgError::SerializationError)?;
        self.send_text(topic, &text)
    }

    /// Receive the payload of the next message, waiting at most the receive timeout.
    ///
    /// The payload is the last frame of the message, any topic frames before it are dropped.
    /// Returns `Ok(None)` if nothing arrived in time.
    pub fn recv_text(&self) -> Result<Option<String>, MsgError> {
        let mut payload = match self.socket.recv_string(0) {
            Ok(p) => p,
            Err(zmq::Error::EAGAIN) => return Ok(None),
            Err(e) => return Err(MsgError::RecvError(e)),
        };

        while self.socket.get_rcvmore().map_err(MsgError::RecvError)? {
            payload = self.socket.recv_string(0).map_err(MsgError::RecvError)?;
        }

        payload.map(Some).map_err(|_| MsgError::NonUtf8Message)
    }

    /// Receive the next message and parse its payload as JSON.
    pub fn recv_json<T: DeserializeOwned>(&self) -> Result<Option<T>, MsgError> {
        match self.recv_text()? {
            Some(text) => serde_json::from_str(&text)
                .map(Some)
                .map_err(MsgError::DeserializeError),
            None => Ok(None),
        }
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }
}

impl LinkRole {
    /// A subscriber to every topic which only keeps the newest message.
    pub fn latest() -> Self {
        LinkRole::Subscriber {
            topics: vec![String::new()],
            latest_only: true,
        }
    }

    pub fn socket_type(&self) -> SocketType {
        match self {
            LinkRole::Subscriber { .. } => zmq::SUB,
            LinkRole::Requester => zmq::REQ,
            LinkRole::Publisher => zmq::PUB,
        }
    }

    pub fn binds(&self) -> bool {
        matches!(self, LinkRole::Publisher)
    }

    fn apply(&self, socket: &Socket) -> Result<(), LinkError> {
        let opt = |name: &'static str| move |e: zmq::Error| LinkError::SocketOptionError(name, e);

        match self {
            LinkRole::Subscriber {
                topics,
                latest_only,
            } => {
                // Conflate only takes effect if set before subscribing
                socket
                    .set_conflate(*latest_only)
                    .map_err(opt("conflate"))?;
                for topic in topics {
                    socket
                        .set_subscribe(topic.as_bytes())
                        .map_err(opt("subscribe"))?;
                }
            }
            LinkRole::Requester => {
                socket.set_req_correlate(true).map_err(opt("req_correlate"))?;
                socket.set_req_relaxed(true).map_err(opt("req_relaxed"))?;
            }
            LinkRole::Publisher => (),
        }

        Ok(())
    }
}

impl LinkState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => LinkState::Up,
            2 => LinkState::Down,
            _ => LinkState::Pending,
        }
    }
}

impl LinkTiming {
    /// Timing for a link on the frame loop, which must never hold the loop up for long.
    pub fn frame_loop(recv_timeout_ms: i32) -> Self {
        Self {
            recv_timeout_ms,
            ..Self::default()
        }
    }

    fn apply(&self, socket: &Socket) -> Result<(), LinkError> {
        let opt = |name: &'static str| move |e: zmq::Error| LinkError::SocketOptionError(name, e);

        socket
            .set_connect_timeout(self.connect_timeout_ms)
            .map_err(opt("connect_timeout"))?;
        socket
            .set_heartbeat_ivl(self.heartbeat_ms)
            .map_err(opt("heartbeat_ivl"))?;
        socket
            .set_heartbeat_timeout(2 * self.heartbeat_ms)
            .map_err(opt("heartbeat_timeout"))?;
        socket
            .set_heartbeat_ttl(2 * self.heartbeat_ms)
            .map_err(opt("heartbeat_ttl"))?;
        socket
            .set_rcvtimeo(self.recv_timeout_ms)
            .map_err(opt("rcvtimeo"))?;
        socket
            .set_sndtimeo(self.send_timeout_ms)
            .map_err(opt("sndtimeo"))?;
        socket.set_linger(self.linger_ms).map_err(opt("linger"))?;

        Ok(())
    }
}

impl Default for LinkTiming {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 1000,
            heartbeat_ms: 500,
            recv_timeout_ms: -1,
            send_timeout_ms: 10,
            linger_ms: 1,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_roles() {
        assert_eq!(LinkRole::latest().socket_type(), zmq::SUB);
        assert_eq!(LinkRole::Requester.socket_type(), zmq::REQ);
        assert!(LinkRole::Publisher.binds());
        assert!(!LinkRole::latest().binds());
    }

    #[test]
    fn test_state_raw() {
        for s in [LinkState::Pending, LinkState::Up, LinkState::Down].iter() {
            assert_eq!(LinkState::from_raw(*s as u8), *s);
        }
        assert_eq!(LinkState::from_raw(7), LinkState::Pending);
    }

    #[test]
    fn test_publisher_is_up() -> Result<(), LinkError> {
        let ctx = Context::new();

        let publisher = Link::open(
            &ctx,
            LinkRole::Publisher,
            LinkTiming::default(),
            "inproc://test_publisher_is_up",
        )?;
        assert!(publisher.is_up());

        let subscriber = Link::open(
            &ctx,
            LinkRole::latest(),
            LinkTiming::frame_loop(10),
            "inproc://test_publisher_is_up",
        )?;
        assert!(matches!(subscriber.recv_text(), Ok(None)));

        Ok(())
    }
}
