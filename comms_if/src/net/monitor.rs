//! Connection monitoring for links.
//!
//! ZMQ reports socket events on an inproc `PAIR` socket. A thread per link reads those events and
//! keeps the link's [`LinkState`] current.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, warn};
use std::{
    sync::{
        atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};
use zmq::{Context, Socket, SocketEvent};

use super::{LinkError, LinkState};

// ------------------------------------------------------------------------------------------------
// STATICS
// ------------------------------------------------------------------------------------------------

/// Number of monitors created, used to give each monitor a unique endpoint.
static NUM_MONITORS: AtomicUsize = AtomicUsize::new(0);

/// Time the monitor waits for an event before checking for shutdown.
const POLL_TIMEOUT: Duration = Duration::from_millis(100);

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Enable monitoring of `socket`, returning the socket the events arrive on.
pub(super) fn attach(ctx: &Context, socket: &Socket) -> Result<Socket, LinkError> {
    let endpoint = format!(
        "inproc://link_monitor_{}",
        NUM_MONITORS.fetch_add(1, Ordering::Relaxed)
    );

    socket
        .monitor(&endpoint, SocketEvent::ALL as i32)
        .map_err(LinkError::MonitoringEnableError)?;

    let monitor = ctx.socket(zmq::PAIR).map_err(LinkError::CreateSocketError)?;
    monitor
        .set_rcvtimeo(POLL_TIMEOUT.as_millis() as i32)
        .map_err(|e| LinkError::SocketOptionError("rcvtimeo", e))?;
    monitor
        .connect(&endpoint)
        .map_err(|err| LinkError::EndpointError {
            verb: "connect",
            endpoint,
            err,
        })?;

    Ok(monitor)
}

/// Start the thread watching a link's events until `shutdown` is set.
///
/// Only connecting links track their peer, a bound link stays up.
pub(super) fn spawn(
    monitor: Socket,
    endpoint: String,
    tracks_peer: bool,
    state: Arc<AtomicU8>,
    shutdown: Arc<AtomicBool>,
) {
    thread::spawn(move || {
        while !shutdown.load(Ordering::Relaxed) {
            let event = match read_event(&monitor) {
                Ok(Some(e)) => e,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Monitor of {} stopped: {}", endpoint, e);
                    return;
                }
            };

            if !tracks_peer {
                continue;
            }

            let new_state = match event {
                SocketEvent::CONNECTED => LinkState::Up,
                SocketEvent::DISCONNECTED => LinkState::Down,
                _ => continue,
            };

            debug!("Link to {} is now {:?}", endpoint, new_state);
            state.store(new_state as u8, Ordering::Relaxed);
        }
    });
}

/// Read one event, or `None` if no event arrived before the poll timeout.
fn read_event(monitor: &Socket) -> Result<Option<SocketEvent>, zmq::Error> {
    let msg = match monitor.recv_msg(0) {
        Ok(m) => m,
        Err(zmq::Error::EAGAIN) => return Ok(None),
        Err(e) => return Err(e),
    };

    // The second frame carries the peer address, which isn't needed
    if monitor.get_rcvmore()? {
        monitor.recv_msg(0)?;
    }

    if msg.len() < 2 {
        return Ok(None);
    }

    Ok(Some(SocketEvent::from_raw(u16::from_ne_bytes([
        msg[0], msg[1],
    ]))))
}
