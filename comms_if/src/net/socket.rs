//! # Peer-tracking sockets
//!
//! A ZMQ socket paired with a background thread reading the socket's monitor events, so that the
//! owner can see how many peers are currently attached. PUB/SUB sockets never report a missing
//! peer themselves, messages simply go nowhere.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{trace, warn};
use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
    thread,
};
use zmq::{Context, Socket, SocketEvent, SocketType};

// ------------------------------------------------------------------------------------------------
// MACROS
// ------------------------------------------------------------------------------------------------

/// Apply a list of `(setter, value)` pairs to a socket, naming the failing setter in the error.
macro_rules! apply_opts {
    ($socket:expr, $(($setter:ident, $val:expr)),+ $(,)?) => {
        $(
            $socket
                .$setter($val)
                .map_err(|e| PeerSocketError::OptionError(stringify!($setter), e))?;
        )+
    };
}

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Monitor reads time out after this long so the watcher thread notices shutdown.
const WATCHER_POLL_MS: i32 = 100;

// ------------------------------------------------------------------------------------------------
// STATICS
// ------------------------------------------------------------------------------------------------

/// Source of unique inproc endpoint names for the monitors.
static NEXT_MONITOR_ID: AtomicUsize = AtomicUsize::new(0);

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A ZMQ socket which keeps count of its attached peers.
///
/// Derefs to the underlying [`zmq::Socket`] for sending and receiving.
pub struct PeerSocket {
    socket: Socket,

    num_peers: Arc<AtomicUsize>,

    stop: Arc<AtomicBool>,

    watcher: Option<thread::JoinHandle<()>>,
}

/// How to set up a [`PeerSocket`]. Times are in milliseconds, with -1 meaning forever as in
/// `zmq_setsockopt`.
#[derive(Debug, Clone)]
pub struct SocketConfig {
    /// Bind to the endpoint rather than connecting to it
    pub bind: bool,

    /// `ZMQ_LINGER`
    pub linger_ms: i32,

    /// `ZMQ_RECONNECT_IVL`
    pub reconnect_ivl_ms: i32,

    /// `ZMQ_RCVTIMEO`
    pub recv_timeout_ms: i32,

    /// `ZMQ_SNDTIMEO`
    pub send_timeout_ms: i32,

    /// `ZMQ_SNDHWM` and `ZMQ_RCVHWM`
    pub high_water_mark: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum PeerSocketError {
    #[error("Could not create the socket: {0}")]
    CreateError(zmq::Error),

    #[error("Could not attach a monitor to the socket: {0}")]
    MonitorError(zmq::Error),

    #[error("Could not set {0} on the socket: {1}")]
    OptionError(&'static str, zmq::Error),

    #[error("Could not attach the socket to {0}: {1}")]
    AttachError(String, zmq::Error),

    #[error("No endpoints were given for the socket")]
    NoEndpoints,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PeerSocket {
    /// Create the socket, then bind or connect it to `endpoint` depending on the config.
    pub fn new(
        ctx: &Context,
        socket_type: SocketType,
        config: &SocketConfig,
        endpoint: &str,
    ) -> Result<Self, PeerSocketError> {
        let socket = ctx
            .socket(socket_type)
            .map_err(PeerSocketError::CreateError)?;

        // The monitor has to be attached before any connection is made or early events are lost
        let monitor_endpoint = format!(
            "inproc://peer_monitor_{}",
            NEXT_MONITOR_ID.fetch_add(1, Ordering::Relaxed)
        );
        socket
            .monitor(
                &monitor_endpoint,
                (SocketEvent::CONNECTED as u16
                    | SocketEvent::ACCEPTED as u16
                    | SocketEvent::DISCONNECTED as u16) as i32,
            )
            .map_err(PeerSocketError::MonitorError)?;

        let monitor = ctx
            .socket(zmq::PAIR)
            .map_err(PeerSocketError::CreateError)?;
        apply_opts!(monitor, (set_rcvtimeo, WATCHER_POLL_MS));
        monitor
            .connect(&monitor_endpoint)
            .map_err(|e| PeerSocketError::AttachError(monitor_endpoint.clone(), e))?;

        config.apply(&socket)?;

        let attached = if config.bind {
            socket.bind(endpoint)
        } else {
            socket.connect(endpoint)
        };
        attached.map_err(|e| PeerSocketError::AttachError(endpoint.into(), e))?;

        let num_peers = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));

        let watcher = {
            let num_peers = num_peers.clone();
            let stop = stop.clone();
            thread::spawn(move || watch_peers(monitor, num_peers, stop))
        };

        Ok(Self {
            socket,
            num_peers,
            stop,
            watcher: Some(watcher),
        })
    }

    /// Connect to another endpoint in addition to the first one.
    pub fn add_endpoint(&self, endpoint: &str) -> Result<(), PeerSocketError> {
        self.socket
            .connect(endpoint)
            .map_err(|e| PeerSocketError::AttachError(endpoint.into(), e))
    }

    /// Number of peers currently attached.
    pub fn num_peers(&self) -> usize {
        self.num_peers.load(Ordering::Relaxed)
    }
}

impl Drop for PeerSocket {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);

        if let Some(w) = self.watcher.take() {
            w.join().ok();
        }
    }
}

impl std::ops::Deref for PeerSocket {
    type Target = Socket;

    fn deref(&self) -> &Self::Target {
        &self.socket
    }
}

impl SocketConfig {
    /// Publisher side of the bus, binds and never blocks for long on a send.
    pub fn publisher() -> Self {
        Self {
            bind: true,
            send_timeout_ms: 10,
            ..Default::default()
        }
    }

    /// Subscriber side of the bus, connects and never blocks on a receive.
    pub fn subscriber() -> Self {
        Self {
            recv_timeout_ms: 0,
            ..Default::default()
        }
    }

    fn apply(&self, socket: &Socket) -> Result<(), PeerSocketError> {
        apply_opts!(
            socket,
            (set_linger, self.linger_ms),
            (set_reconnect_ivl, self.reconnect_ivl_ms),
            (set_rcvtimeo, self.recv_timeout_ms),
            (set_sndtimeo, self.send_timeout_ms),
            (set_rcvhwm, self.high_water_mark),
            (set_sndhwm, self.high_water_mark),
        );

        Ok(())
    }
}

impl Default for SocketConfig {
    fn default() -> Self {
        // Short linger so the executables exit promptly when killed
        Self {
            bind: false,
            linger_ms: 1,
            reconnect_ivl_ms: 100,
            recv_timeout_ms: -1,
            send_timeout_ms: -1,
            high_water_mark: 1000,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Read the event ID from the next monitor message. The address frame which follows it is
/// discarded.
fn next_event(monitor: &Socket) -> Result<SocketEvent, zmq::Error> {
    let frame = monitor.recv_msg(0)?;

    let id = match (frame.get(0), frame.get(1)) {
        (Some(&lo), Some(&hi)) => u16::from_ne_bytes([lo, hi]),
        _ => return Err(zmq::Error::EINVAL),
    };

    while monitor.get_rcvmore()? {
        monitor.recv_msg(0)?;
    }

    Ok(SocketEvent::from_raw(id))
}

/// Keep `num_peers` up to date until told to stop.
fn watch_peers(monitor: Socket, num_peers: Arc<AtomicUsize>, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Relaxed) {
        match next_event(&monitor) {
            Ok(SocketEvent::CONNECTED) | Ok(SocketEvent::ACCEPTED) => {
                num_peers.fetch_add(1, Ordering::Relaxed);
            }
            Ok(SocketEvent::DISCONNECTED) => {
                // Never wrap below zero if a disconnect is seen without its connect
                let _ = num_peers.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                    Some(n.saturating_sub(1))
                });
            }
            Ok(e) => trace!("Ignoring socket event {:?}", e),
            Err(zmq::Error::EAGAIN) => (),
            Err(e) => {
                warn!("Stopped watching socket peers: {}", e);
                break;
            }
        }
    }
}
