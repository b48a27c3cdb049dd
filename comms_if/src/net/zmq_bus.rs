//! # ZMQ bus
//!
//! Each node binds one PUB socket for its own publications and connects one SUB socket to the
//! publishers of its peers. Frames are `"<topic> <payload>"`, subscribers filter on the topic
//! prefix (including the separating space, so `a.b` does not match `a.bc`).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;

use super::{validate_topic, Bus, BusError, Envelope, PeerSocket, PeerSocketError, SocketConfig};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A [`Bus`] over ZMQ PUB/SUB sockets.
pub struct ZmqBus {
    pub_socket: PeerSocket,
    sub_socket: PeerSocket,

    /// Connection state seen by the last call to `link_change`
    link_up: bool,
}

/// A change in whether the subscriber has any peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChange {
    /// The first peer attached
    Up,

    /// The last peer detached
    Down,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ZmqBus {
    /// Create a new bus.
    ///
    /// Neither socket blocks waiting for a peer, so executables may be started in any order.
    ///
    /// ## Arguments
    /// - `ctx`: the zmq context used to create the sockets
    /// - `pub_bind`: endpoint to bind this node's publisher to, such as `"tcp://*:5020"`
    /// - `sub_endpoints`: publisher endpoints of the peers to receive from
    pub fn new(
        ctx: &zmq::Context,
        pub_bind: &str,
        sub_endpoints: &[&str],
    ) -> Result<Self, BusError> {
        let pub_socket = PeerSocket::new(ctx, zmq::PUB, &SocketConfig::publisher(), pub_bind)?;

        let (first, rest) = match sub_endpoints.split_first() {
            Some(s) => s,
            None => return Err(PeerSocketError::NoEndpoints.into()),
        };
        let sub_socket = PeerSocket::new(ctx, zmq::SUB, &SocketConfig::subscriber(), first)?;
        for endpoint in rest {
            sub_socket.add_endpoint(endpoint)?;
        }

        debug!(
            "ZmqBus publishing on {}, subscribed to {:?}",
            pub_bind, sub_endpoints
        );

        Ok(Self {
            pub_socket,
            sub_socket,
            link_up: false,
        })
    }

    /// True if the subscriber is connected to at least one peer.
    pub fn is_connected(&self) -> bool {
        self.sub_socket.num_peers() > 0
    }

    /// Report whether the link has come up or gone down since the last call. Polled once per
    /// cycle by the executables.
    pub fn link_change(&mut self) -> Option<LinkChange> {
        let change = compare_link(self.link_up, self.is_connected());
        self.link_up = self.is_connected();
        change
    }
}

impl Bus for ZmqBus {
    fn subscribe(&mut self, topic: &str) -> Result<(), BusError> {
        validate_topic(topic)?;

        self.sub_socket
            .set_subscribe(format!("{} ", topic).as_bytes())
            .map_err(BusError::RecvError)
    }

    fn publish(&self, topic: &str, payload: &str) -> Result<(), BusError> {
        validate_topic(topic)?;

        self.pub_socket
            .send(&format!("{} {}", topic, payload), 0)
            .map_err(BusError::SendError)
    }

    fn try_recv(&self) -> Result<Option<Envelope>, BusError> {
        let msg = match self.sub_socket.recv_string(zmq::DONTWAIT) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => return Err(BusError::NonUtf8Message),
            Err(zmq::Error::EAGAIN) => return Ok(None),
            Err(e) => return Err(BusError::RecvError(e)),
        };

        split_frame(&msg).map(Some)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn compare_link(was_up: bool, is_up: bool) -> Option<LinkChange> {
    match (was_up, is_up) {
        (false, true) => Some(LinkChange::Up),
        (true, false) => Some(LinkChange::Down),
        _ => None,
    }
}

/// Split a `"<topic> <payload>"` frame.
fn split_frame(frame: &str) -> Result<Envelope, BusError> {
    match frame.split_once(' ') {
        Some((topic, payload)) if !topic.is_empty() => Ok(Envelope {
            topic: topic.into(),
            payload: payload.into(),
        }),
        _ => Err(BusError::MissingTopic),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split_frame() {
        let env = split_frame(r#"simulator.state {"x": 1.0}"#).unwrap();
        assert_eq!(env.topic, "simulator.state");
        assert_eq!(env.payload, r#"{"x": 1.0}"#);

        assert!(split_frame("no_payload").is_err());
        assert!(split_frame(" {}").is_err());
    }

    #[test]
    fn test_compare_link() {
        assert_eq!(compare_link(false, true), Some(LinkChange::Up));
        assert_eq!(compare_link(true, false), Some(LinkChange::Down));
        assert_eq!(compare_link(true, true), None);
        assert_eq!(compare_link(false, false), None);
    }

    #[test]
    fn test_loopback_link() {
        use std::{
            thread::sleep,
            time::{Duration, Instant},
        };

        let ctx = zmq::Context::new();
        let a = ZmqBus::new(&ctx, "tcp://127.0.0.1:25020", &["tcp://127.0.0.1:25021"]).unwrap();
        let mut b = ZmqBus::new(&ctx, "tcp://127.0.0.1:25021", &["tcp://127.0.0.1:25020"]).unwrap();
        b.subscribe("link.test").unwrap();

        let start = Instant::now();
        let mut changes = Vec::new();
        let mut received = None;
        while start.elapsed() < Duration::from_secs(5) && (changes.is_empty() || received.is_none())
        {
            if let Some(c) = b.link_change() {
                changes.push(c);
            }

            // PUB drops messages until the subscription has propagated, so keep sending
            a.publish("link.test", "{}").unwrap();
            if let Some(env) = b.try_recv().unwrap() {
                received = Some(env);
            }

            sleep(Duration::from_millis(10));
        }

        assert_eq!(changes.first(), Some(&LinkChange::Up));
        assert!(b.is_connected());
        assert_eq!(received.unwrap().topic, "link.test");

        // The link drops when the peer goes away
        drop(a);
        let start = Instant::now();
        let mut down = false;
        while start.elapsed() < Duration::from_secs(5) && !down {
            down = b.link_change() == Some(LinkChange::Down);
            sleep(Duration::from_millis(10));
        }
        assert!(down);
    }
}
