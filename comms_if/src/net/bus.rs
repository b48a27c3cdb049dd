//! # Bus abstraction
//!
//! Latest-value publish/subscribe interface. Messages are JSON strings tagged with their topic.
//! There is no queuing guarantee beyond what the transport provides: consumers are expected to
//! overwrite their copy of a value with whatever arrived last.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{de::DeserializeOwned, Serialize};

use super::PeerSocketError;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A message bus which nodes publish to and receive from.
pub trait Bus {
    /// Start receiving messages published on `topic`.
    fn subscribe(&mut self, topic: &str) -> Result<(), BusError>;

    /// Publish an already encoded payload on `topic`.
    fn publish(&self, topic: &str, payload: &str) -> Result<(), BusError>;

    /// Receive the next pending message without blocking, or `None` if nothing has arrived.
    fn try_recv(&self) -> Result<Option<Envelope>, BusError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A message received from the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub topic: String,
    pub payload: String,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("Socket error: {0}")]
    SocketError(#[from] PeerSocketError),

    #[error("Invalid topic name {0:?}: topics are dot-separated, without '/' or whitespace")]
    InvalidTopic(String),

    #[error("Could not send the message: {0}")]
    SendError(zmq::Error),

    #[error("Could not recieve a message: {0}")]
    RecvError(zmq::Error),

    #[error("Received a message which is not valid UTF-8")]
    NonUtf8Message,

    #[error("Received a message without a topic")]
    MissingTopic,

    #[error("Could not serialize the message: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the message on {0}: {1}")]
    DeserializeError(String, serde_json::Error),

    #[error("The bus has been shut down")]
    Disconnected,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Serialize `msg` and publish it on `topic`.
pub fn publish_msg<B, T>(bus: &B, topic: &str, msg: &T) -> Result<(), BusError>
where
    B: Bus + ?Sized,
    T: Serialize,
{
    let payload = serde_json::to_string(msg).map_err(BusError::SerializationError)?;
    bus.publish(topic, &payload)
}

/// Deserialize the payload of an envelope.
pub fn decode<T>(envelope: &Envelope) -> Result<T, BusError>
where
    T: DeserializeOwned,
{
    serde_json::from_str(&envelope.payload)
        .map_err(|e| BusError::DeserializeError(envelope.topic.clone(), e))
}

/// Check that a topic name is usable on the bus.
///
/// Topics are flat dot-separated names (`simulator.state`, not `/simulator/state`). Whitespace is
/// also rejected since it separates the topic from the payload on the wire.
pub fn validate_topic(topic: &str) -> Result<(), BusError> {
    if topic.is_empty() || topic.contains('/') || topic.contains(char::is_whitespace) {
        return Err(BusError::InvalidTopic(topic.into()));
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate_topic() {
        assert!(validate_topic("simulator.state").is_ok());
        assert!(validate_topic("vehicle.controls").is_ok());
        assert!(validate_topic("/can/state").is_err());
        assert!(validate_topic("has space").is_err());
        assert!(validate_topic("").is_err());
    }
}
