//! # Network Module
//!
//! This module provides the bus the executables communicate over. The [`Bus`] trait is the only
//! thing the simulator and controller depend on. Two implementations are provided:
//!
//! - [`ZmqBus`] which uses ZMQ PUB/SUB sockets, for running each executable in its own process.
//! - [`LocalBus`] which passes messages inside a single process, used in tests.
//!
//! Topics are flat dot-separated names, such as `simulator.state`.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod bus;
mod local;
mod socket;
mod zmq_bus;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use bus::*;
pub use local::LocalBus;
pub use socket::{PeerSocket, PeerSocketError, SocketConfig};
pub use zmq_bus::{LinkChange, ZmqBus};

// Export zmq
pub use zmq;

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Names of the topics used by the executables.
pub mod topic {
    /// Control demands from the controller to the simulator.
    pub const VEHICLE_CONTROLS: &str = "vehicle.controls";

    /// Vehicle state published by the simulator.
    pub const SIMULATOR_STATE: &str = "simulator.state";

    /// Cone layout published by the simulator.
    pub const SIMULATOR_CONES: &str = "simulator.cones";
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Network parameters, loaded from `net.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct NetParams {
    /// Endpoint the simulator binds its publisher to
    pub sim_pub_bind: String,

    /// Endpoint other executables connect to in order to receive simulator messages
    pub sim_pub_endpoint: String,

    /// Endpoint the controller binds its publisher to
    pub ctrl_pub_bind: String,

    /// Endpoint other executables connect to in order to receive controller messages
    pub ctrl_pub_endpoint: String,
}

impl Default for NetParams {
    fn default() -> Self {
        Self {
            sim_pub_bind: "tcp://*:5020".into(),
            sim_pub_endpoint: "tcp://localhost:5020".into(),
            ctrl_pub_bind: "tcp://*:5021".into(),
            ctrl_pub_endpoint: "tcp://localhost:5021".into(),
        }
    }
}
