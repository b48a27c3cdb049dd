//! # Simulation Messages
//!
//! Value types exchanged over the bus. The JSON field names are part of the wire format and must
//! not be renamed.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Ground-truth state of the vehicle, published by the simulator every cycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct VehicleState {
    /// Position along the world X axis
    ///
    /// Units: meters
    pub x: f64,

    /// Position along the world Y axis
    ///
    /// Units: meters
    pub y: f64,

    /// Heading measured from the world X axis. Not wrapped, so it grows continuously as the
    /// vehicle keeps turning.
    ///
    /// Units: radians
    pub yaw: f64,

    /// Forward speed, never negative.
    ///
    /// Units: meters/second
    pub speed: f64,

    /// Wall clock time at which the state was computed.
    ///
    /// Units: seconds since the UNIX epoch
    pub timestamp: f64,
}

/// A single track cone.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Cone {
    pub x: f64,
    pub y: f64,
}

/// The full cone layout of the track.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ConeSet {
    pub cones: Vec<Cone>,
}

/// Actuation demands sent from the controller to the vehicle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct VehControls {
    /// Normalised throttle, positive accelerates and negative brakes. The producer does not clamp
    /// this value, consumers must clamp it to [-1, 1].
    #[serde(default)]
    pub throttle: f64,

    /// Normalised steering, positive turns left. Nominally in [-1, 1].
    #[serde(default)]
    pub steer: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Cone {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl ConeSet {
    pub fn is_empty(&self) -> bool {
        self.cones.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cones.len()
    }
}

impl From<Vec<Cone>> for ConeSet {
    fn from(cones: Vec<Cone>) -> Self {
        Self { cones }
    }
}
