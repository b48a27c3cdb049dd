//! Pursuit control module
//!
//! Each cycle the controller:
//!  1. Selects a target cone, alternating between the left and right of the vehicle so that it
//!     weaves through paired cones, and refusing to fall back onto cones it has already passed
//!     (see [`target_sel`]).
//!  1. Steers towards the target and throttles towards the target speed, braking when the target
//!     is close and refusing to accelerate into sharp turns (see [`ctrl_law`]).

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod ctrl_law;
mod params;
mod state;
pub mod target_sel;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;
pub use target_sel::{Candidate, ControllerMemory, Selection, SelectionSource, Side};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during PursuitCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum PursuitCtrlError {
    #[error("Invalid pursuit controller parameter {0}: {1}")]
    InvalidParam(&'static str, f64),
}
