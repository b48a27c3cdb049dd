//! Vehicle model module
//!
//! Integrates the vehicle state with a kinematic bicycle model. The model holds no state besides
//! the vehicle state itself, so stepping it is a pure function of the state, the demands, and the
//! timestep (see [`step`]).

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during vehicle model operation.
#[derive(Debug, thiserror::Error)]
pub enum VehModelError {
    #[error("Invalid vehicle model parameter {0}: {1}")]
    InvalidParam(&'static str, f64),

    #[error("The vehicle model has not been initialised")]
    NotInitialised,
}
