//! # Controller library.
//!
//! Provides the pursuit controller, which drives the vehicle through the cone layout by picking a
//! target cone each cycle and steering and throttling towards it. The controller only sees the
//! world through the latest vehicle state and cone set it received from the bus.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Controller node - connects the pursuit controller to the bus
pub mod ctrl_node;

/// Executable parameters
pub mod params;

/// Pursuit controller - target selection and control law
pub mod pursuit;
