//! # Simulator library.
//!
//! Provides the vehicle simulator: a kinematic bicycle model driven by the latest control demands,
//! and the static cone layout of the track. Other crates in the workspace (notably the closed
//! loop tests of the controller) use the simulator through this library.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Cone layout - generates the static set of cones on the track
pub mod cone_layout;

/// Executable parameters
pub mod params;

/// Simulator node - connects the vehicle model to the bus
pub mod sim_node;

/// Vehicle model - kinematic bicycle model integrating the vehicle state
pub mod veh_model;
