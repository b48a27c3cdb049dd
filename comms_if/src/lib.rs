//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software: the message types exchanged
//! between the simulator and the controller, and the bus they travel over.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Messages published by the simulator and the controller
pub mod sim;

/// Network module
pub mod net;
