//! # Simulator Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::{cone_layout, veh_model};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the simulator, loaded from `sim_exec.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SimExecParams {
    /// Period of the physics cycle, which is also the integration timestep.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Period at which the cone layout is republished.
    ///
    /// Units: seconds
    pub cones_period_s: f64,

    pub veh_model: veh_model::Params,

    pub cone_layout: cone_layout::Params,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 1.0 / 20.0,
            cones_period_s: 1.0,
            veh_model: veh_model::Params::default(),
            cone_layout: cone_layout::Params::default(),
        }
    }
}
