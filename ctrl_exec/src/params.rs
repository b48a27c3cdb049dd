//! # Controller Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

use crate::pursuit;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the controller, loaded from `ctrl_exec.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct CtrlExecParams {
    /// Period of the decision cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    pub pursuit: pursuit::Params,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for CtrlExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 1.0 / 20.0,
            pursuit: pursuit::Params::default(),
        }
    }
}
