//! # Cone layout
//!
//! The track is a closed oval of cones, evenly spaced in angle around an ellipse centred on the
//! world origin. The layout is generated once and never changes during a run.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;
use std::f64::consts::TAU;

use comms_if::sim::{Cone, ConeSet};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters describing the oval track.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Semi-axis of the ellipse along the world X axis
    ///
    /// Units: meters
    pub semi_axis_x_m: f64,

    /// Semi-axis of the ellipse along the world Y axis
    ///
    /// Units: meters
    pub semi_axis_y_m: f64,

    /// Number of cones around the ellipse
    pub num_cones: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            semi_axis_x_m: 20.0,
            semi_axis_y_m: 8.0,
            num_cones: 20,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Generate the cone set for the given layout. The first cone sits on the positive X axis and the
/// rest follow anticlockwise.
pub fn generate(params: &Params) -> ConeSet {
    (0..params.num_cones)
        .map(|i| {
            let a = i as f64 / params.num_cones as f64 * TAU;
            Cone::new(params.semi_axis_x_m * a.cos(), params.semi_axis_y_m * a.sin())
        })
        .collect::<Vec<_>>()
        .into()
}
