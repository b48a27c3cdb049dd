//! Pursuit controller parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;

// Internal
use super::PursuitCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the pursuit controller
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    // ---- TARGET SELECTION ----
    /// Cones further than this from the vehicle heading are not candidates.
    ///
    /// Units: radians
    pub frontal_half_angle_rad: f64,

    /// Cones closer than this are not candidates.
    ///
    /// Units: meters
    pub min_cone_dist_m: f64,

    /// A new target must be at least this much further forward than the last one to count as
    /// progress.
    ///
    /// Units: meters
    pub min_progress_m: f64,

    // ---- CONTROL LAW ----
    /// Steering proportional gain
    pub k_steer: f64,

    /// Throttle proportional gain
    pub k_speed: f64,

    /// Units: meters/second
    pub target_speed_ms: f64,

    /// Start braking when the target is closer than this.
    ///
    /// Units: meters
    pub brake_distance_m: f64,

    /// Brake demand per unit brake strength
    pub brake_gain: f64,

    /// Heading error above which the heading guard stops acceleration.
    ///
    /// Units: radians
    pub head_guard_limit_rad: f64,

    /// The heading guard only acts above this speed.
    ///
    /// Units: meters/second
    pub head_guard_min_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the parameters can be used by the controller.
    pub fn validate(&self) -> Result<(), PursuitCtrlError> {
        let positive = [
            ("frontal_half_angle_rad", self.frontal_half_angle_rad),
            ("k_steer", self.k_steer),
            ("k_speed", self.k_speed),
            ("brake_distance_m", self.brake_distance_m),
        ];

        for &(name, value) in positive.iter() {
            if !(value > 0.0) {
                return Err(PursuitCtrlError::InvalidParam(name, value));
            }
        }

        let non_negative = [
            ("min_cone_dist_m", self.min_cone_dist_m),
            ("min_progress_m", self.min_progress_m),
            ("target_speed_ms", self.target_speed_ms),
            ("brake_gain", self.brake_gain),
            ("head_guard_limit_rad", self.head_guard_limit_rad),
            ("head_guard_min_speed_ms", self.head_guard_min_speed_ms),
        ];

        for &(name, value) in non_negative.iter() {
            if !(value >= 0.0) {
                return Err(PursuitCtrlError::InvalidParam(name, value));
            }
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            frontal_half_angle_rad: 120f64.to_radians(),
            min_cone_dist_m: 0.5,
            min_progress_m: 1.0,
            k_steer: 1.2,
            k_speed: 0.6,
            target_speed_ms: 6.0,
            brake_distance_m: 2.0,
            brake_gain: 1.2,
            head_guard_limit_rad: 45f64.to_radians(),
            head_guard_min_speed_ms: 1.5,
        }
    }
}
