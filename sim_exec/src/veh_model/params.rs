//! Parameters structure for the vehicle model

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::VehModelError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the vehicle model.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // ---- CAPABILITIES ----
    /// Acceleration at full positive throttle.
    ///
    /// Units: meters/second^2
    pub max_accel_ms2: f64,

    /// Deceleration at full negative throttle.
    ///
    /// Units: meters/second^2
    pub max_brake_ms2: f64,

    /// Maximum forward speed.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Steering angle at full steer demand.
    ///
    /// Units: radians
    pub max_steer_angle_rad: f64,

    // ---- GEOMETRY ----
    /// Distance between the front and rear axles.
    ///
    /// Units: meters
    pub wheel_base_m: f64,

    // ---- DEGENERATE TURNING ----
    /// Below this absolute steering angle the vehicle is treated as driving straight.
    ///
    /// Units: radians
    pub min_steer_angle_rad: f64,

    /// Below this speed the vehicle is treated as not turning.
    ///
    /// Units: meters/second
    pub min_turn_speed_ms: f64,

    // ---- INITIAL STATE ----
    /// Initial position along the world X axis.
    ///
    /// Units: meters
    pub init_x_m: f64,

    /// Initial position along the world Y axis.
    ///
    /// Units: meters
    pub init_y_m: f64,

    /// Initial heading.
    ///
    /// Units: radians
    pub init_yaw_rad: f64,

    /// Initial speed.
    ///
    /// Units: meters/second
    pub init_speed_ms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check that the parameters describe a physical vehicle.
    pub fn validate(&self) -> Result<(), VehModelError> {
        let positive = [
            ("max_accel_ms2", self.max_accel_ms2),
            ("max_brake_ms2", self.max_brake_ms2),
            ("max_speed_ms", self.max_speed_ms),
            ("max_steer_angle_rad", self.max_steer_angle_rad),
            ("wheel_base_m", self.wheel_base_m),
        ];

        for &(name, value) in positive.iter() {
            if !(value > 0.0) {
                return Err(VehModelError::InvalidParam(name, value));
            }
        }

        // A steering angle of 90 degrees or more has no finite turning radius
        if self.max_steer_angle_rad >= std::f64::consts::FRAC_PI_2 {
            return Err(VehModelError::InvalidParam(
                "max_steer_angle_rad",
                self.max_steer_angle_rad,
            ));
        }

        if self.init_speed_ms < 0.0 || self.init_speed_ms > self.max_speed_ms {
            return Err(VehModelError::InvalidParam("init_speed_ms", self.init_speed_ms));
        }

        Ok(())
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            max_accel_ms2: 3.0,
            max_brake_ms2: 6.0,
            max_speed_ms: 10.0,
            max_steer_angle_rad: 30f64.to_radians(),
            wheel_base_m: 2.5,
            min_steer_angle_rad: 1e-3,
            min_turn_speed_ms: 0.01,
            init_x_m: 18.0,
            init_y_m: 0.0,
            init_yaw_rad: std::f64::consts::PI,
            init_speed_ms: 0.0,
        }
    }
}
