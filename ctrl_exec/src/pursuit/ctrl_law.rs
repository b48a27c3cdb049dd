//! # Control law
//!
//! Turns the chosen target into control demands. Steering is proportional to the heading error
//! to the target. Throttle is proportional to the speed error, and is pulled down by two
//! overrides: braking when the target is close, and the heading guard which stops the vehicle
//! accelerating into a turn it can't make.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{Candidate, Params};
use comms_if::sim::{VehControls, VehicleState};
use util::maths::{angle_diff, clamp};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Demands calculated by the control law, along with the state of the overrides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Demands {
    pub controls: VehControls,

    /// Heading error to the target, `None` if there was no target.
    ///
    /// Units: radians
    pub head_error_rad: Option<f64>,

    /// The target was within the braking distance
    pub braking: bool,

    /// The heading guard was active
    pub head_guard: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the demands to drive towards the target.
///
/// The throttle is not clamped, consumers are expected to saturate it.
pub fn calc_demands(
    state: &VehicleState,
    target: Option<&Candidate>,
    params: &Params,
) -> Demands {
    let mut demands = Demands::default();

    let mut throttle = params.k_speed * (params.target_speed_ms - state.speed);

    let target = match target {
        Some(t) => t,
        None => {
            demands.controls.throttle = throttle;
            return demands;
        }
    };

    let head_error_rad = angle_diff(
        (target.cone.y - state.y).atan2(target.cone.x - state.x),
        state.yaw,
    );
    demands.head_error_rad = Some(head_error_rad);
    demands.controls.steer = clamp(params.k_steer * head_error_rad, -1.0, 1.0);

    // Braking only ever pulls the throttle down
    if target.dist_m < params.brake_distance_m {
        let strength = (params.brake_distance_m - target.dist_m) / params.brake_distance_m;
        throttle = throttle.min(-(strength * params.brake_gain).min(1.0));
        demands.braking = true;
    }

    if head_error_rad.abs() > params.head_guard_limit_rad
        && state.speed > params.head_guard_min_speed_ms
    {
        throttle = throttle.min(0.0);
        demands.head_guard = true;
    }

    demands.controls.throttle = throttle;

    demands
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::sim::Cone;

    fn state(speed: f64) -> VehicleState {
        VehicleState {
            x: 0.0,
            y: 0.0,
            yaw: 0.0,
            speed,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_no_target() {
        let d = calc_demands(&state(2.0), None, &Params::default());

        assert_eq!(d.controls.steer, 0.0);
        assert!((d.controls.throttle - 0.6 * 4.0).abs() < 1e-12);
        assert!(d.head_error_rad.is_none());
        assert!(!d.braking && !d.head_guard);
    }

    #[test]
    fn test_throttle_not_clamped() {
        let s = state(0.0);
        let target = Candidate::new(&s, &Cone::new(30.0, 0.0));

        let d = calc_demands(&s, Some(&target), &Params::default());

        assert!((d.controls.throttle - 3.6).abs() < 1e-12);
        assert_eq!(d.controls.steer, 0.0);

        // Over speed gives a negative demand
        let s = state(9.0);
        let d = calc_demands(&s, Some(&target), &Params::default());
        assert!((d.controls.throttle + 1.8).abs() < 1e-12);
    }

    #[test]
    fn test_steer() {
        let s = state(0.0);
        let params = Params::default();

        // Small error, proportional
        let target = Candidate::new(&s, &Cone::new(10.0, 1.0));
        let d = calc_demands(&s, Some(&target), &params);
        let expected = 1.2 * 1f64.atan2(10.0);
        assert!((d.controls.steer - expected).abs() < 1e-12);
        assert!(d.controls.steer > 0.0);

        // Large error to the right, saturated
        let target = Candidate::new(&s, &Cone::new(1.0, -10.0));
        let d = calc_demands(&s, Some(&target), &params);
        assert_eq!(d.controls.steer, -1.0);
    }

    #[test]
    fn test_braking() {
        let s = state(5.0);
        let target = Candidate::new(&s, &Cone::new(1.0, 0.0));

        let d = calc_demands(&s, Some(&target), &Params::default());

        assert!(d.braking);
        assert!(d.controls.throttle <= -0.6);
        assert!((d.controls.throttle + 0.6).abs() < 1e-12);

        // Full brake when right on top of the cone
        let target = Candidate::new(&s, &Cone::new(0.1, 0.0));
        let d = calc_demands(&s, Some(&target), &Params::default());
        assert!((d.controls.throttle + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_braking_never_raises_throttle() {
        // Well over speed, the baseline is already below the brake demand
        let s = state(10.0);
        let target = Candidate::new(&s, &Cone::new(1.9, 0.0));

        let d = calc_demands(&s, Some(&target), &Params::default());

        assert!(d.braking);
        assert!((d.controls.throttle + 2.4).abs() < 1e-12);
    }

    #[test]
    fn test_head_guard() {
        let params = Params::default();
        let target_pos = Cone::new(5.0, 6.0);

        // Fast and turning sharply, no acceleration
        let s = state(3.0);
        let d = calc_demands(&s, Some(&Candidate::new(&s, &target_pos)), &params);
        assert!(d.head_guard);
        assert!(!d.braking);
        assert_eq!(d.controls.throttle, 0.0);
        assert_eq!(d.controls.steer, 1.0);

        // Slow enough to accelerate through the turn
        let s = state(1.0);
        let d = calc_demands(&s, Some(&Candidate::new(&s, &target_pos)), &params);
        assert!(!d.head_guard);
        assert!((d.controls.throttle - 3.0).abs() < 1e-12);
    }
}
