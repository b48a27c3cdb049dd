//! Implementations for the vehicle model state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::Serialize;

// Internal
use super::{Params, VehModelError};
use comms_if::sim::{VehControls, VehicleState};
use util::{maths::clamp, module::State};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Vehicle model module state
#[derive(Default)]
pub struct VehSim {
    pub(crate) params: Params,

    /// Timestep used for every call to `proc`.
    ///
    /// Units: seconds
    pub(crate) dt_s: f64,

    /// Current ground-truth state of the vehicle, `None` until initialised.
    pub(crate) state: Option<VehicleState>,
}

/// Data required to initialise the vehicle model.
pub struct InitData {
    pub params: Params,

    /// Integration timestep
    ///
    /// Units: seconds
    pub dt_s: f64,

    /// Timestamp given to the initial state
    ///
    /// Units: seconds
    pub timestamp: f64,
}

/// Input data to the vehicle model.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// The demands to apply over this step. Held by the caller between steps.
    pub controls: VehControls,

    /// Timestamp to give to the new state.
    ///
    /// Units: seconds
    pub timestamp: f64,
}

/// Status report for vehicle model processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// The throttle demand was outside [-1, 1] and has been clamped
    pub throttle_limited: bool,

    /// The steer demand was outside [-1, 1] and has been clamped
    pub steer_limited: bool,

    /// The speed hit zero or the maximum speed during the step
    pub speed_limited: bool,

    /// The turn was degenerate (near zero steer or speed) so no yaw rate was applied
    pub straight_line: bool,

    /// Yaw rate applied during the step.
    ///
    /// Units: radians/second
    pub yaw_rate_rads: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for VehSim {
    type InitData = InitData;
    type InitError = VehModelError;

    type InputData = InputData;
    type OutputData = VehicleState;
    type StatusReport = StatusReport;
    type ProcError = VehModelError;

    /// Initialise the vehicle model, placing the vehicle at the initial pose given in the
    /// parameters.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        init_data.params.validate()?;

        if !(init_data.dt_s > 0.0) {
            return Err(VehModelError::InvalidParam("dt_s", init_data.dt_s));
        }

        self.state = Some(VehicleState {
            x: init_data.params.init_x_m,
            y: init_data.params.init_y_m,
            yaw: init_data.params.init_yaw_rad,
            speed: init_data.params.init_speed_ms,
            timestamp: init_data.timestamp,
        });
        self.params = init_data.params;
        self.dt_s = init_data.dt_s;

        Ok(())
    }

    /// Advance the vehicle by one timestep.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let current = match self.state {
            Some(s) => s,
            None => return Err(VehModelError::NotInitialised),
        };

        let (next, report) = step(
            &current,
            &input_data.controls,
            self.dt_s,
            &self.params,
            input_data.timestamp,
        );

        trace!("VehSim step: {:?} -> {:?} ({:?})", current, next, report);

        self.state = Some(next);

        Ok((next, report))
    }
}

impl VehSim {
    /// The current vehicle state, or `None` before initialisation.
    pub fn state(&self) -> Option<VehicleState> {
        self.state
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Integrate the vehicle state over one timestep of length `dt_s`.
///
/// Speed is integrated first, then the yaw with the new speed, then the position with the new yaw
/// (semi-implicit Euler). Yaw is not wrapped.
pub fn step(
    state: &VehicleState,
    controls: &VehControls,
    dt_s: f64,
    params: &Params,
    timestamp: f64,
) -> (VehicleState, StatusReport) {
    let mut report = StatusReport::default();

    // Demands are only nominally normalised, the producer doesn't clamp throttle
    let throttle = clamp(controls.throttle, -1.0, 1.0);
    let steer = clamp(controls.steer, -1.0, 1.0);
    report.throttle_limited = throttle != controls.throttle;
    report.steer_limited = steer != controls.steer;

    // Braking authority is larger than acceleration authority
    let accel_ms2 = if throttle >= 0.0 {
        throttle * params.max_accel_ms2
    } else {
        throttle * params.max_brake_ms2
    };

    let unlimited_speed_ms = state.speed + accel_ms2 * dt_s;
    let speed_ms = clamp(unlimited_speed_ms, 0.0, params.max_speed_ms);
    report.speed_limited = speed_ms != unlimited_speed_ms;

    // Bicycle model turning, R = L / tan(delta)
    let steer_angle_rad = steer * params.max_steer_angle_rad;
    let yaw_rate_rads =
        if steer_angle_rad.abs() > params.min_steer_angle_rad && speed_ms > params.min_turn_speed_ms
        {
            let radius_m = params.wheel_base_m / steer_angle_rad.tan();
            speed_ms / radius_m
        } else {
            report.straight_line = true;
            0.0
        };
    report.yaw_rate_rads = yaw_rate_rads;

    let yaw = state.yaw + yaw_rate_rads * dt_s;

    let next = VehicleState {
        x: state.x + speed_ms * yaw.cos() * dt_s,
        y: state.y + speed_ms * yaw.sin() * dt_s,
        yaw,
        speed: speed_ms,
        timestamp,
    };

    (next, report)
}

#[cfg(test)]
mod test {
    use super::*;

    const DT: f64 = 1.0 / 20.0;

    fn origin(speed: f64) -> VehicleState {
        VehicleState {
            x: 0.0,
            y: 0.0,
            yaw: 0.0,
            speed,
            timestamp: 0.0,
        }
    }

    #[test]
    fn test_step_is_pure() {
        let params = Params::default();
        let state = VehicleState {
            x: 3.0,
            y: -1.0,
            yaw: 0.7,
            speed: 4.2,
            timestamp: 10.0,
        };
        let controls = VehControls {
            throttle: 0.4,
            steer: -0.35,
        };

        let a = step(&state, &controls, DT, &params, 10.05);
        let b = step(&state, &controls, DT, &params, 10.05);

        assert_eq!(a, b);
    }

    #[test]
    fn test_step_acceleration() {
        let params = Params::default();

        // Full throttle from rest, straight line
        let (s, r) = step(
            &origin(0.0),
            &VehControls {
                throttle: 1.0,
                steer: 0.0,
            },
            DT,
            &params,
            DT,
        );
        assert!((s.speed - 3.0 * DT).abs() < 1e-12);
        assert!((s.x - s.speed * DT).abs() < 1e-12);
        assert_eq!(s.y, 0.0);
        assert_eq!(s.timestamp, DT);
        assert!(!r.speed_limited);

        // Full brake is stronger than full throttle
        let (s, _) = step(
            &origin(5.0),
            &VehControls {
                throttle: -1.0,
                steer: 0.0,
            },
            DT,
            &params,
            DT,
        );
        assert!((s.speed - (5.0 - 6.0 * DT)).abs() < 1e-12);
    }

    #[test]
    fn test_step_clamps_demands() {
        let params = Params::default();

        let (over, r) = step(
            &origin(2.0),
            &VehControls {
                throttle: 3.6,
                steer: -4.0,
            },
            DT,
            &params,
            0.0,
        );
        let (full, _) = step(
            &origin(2.0),
            &VehControls {
                throttle: 1.0,
                steer: -1.0,
            },
            DT,
            &params,
            0.0,
        );

        assert_eq!(over, full);
        assert!(r.throttle_limited);
        assert!(r.steer_limited);
    }

    #[test]
    fn test_speed_bounds() {
        let params = Params::default();
        let mut state = origin(0.0);

        // Alternate long periods of full throttle and full brake with some wild demands
        let demands = [5.0, 1.0, 0.3, -0.2, -7.0, -1.0, 2.0];
        for i in 0..2000 {
            let controls = VehControls {
                throttle: demands[(i / 97) % demands.len()],
                steer: ((i as f64) * 0.1).sin() * 1.5,
            };
            let (next, _) = step(&state, &controls, DT, &params, 0.0);

            assert!(next.speed >= 0.0, "speed went negative: {}", next.speed);
            assert!(next.speed <= params.max_speed_ms, "speed over limit: {}", next.speed);

            state = next;
        }
    }

    #[test]
    fn test_straight_line_keeps_yaw() {
        let params = Params::default();
        let state = VehicleState {
            x: 1.0,
            y: 2.0,
            yaw: 7.5,
            speed: 6.0,
            timestamp: 0.0,
        };

        let (next, r) = step(
            &state,
            &VehControls {
                throttle: 0.5,
                steer: 0.0,
            },
            DT,
            &params,
            0.0,
        );

        assert_eq!(next.yaw, state.yaw);
        assert!(r.straight_line);
        assert_eq!(r.yaw_rate_rads, 0.0);
    }

    #[test]
    fn test_no_turn_at_rest() {
        let params = Params::default();

        let (next, r) = step(
            &origin(0.0),
            &VehControls {
                throttle: 0.0,
                steer: 1.0,
            },
            DT,
            &params,
            0.0,
        );

        assert_eq!(next.yaw, 0.0);
        assert_eq!(next.x, 0.0);
        assert!(r.straight_line);
    }

    #[test]
    fn test_bicycle_yaw_rate() {
        let params = Params::default();

        let (next, r) = step(
            &origin(5.0),
            &VehControls {
                throttle: 0.0,
                steer: 0.5,
            },
            DT,
            &params,
            0.0,
        );

        // Positive steer turns left (positive yaw rate)
        let radius = params.wheel_base_m / (0.5 * params.max_steer_angle_rad).tan();
        assert!((r.yaw_rate_rads - 5.0 / radius).abs() < 1e-12);
        assert!((next.yaw - 5.0 / radius * DT).abs() < 1e-12);

        // Position uses the updated yaw
        assert!((next.x - 5.0 * next.yaw.cos() * DT).abs() < 1e-12);
        assert!((next.y - 5.0 * next.yaw.sin() * DT).abs() < 1e-12);
        assert!(next.y > 0.0);
    }

    #[test]
    fn test_yaw_not_wrapped() {
        let params = Params::default();
        let mut state = origin(8.0);

        // Hold full left steer long enough to complete more than one lap of the circle
        for _ in 0..400 {
            state = step(
                &state,
                &VehControls {
                    throttle: 0.0,
                    steer: 1.0,
                },
                DT,
                &params,
                0.0,
            )
            .0;
        }

        assert!(state.yaw > 2.0 * std::f64::consts::PI);
    }

    #[test]
    fn test_veh_sim_init_and_proc() {
        let mut sim = VehSim::default();
        sim.init(InitData {
            params: Params::default(),
            dt_s: DT,
            timestamp: 100.0,
        })
        .unwrap();

        let init = sim.state().unwrap();
        assert_eq!(init.x, 18.0);
        assert_eq!(init.yaw, std::f64::consts::PI);
        assert_eq!(init.timestamp, 100.0);

        let (out, _) = sim
            .proc(&InputData {
                controls: VehControls {
                    throttle: 1.0,
                    steer: 0.0,
                },
                timestamp: 100.05,
            })
            .unwrap();

        // Heading pi, so driving towards -X
        assert!(out.x < 18.0);
        assert_eq!(sim.state(), Some(out));
    }

    #[test]
    fn test_veh_sim_rejects_bad_params() {
        let mut sim = VehSim::default();
        let params = Params {
            wheel_base_m: 0.0,
            ..Default::default()
        };

        assert!(sim
            .init(InitData {
                params,
                dt_s: DT,
                timestamp: 0.0
            })
            .is_err());
        assert!(sim.proc(&InputData::default()).is_err());
    }
}
