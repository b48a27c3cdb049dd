//! Pursuit controller module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use serde::Serialize;

// Internal
use super::{
    ctrl_law::{self, Demands},
    target_sel, ControllerMemory, Params, PursuitCtrlError, Selection,
};
use comms_if::sim::{ConeSet, VehControls, VehicleState};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Pursuit controller module state
#[derive(Default)]
pub struct PursuitCtrl {
    params: Params,

    memory: ControllerMemory,
}

/// The latest inputs received by the controller. Each is `None` until the first message arrives,
/// after which it is overwritten by every new message.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    pub state: Option<VehicleState>,

    pub cones: Option<ConeSet>,
}

/// The status report containing the target and the state of the control law overrides.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// The cycle was skipped as there was no state or cone set yet
    pub skipped: bool,

    pub selection: Option<Selection>,

    pub demands: Demands,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for PursuitCtrl {
    type InitData = Params;
    type InitError = PursuitCtrlError;

    type InputData = InputData;
    type OutputData = Option<VehControls>;
    type StatusReport = StatusReport;
    type ProcError = PursuitCtrlError;

    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        init_data.validate()?;

        self.params = init_data;
        self.memory = ControllerMemory::default();

        Ok(())
    }

    /// Calculate the demands for this cycle.
    ///
    /// Returns `None` if the state or the cones haven't been received yet, in which case nothing
    /// should be published.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let mut report = StatusReport::default();

        let (state, cones) = match (&input_data.state, &input_data.cones) {
            (Some(s), Some(c)) => (s, c),
            _ => {
                trace!("PursuitCtrl: waiting for state and cones");
                report.skipped = true;
                return Ok((None, report));
            }
        };

        report.selection = target_sel::select_target(state, cones, &self.memory, &self.params);

        match report.selection {
            Some(ref sel) => {
                self.memory.record(sel);
                debug!(
                    "Target ({:.2}, {:.2}) {:?}, progress {:.2} m, {:?}",
                    sel.target.cone.x,
                    sel.target.cone.y,
                    sel.target.side(),
                    sel.target.progress_m,
                    sel.source
                );
            }
            None => debug!("No target"),
        }

        report.demands = ctrl_law::calc_demands(
            state,
            report.selection.as_ref().map(|s| &s.target),
            &self.params,
        );
        debug!(
            "Demands: throttle {:.3}, steer {:.3} (braking: {}, heading guard: {})",
            report.demands.controls.throttle,
            report.demands.controls.steer,
            report.demands.braking,
            report.demands.head_guard
        );

        Ok((Some(report.demands.controls), report))
    }
}

impl PursuitCtrl {
    /// The controller's memory of the last target.
    pub fn memory(&self) -> &ControllerMemory {
        &self.memory
    }
}
