//! # Simulator Node
//!
//! Connects the vehicle model to the bus. The node keeps the latest control demands it has
//! received and applies them on every tick until new ones arrive (zero-order hold). Each tick
//! publishes the new vehicle state, and the static cone layout is republished on its own slower
//! period.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, trace, warn};

use comms_if::{
    net::{decode, publish_msg, topic, Bus, BusError, Envelope},
    sim::{ConeSet, VehControls, VehicleState},
};
use util::{cycle::PeriodicTrigger, module::State};

use crate::{
    cone_layout,
    params::SimExecParams,
    veh_model::{self, VehModelError, VehSim},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The simulator side of the bus.
pub struct SimNode {
    veh_sim: VehSim,

    cones: ConeSet,

    /// Latest demands received, held between ticks
    controls: VehControls,

    cones_trigger: PeriodicTrigger,

    num_controls_recvd: u64,
}

/// What happened during a single tick.
#[derive(Debug, Clone, Copy)]
pub struct TickReport {
    pub state: VehicleState,

    pub veh_model: veh_model::StatusReport,

    /// True if the cone layout was published on this tick
    pub cones_published: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SimNodeError {
    #[error("Vehicle model error: {0}")]
    VehModelError(#[from] VehModelError),

    #[error("Bus error: {0}")]
    BusError(#[from] BusError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimNode {
    /// Create the node, placing the vehicle at its initial pose and generating the cone layout.
    pub fn new(params: &SimExecParams, timestamp: f64) -> Result<Self, SimNodeError> {
        let mut veh_sim = VehSim::default();
        veh_sim.init(veh_model::InitData {
            params: params.veh_model.clone(),
            dt_s: params.cycle_period_s,
            timestamp,
        })?;

        let cones = cone_layout::generate(&params.cone_layout);
        debug!("Generated {} cones", cones.len());

        Ok(Self {
            veh_sim,
            cones,
            controls: VehControls::default(),
            cones_trigger: PeriodicTrigger::new(params.cones_period_s),
            num_controls_recvd: 0,
        })
    }

    /// Subscribe the bus to the topics this node consumes.
    pub fn subscribe<B: Bus + ?Sized>(bus: &mut B) -> Result<(), SimNodeError> {
        bus.subscribe(topic::VEHICLE_CONTROLS)?;
        Ok(())
    }

    /// Handle a single message from the bus.
    ///
    /// Control demands overwrite the held demands. Messages on other topics are ignored.
    pub fn on_message(&mut self, envelope: &Envelope) -> Result<(), SimNodeError> {
        match envelope.topic.as_str() {
            topic::VEHICLE_CONTROLS => {
                self.controls = decode(envelope)?;
                self.num_controls_recvd += 1;
            }
            t => trace!("Ignoring message on {}", t),
        }

        Ok(())
    }

    /// Handle every message waiting on the bus. Messages which cannot be decoded are dropped with
    /// a warning. Returns the number of messages read.
    pub fn drain<B: Bus + ?Sized>(&mut self, bus: &B) -> Result<usize, SimNodeError> {
        let mut num_msgs = 0;

        while let Some(envelope) = bus.try_recv()? {
            num_msgs += 1;

            if let Err(e) = self.on_message(&envelope) {
                warn!("Dropping message: {}", e);
            }
        }

        Ok(num_msgs)
    }

    /// Advance the simulation by one cycle and publish the results.
    ///
    /// `now_s` is the wall clock time used to stamp the state and to schedule the cone layout
    /// publication.
    pub fn tick<B: Bus + ?Sized>(&mut self, bus: &B, now_s: f64) -> Result<TickReport, SimNodeError> {
        let (state, veh_model) = self.veh_sim.proc(&veh_model::InputData {
            controls: self.controls,
            timestamp: now_s,
        })?;

        publish_msg(bus, topic::SIMULATOR_STATE, &state)?;

        let cones_published = self.cones_trigger.poll(now_s);
        if cones_published {
            publish_msg(bus, topic::SIMULATOR_CONES, &self.cones)?;
            trace!("Cones published");
        }

        Ok(TickReport {
            state,
            veh_model,
            cones_published,
        })
    }

    /// The demands currently being applied.
    pub fn controls(&self) -> VehControls {
        self.controls
    }

    /// The current vehicle state.
    pub fn state(&self) -> Option<VehicleState> {
        self.veh_sim.state()
    }

    pub fn cones(&self) -> &ConeSet {
        &self.cones
    }

    /// Number of control messages received since start.
    pub fn num_controls_recvd(&self) -> u64 {
        self.num_controls_recvd
    }
}
