//! # Controller Node
//!
//! Connects the pursuit controller to the bus. The latest vehicle state and cone set are held
//! until replaced by newer messages, so a tick with no new input reuses the previous one. Nothing
//! is published until both have been received.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{trace, warn};

use comms_if::net::{decode, publish_msg, topic, Bus, BusError, Envelope};
use util::module::State;

use crate::{
    params::CtrlExecParams,
    pursuit::{self, PursuitCtrl, PursuitCtrlError},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The controller side of the bus.
pub struct CtrlNode {
    pursuit_ctrl: PursuitCtrl,

    input: pursuit::InputData,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CtrlNodeError {
    #[error("Pursuit controller error: {0}")]
    PursuitCtrlError(#[from] PursuitCtrlError),

    #[error("Bus error: {0}")]
    BusError(#[from] BusError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CtrlNode {
    pub fn new(params: &CtrlExecParams) -> Result<Self, CtrlNodeError> {
        let mut pursuit_ctrl = PursuitCtrl::default();
        pursuit_ctrl.init(params.pursuit.clone())?;

        Ok(Self {
            pursuit_ctrl,
            input: pursuit::InputData::default(),
        })
    }

    /// Subscribe the bus to the topics this node consumes.
    pub fn subscribe<B: Bus + ?Sized>(bus: &mut B) -> Result<(), CtrlNodeError> {
        bus.subscribe(topic::SIMULATOR_STATE)?;
        bus.subscribe(topic::SIMULATOR_CONES)?;
        Ok(())
    }

    /// Handle a single message from the bus, replacing the held state or cone set.
    pub fn on_message(&mut self, envelope: &Envelope) -> Result<(), CtrlNodeError> {
        match envelope.topic.as_str() {
            topic::SIMULATOR_STATE => self.input.state = Some(decode(envelope)?),
            topic::SIMULATOR_CONES => self.input.cones = Some(decode(envelope)?),
            t => trace!("Ignoring message on {}", t),
        }

        Ok(())
    }

    /// Handle every message waiting on the bus. Messages which cannot be decoded are dropped with
    /// a warning. Returns the number of messages read.
    pub fn drain<B: Bus + ?Sized>(&mut self, bus: &B) -> Result<usize, CtrlNodeError> {
        let mut num_msgs = 0;

        while let Some(envelope) = bus.try_recv()? {
            num_msgs += 1;

            if let Err(e) = self.on_message(&envelope) {
                warn!("Dropping message: {}", e);
            }
        }

        Ok(num_msgs)
    }

    /// Run the controller on the held inputs and publish the demands, if there are any.
    pub fn tick<B: Bus + ?Sized>(&mut self, bus: &B) -> Result<pursuit::StatusReport, CtrlNodeError> {
        let (controls, report) = self.pursuit_ctrl.proc(&self.input)?;

        if let Some(c) = controls {
            publish_msg(bus, topic::VEHICLE_CONTROLS, &c)?;
        }

        Ok(report)
    }

    pub fn input(&self) -> &pursuit::InputData {
        &self.input
    }

    pub fn pursuit_ctrl(&self) -> &PursuitCtrl {
        &self.pursuit_ctrl
    }
}
