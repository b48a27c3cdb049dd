//! Processing module interface
//!
//! The vehicle model and the pursuit controller are both modules: they are
//! initialised once from their parameters and then called once per cycle with
//! the latest inputs. Nothing in a module touches the bus, that is left to the
//! node which owns it.

/// A cyclic processing module.
pub trait State {
    /// Data required during initialisation, usually the module parameters.
    type InitData;
    type InitError;

    /// Inputs for a single cycle.
    type InputData;
    /// Outputs of a single cycle.
    type OutputData;
    /// Diagnostics for a single cycle, for logging and tests.
    type StatusReport;
    type ProcError;

    /// Initialise the module. May be called again to reset it.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError>;

    /// Run one cycle of the module.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
