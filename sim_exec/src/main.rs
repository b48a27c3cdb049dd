//! Vehicle simulator executable entry point.
//!
//! # Architecture
//!
//! The simulator runs a single fixed-rate loop:
//!
//!     - Read all pending messages from the bus, keeping the latest control demands
//!     - Step the vehicle model with the held demands
//!     - Publish the vehicle state, and the cone layout when it is due
//!     - Sleep out the rest of the cycle
//!
//! There are no command line arguments. The executable runs until it is killed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{error, info, warn};

// Internal
use comms_if::net::{LinkChange, NetParams, ZmqBus};
use sim_lib::{params::SimExecParams, sim_node::SimNode};
use util::{
    cycle::CyclePacer,
    logger::{logger_init, LevelFilter},
    session::Session,
    time::unix_seconds_now,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of back to back cycle overruns after which the loop is reported as unable to keep up
const MAX_CONSEC_OVERRUNS: u64 = 20;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("sim_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Vehicle Simulator Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;
    let params: SimExecParams =
        util::params::load("sim_exec.toml").wrap_err("Could not load sim_exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE SIMULATION ----

    let mut node =
        SimNode::new(&params, unix_seconds_now()).wrap_err("Failed to initialise the simulator")?;
    info!(
        "Simulator initialised with {} cones, vehicle at {:?}",
        node.cones().len(),
        node.state()
    );

    // ---- INITIALISE NETWORK ----

    let zmq_ctx = comms_if::net::zmq::Context::new();
    let mut bus = ZmqBus::new(
        &zmq_ctx,
        &net_params.sim_pub_bind,
        &[net_params.ctrl_pub_endpoint.as_str()],
    )
    .wrap_err("Failed to initialise the bus")?;
    SimNode::subscribe(&mut bus).wrap_err("Failed to subscribe to the controls")?;

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut pacer = CyclePacer::new(params.cycle_period_s);

    loop {
        pacer.start();

        match bus.link_change() {
            Some(LinkChange::Up) => info!("Connected to the controller"),
            Some(LinkChange::Down) => warn!("Lost connection to the controller"),
            None => (),
        }

        if let Err(e) = node.drain(&bus) {
            warn!("Could not read from the bus: {}", e);
        }

        match node.tick(&bus, unix_seconds_now()) {
            Ok(report) => {
                if pacer.num_cycles % 20 == 0 {
                    info!(
                        "Vehicle at ({:.2}, {:.2}) yaw {:.3} rad, speed {:.2} m/s",
                        report.state.x, report.state.y, report.state.yaw, report.state.speed
                    );
                }
            }
            Err(e) => warn!("Simulator tick failed: {}", e),
        }

        pacer.finish();

        if pacer.num_consec_overruns == MAX_CONSEC_OVERRUNS {
            error!(
                "{} consecutive cycle overruns, the loop cannot keep up with its period",
                MAX_CONSEC_OVERRUNS
            );
        }
    }
}
