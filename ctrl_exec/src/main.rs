//! Controller executable entry point.
//!
//! # Architecture
//!
//! The controller runs a single fixed-rate loop:
//!
//!     - Read all pending messages from the bus, keeping the latest vehicle state and cone set
//!     - Select a target and calculate the control demands
//!     - Publish the demands
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
use ctrl_lib::{ctrl_node::CtrlNode, params::CtrlExecParams};
use util::{
    cycle::CyclePacer,
    logger::{logger_init, LevelFilter},
    session::Session,
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

    let session = Session::new("ctrl_exec", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Pursuit Controller Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load("net.toml").wrap_err("Could not load net params")?;
    let params: CtrlExecParams =
        util::params::load("ctrl_exec.toml").wrap_err("Could not load ctrl_exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE CONTROLLER ----

    let mut node = CtrlNode::new(&params).wrap_err("Failed to initialise the controller")?;

    // ---- INITIALISE NETWORK ----

    let zmq_ctx = comms_if::net::zmq::Context::new();
    let mut bus = ZmqBus::new(
        &zmq_ctx,
        &net_params.ctrl_pub_bind,
        &[net_params.sim_pub_endpoint.as_str()],
    )
    .wrap_err("Failed to initialise the bus")?;
    CtrlNode::subscribe(&mut bus).wrap_err("Failed to subscribe to the simulator")?;

    info!("Network initialisation complete");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut pacer = CyclePacer::new(params.cycle_period_s);
    let mut waiting = true;

    loop {
        pacer.start();

        match bus.link_change() {
            Some(LinkChange::Up) => info!("Connected to the simulator"),
            Some(LinkChange::Down) => warn!("Lost connection to the simulator"),
            None => (),
        }

        if let Err(e) = node.drain(&bus) {
            warn!("Could not read from the bus: {}", e);
        }

        match node.tick(&bus) {
            Ok(report) => {
                if waiting && !report.skipped {
                    info!("State and cones received, controller running");
                    waiting = false;
                }

                if !report.skipped && pacer.num_cycles % 20 == 0 {
                    info!(
                        "Throttle {:.2}, steer {:.2}, braking: {}, heading guard: {}",
                        report.demands.controls.throttle,
                        report.demands.controls.steer,
                        report.demands.braking,
                        report.demands.head_guard
                    );
                }
            }
            Err(e) => warn!("Controller tick failed: {}", e),
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
