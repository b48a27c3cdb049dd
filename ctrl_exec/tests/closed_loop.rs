//! Runs the simulator and the controller against each other over an in-process bus.

use comms_if::net::{topic, Bus, LocalBus};
use ctrl_lib::{ctrl_node::CtrlNode, params::CtrlExecParams, pursuit::Side};
use sim_lib::{params::SimExecParams, sim_node::SimNode};

const NUM_TICKS: usize = 400;

#[test]
fn test_closed_loop() {
    let sim_params = SimExecParams::default();
    let ctrl_params = CtrlExecParams::default();

    let mut sim = SimNode::new(&sim_params, 0.0).unwrap();
    let mut ctrl = CtrlNode::new(&ctrl_params).unwrap();

    let mut sim_bus = LocalBus::new();
    let mut ctrl_bus = sim_bus.handle();
    SimNode::subscribe(&mut sim_bus).unwrap();
    CtrlNode::subscribe(&mut ctrl_bus).unwrap();

    // Watches the controls without consuming them
    let mut monitor = sim_bus.handle();
    monitor.subscribe(topic::VEHICLE_CONTROLS).unwrap();

    let start = sim.state().unwrap();
    let mut prev = start;
    let mut path_length_m = 0.0;
    let mut seen_left = false;
    let mut seen_right = false;

    for i in 1..=NUM_TICKS {
        sim.drain(&sim_bus).unwrap();
        let state = sim
            .tick(&sim_bus, i as f64 * sim_params.cycle_period_s)
            .unwrap()
            .state;

        assert!(state.speed >= 0.0);
        assert!(state.speed <= sim_params.veh_model.max_speed_ms);
        path_length_m += ((state.x - prev.x).powi(2) + (state.y - prev.y).powi(2)).sqrt();
        prev = state;

        ctrl.drain(&ctrl_bus).unwrap();
        let report = ctrl.tick(&ctrl_bus).unwrap();

        // State and cones were both published on the first tick
        assert!(!report.skipped);

        match report.selection.map(|s| s.target.side()) {
            Some(Side::Left) => seen_left = true,
            Some(Side::Right) => seen_right = true,
            None => panic!("No target selected on tick {}", i),
        }
    }

    // Every published demand but the last has reached the simulator
    assert_eq!(sim.num_controls_recvd(), NUM_TICKS as u64 - 1);
    assert_eq!(monitor.pending(), NUM_TICKS);

    assert!(seen_left && seen_right);
    assert!(path_length_m > 20.0, "only travelled {:.2} m", path_length_m);
    assert!(ctrl.pursuit_ctrl().memory().last_target_side.is_some());
}
