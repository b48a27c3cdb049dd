//! Benchmark for target selection on the default oval

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::f64::consts::{PI, TAU};

use comms_if::sim::{Cone, ConeSet, VehicleState};
use ctrl_lib::pursuit::{target_sel, ControllerMemory, Params, Side};

fn oval(num_cones: usize) -> ConeSet {
    (0..num_cones)
        .map(|i| {
            let a = i as f64 / num_cones as f64 * TAU;
            Cone::new(20.0 * a.cos(), 8.0 * a.sin())
        })
        .collect::<Vec<_>>()
        .into()
}

fn criterion_benchmark(c: &mut Criterion) {
    let params = Params::default();
    let state = VehicleState {
        x: 18.0,
        y: 0.0,
        yaw: PI,
        speed: 3.0,
        timestamp: 0.0,
    };
    let memory = ControllerMemory {
        last_target_side: Some(Side::Left),
        last_target_progress_m: Some(4.0),
    };

    let mut group = c.benchmark_group("select_target");

    for &num_cones in [20usize, 200, 2000].iter() {
        let cones = oval(num_cones);

        group.bench_function(format!("{} cones", num_cones), |b| {
            b.iter(|| {
                target_sel::select_target(
                    black_box(&state),
                    black_box(&cones),
                    black_box(&memory),
                    &params,
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
