//! # Profile Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use drive_lib::{
    cmd::{run, DriveDistance, Trace},
    drive_loop::DriveLoop,
    params::SimParams,
    profile::{BezierCurve, BezierLimits, BezierProfile, JerkProfile, TrapezoidalProfile},
    pursuit::PursuitPath,
};

fn profile_benchmark(c: &mut Criterion) {
    // ---- Straight line profiles ----

    c.bench_function("TrapezoidalProfile::new", |b| {
        b.iter(|| TrapezoidalProfile::new(black_box(100.0), 24.0, 8.0, 0.005).unwrap())
    });

    c.bench_function("JerkProfile::new", |b| {
        b.iter(|| JerkProfile::new(black_box(100.0), 24.0, 8.0, 0.005).unwrap())
    });

    // ---- Curves ----

    let curve = BezierCurve::from_pairs(&[
        [0.0, 0.0],
        [0.0, 60.0],
        [30.0, 90.0],
        [90.0, 90.0],
        [120.0, 120.0],
        [120.0, 180.0],
    ])
    .unwrap();
    let limits = BezierLimits::new(30.0, 8.0, 100.0, 100.0);

    c.bench_function("BezierProfile::new", |b| {
        b.iter(|| BezierProfile::new(black_box(curve.clone()), limits).unwrap())
    });

    c.bench_function("PursuitPath::new", |b| {
        b.iter(|| PursuitPath::new(black_box(&curve), limits, 24.0).unwrap())
    });

    // ---- Closed loop ----

    let params = SimParams::default();

    c.bench_function("DriveDistance 100 in", |b| {
        b.iter(|| {
            let mut drive = DriveLoop::new(&params);
            run(
                &mut DriveDistance::new(100.0, 1.0, 12.0),
                &mut drive,
                &mut Trace::new(),
            )
        })
    });
}

criterion_group!(benches, profile_benchmark);
criterion_main!(benches);
