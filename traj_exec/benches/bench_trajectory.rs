//! # Trajectory Benchmark

use criterion::{criterion_group, criterion_main, Criterion};
use std::f64::consts::{FRAC_PI_2, PI};

use traj_lib::{
    geom::{Pose2d, Vector2d},
    path::{Path, PathBuilder},
    traj::{DriveConstraints, TrajectoryBuilder, VelocityConstraint},
};

fn trajectory_benchmark(c: &mut Criterion) {
    // ---- Build a multi-segment spline path ----

    let path: Path = PathBuilder::new(Pose2d::default(), 0.0)
        .spline_to(Vector2d::new(3.0, 2.0), FRAC_PI_2)
        .and_then(|b| b.spline_to(Vector2d::new(1.0, 5.0), PI))
        .and_then(|b| {
            b.spline_to_spline_heading(Pose2d::new(-2.0, 3.0, -FRAC_PI_2), -FRAC_PI_2)
        })
        .and_then(|b| b.line_to(Vector2d::new(-2.0, 0.0)))
        .and_then(|b| b.spline_to(Vector2d::new(0.0, -2.0), 0.0))
        .and_then(|b| b.build())
        .unwrap();

    let drive = DriveConstraints {
        max_vel: 1.5,
        max_accel: 1.0,
        max_ang_vel: 2.0,
        max_ang_accel: 2.0,
        extra_velocity: vec![VelocityConstraint::TankWheel {
            max_wheel_vel: 1.8,
            track_width: 0.4,
        }],
    };
    let vel_constraint = drive.velocity_constraint();
    let accel_constraint = drive.acceleration_constraint();

    // Bench generation at the default and a fine resolution
    c.bench_function("TrajectoryBuilder::build", |b| {
        b.iter(|| {
            TrajectoryBuilder::new(path.clone(), &vel_constraint, &accel_constraint)
                .build()
                .unwrap()
        })
    });

    c.bench_function("TrajectoryBuilder::build::fine", |b| {
        b.iter(|| {
            TrajectoryBuilder::new(path.clone(), &vel_constraint, &accel_constraint)
                .resolution(0.01)
                .build()
                .unwrap()
        })
    });

    let traj = TrajectoryBuilder::new(path, &vel_constraint, &accel_constraint)
        .build()
        .unwrap();

    c.bench_function("Trajectory::get", |b| {
        b.iter(|| traj.get(0.37 * traj.duration()))
    });
}

criterion_group!(benches, trajectory_benchmark);
criterion_main!(benches);
