//! Trajectory executable entry point.
//!
//! # Architecture
//!
//! The executable demonstrates the trajectory library end to end:
//!
//!     - Load the constraint, follower and demo path parameters
//!     - Build the demo path and generate a trajectory along it
//!     - Main loop, at a fixed cycle period:
//!         - Localisation (dead reckoning of the previous drive signal)
//!         - Trajectory follower processing
//!         - Cycle management
//!
//! The loop ends when the follower completes the trajectory, or is aborted once the trajectory's
//! duration plus the timeout margin has passed.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use serde::Deserialize;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use traj_lib::{
    ctrl::{Clock, FollowerMode, InputData, SystemClock, TrajectoryFollower},
    geom::{kinematics::robot_pose_error, Twist2d, Vector2d},
    loc::{DeadReckoning, Localiser},
    path::PathSpec,
    traj::{ConstraintParams, MarkerSpec, MarkerTime, TrajectoryBuilder},
};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of the demonstration run
#[derive(Debug, Deserialize)]
struct DemoParams {
    /// Target period of one cycle
    cycle_period_s: f64,

    /// Time allowed after the end of the trajectory before following is aborted
    timeout_margin_s: f64,

    /// The path to follow
    path: PathSpec,

    #[serde(default)]
    markers: Vec<DemoMarker>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A marker which logs when it fires.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum DemoMarker {
    Temporal { label: String, time: MarkerTime },
    Displacement { label: String, displacement: f64 },
    Spatial { label: String, x: f64, y: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DemoMarker {
    fn spec(&self) -> MarkerSpec {
        let spec = match self {
            DemoMarker::Temporal { label, time } => MarkerSpec::temporal(label, *time),
            DemoMarker::Displacement {
                label,
                displacement,
            } => MarkerSpec::displacement(label, *displacement),
            DemoMarker::Spatial { label, x, y } => {
                MarkerSpec::spatial(label, Vector2d::new(*x, *y))
            }
        };

        let label = self.label().to_string();
        spec.with_callback(move || info!("Reached marker \"{}\"", label))
    }

    fn label(&self) -> &str {
        match self {
            DemoMarker::Temporal { label, .. } => label,
            DemoMarker::Displacement { label, .. } => label,
            DemoMarker::Spatial { label, .. } => label,
        }
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("traj_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Trajectory Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let constraints: ConstraintParams =
        util::params::load("constraints.toml").wrap_err("Could not load constraint params")?;
    let demo: DemoParams =
        util::params::load("demo_path.toml").wrap_err("Could not load demo path params")?;

    info!("Exec parameters loaded");

    // ---- BUILD TRAJECTORY ----

    let path = demo.path.build().wrap_err("Could not build the demo path")?;
    info!(
        "Built path of {} segments and length {:.3} m",
        path.segments().len(),
        path.length()
    );

    let vel_constraint = constraints.drive.velocity_constraint();
    let accel_constraint = constraints.drive.acceleration_constraint();

    let mut builder = TrajectoryBuilder::new(path, &vel_constraint, &accel_constraint)
        .resolution(constraints.profile.resolution);
    for marker in demo.markers.iter() {
        builder = builder.add_marker(marker.spec());
    }
    let traj = Arc::new(builder.build().wrap_err("Could not generate the trajectory")?);

    info!("Trajectory duration {:.3} s", traj.duration());
    session.save("trajectory.json", (*traj).clone());

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut follower = TrajectoryFollower::default();
    follower
        .init("follower.toml", &session)
        .wrap_err("Failed to initialise the TrajectoryFollower")?;
    info!("TrajectoryFollower init complete");

    let mut loc = DeadReckoning::new(traj.start());

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    let clock = SystemClock::new();
    let timeout_s = traj.duration() + demo.timeout_margin_s;
    let cycle_period = Duration::from_secs_f64(demo.cycle_period_s);

    let mut last_cycle_s = clock.seconds();
    let mut drive_vel = Twist2d::default();

    follower.follow_trajectory(Arc::clone(&traj));

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();
        let now_s = clock.seconds();
        let dt = now_s - last_cycle_s;
        last_cycle_s = now_s;

        // ---- LOCALISATION ----

        loc.set_drive(drive_vel, dt);
        loc.update();

        // ---- TRAJECTORY FOLLOWING ----

        let input = InputData {
            pose: loc.pose_estimate(),
            velocity: loc.velocity_estimate(),
            dt,
        };

        let (signal, report) = follower
            .proc(&input)
            .wrap_err("Error during trajectory follower processing")?;
        drive_vel = signal.vel;

        debug!(
            "t = {:.3} s, error = ({:.3}, {:.3}, {:.3}), vel = ({:.3}, {:.3}, {:.3})",
            report.elapsed,
            report.error.x(),
            report.error.y(),
            report.error.heading(),
            signal.vel.x,
            signal.vel.y,
            signal.vel.heading
        );

        if report.mode == FollowerMode::Idle {
            break;
        }

        if now_s > timeout_s {
            warn!(
                "Trajectory not complete after {:.3} s, aborting",
                now_s
            );
            follower.abort();
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            ),
        }
    }

    // ---- SHUTDOWN ----

    let final_error = robot_pose_error(&traj.end(), &loc.pose_estimate());
    info!(
        "Final pose {:?}, error to the end pose ({:.3}, {:.3}, {:.3})",
        loc.pose_estimate(),
        final_error.x(),
        final_error.y(),
        final_error.heading()
    );

    info!("End of execution");
    session.exit();

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::path::PathBuf;
    use traj_lib::ctrl::FollowerParams;

    fn param_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("params")
            .join(name)
    }

    #[test]
    fn test_demo_params_followed_to_completion() {
        let constraints: ConstraintParams =
            util::params::load_from(param_path("constraints.toml")).unwrap();
        let demo: DemoParams = util::params::load_from(param_path("demo_path.toml")).unwrap();
        let follower_params: FollowerParams =
            util::params::load_from(param_path("follower.toml")).unwrap();

        let vel_constraint = constraints.drive.velocity_constraint();
        let accel_constraint = constraints.drive.acceleration_constraint();
        let mut builder = TrajectoryBuilder::new(
            demo.path.build().unwrap(),
            &vel_constraint,
            &accel_constraint
        )
        .resolution(constraints.profile.resolution);
        for marker in demo.markers.iter() {
            builder = builder.add_marker(marker.spec());
        }
        let traj = Arc::new(builder.build().unwrap());
        assert_eq!(traj.markers().len(), 3);

        let mut follower = TrajectoryFollower::new(follower_params);
        let mut loc = DeadReckoning::new(traj.start());
        let dt = demo.cycle_period_s;
        let mut fired = 0;

        follower.follow_trajectory(Arc::clone(&traj));
        let mut t = 0.0;
        while follower.is_following() && t < traj.duration() + demo.timeout_margin_s {
            loc.update();
            let (signal, report) =
                follower.update(&loc.pose_estimate(), loc.velocity_estimate().as_ref(), dt);
            loc.set_drive(signal.vel, dt);
            fired += report.fired_markers.len();
            t += dt;
        }

        assert!(!follower.is_following());
        assert_eq!(fired, 3);
        assert!(loc.pose_estimate().position().metric_distance(&traj.end().position()) < 0.1);
    }
}
