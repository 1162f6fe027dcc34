//! Trajectory follower state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use serde::Serialize;
use std::sync::Arc;

// Internal
use super::controllers::FollowerControllers;
use super::FollowerParams;
use crate::ctrl::Clock;
use crate::geom::{
    kinematics::{field_to_robot_acceleration, field_to_robot_velocity, robot_pose_error},
    Pose2d, Twist2d,
};
use crate::traj::{MarkerTrigger, Trajectory};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Trajectory follower state
pub struct TrajectoryFollower {
    params: FollowerParams,

    /// Executing mode
    mode: FollowerMode,

    /// Trajectory being followed, kept after completion until the next one is started
    trajectory: Option<Arc<Trajectory>>,

    /// Time along the trajectory
    elapsed: f64,

    /// Clock reading at the last self-timed update
    last_clock_time: Option<f64>,

    /// One flag per trajectory marker
    fired: Vec<bool>,

    controllers: FollowerControllers,

    output: DriveSignal,
    report: StatusReport,
    archiver: Archiver,
}

/// Input data to the follower's cyclic processing.
#[derive(Debug, Copy, Clone, Default)]
pub struct InputData {
    /// Field-frame pose estimate
    pub pose: Pose2d,

    /// Field-frame velocity estimate, if known
    pub velocity: Option<Twist2d>,

    /// Time since the last cycle in seconds
    pub dt: f64,
}

/// Drive command for the drivetrain, in the robot frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize)]
pub struct DriveSignal {
    pub vel: Twist2d,
    pub accel: Twist2d,
}

/// The status report of a single follower update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusReport {
    /// Mode at the end of the update
    pub mode: FollowerMode,

    /// Time along the trajectory
    pub elapsed: f64,

    /// Robot-frame error between the target and current pose
    pub error: Pose2d,

    /// Labels of the markers fired during this update
    pub fired_markers: Vec<String>,

    /// True if the error is within the admissible error
    pub admissible: bool,
}

/// A flat record of a single update, for the CSV archive.
#[derive(Serialize)]
struct FollowerRecord {
    elapsed: f64,
    mode: FollowerMode,
    error_x: f64,
    error_y: f64,
    error_heading: f64,
    admissible: bool,
    vel_x: f64,
    vel_y: f64,
    vel_heading: f64,
    accel_x: f64,
    accel_y: f64,
    accel_heading: f64,
    fired_markers: String,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Potential errors that can occur during initialisation or processing of the follower.
#[derive(Debug, thiserror::Error)]
pub enum FollowerError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(params::LoadError),

    #[error("Could not write the follower archive: {0}")]
    ArchiveError(ArchiveError),
}

/// The modes of execution of the follower. Each mode is handled by a `mode_xyz` function.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum FollowerMode {
    Idle,
    Following,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for FollowerMode {
    fn default() -> Self {
        FollowerMode::Idle
    }
}

impl Default for TrajectoryFollower {
    fn default() -> Self {
        Self::new(FollowerParams::default())
    }
}

impl State for TrajectoryFollower {
    type InitData = &'static str;
    type InitError = FollowerError;

    type InputData = InputData;
    type OutputData = DriveSignal;
    type StatusReport = StatusReport;
    type ProcError = FollowerError;

    /// Initialise the follower.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        let params = params::load(init_data).map_err(FollowerError::ParamLoadError)?;
        *self = Self::new(params);

        self.archiver = Archiver::from_path(session, "traj_follower/status.csv")
            .map_err(FollowerError::ArchiveError)?;

        Ok(())
    }

    /// Perform one follower update, archiving the result if the follower has been initialised.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        let (output, report) = self.update(
            &input_data.pose,
            input_data.velocity.as_ref(),
            input_data.dt
        );

        if self.archiver.is_initialised() {
            self.write().map_err(FollowerError::ArchiveError)?;
        }

        Ok((output, report))
    }
}

impl Archived for TrajectoryFollower {
    fn write(&mut self) -> Result<(), ArchiveError> {
        let record = FollowerRecord {
            elapsed: self.report.elapsed,
            mode: self.report.mode,
            error_x: self.report.error.x(),
            error_y: self.report.error.y(),
            error_heading: self.report.error.heading(),
            admissible: self.report.admissible,
            vel_x: self.output.vel.x,
            vel_y: self.output.vel.y,
            vel_heading: self.output.vel.heading,
            accel_x: self.output.accel.x,
            accel_y: self.output.accel.y,
            accel_heading: self.output.accel.heading,
            fired_markers: self.report.fired_markers.join(";"),
        };

        self.archiver.serialise(record)
    }
}

impl TrajectoryFollower {
    pub fn new(params: FollowerParams) -> Self {
        let controllers = FollowerControllers::new(&params.kind);

        Self {
            params,
            mode: FollowerMode::Idle,
            trajectory: None,
            elapsed: 0.0,
            last_clock_time: None,
            fired: Vec::new(),
            controllers,
            output: DriveSignal::default(),
            report: StatusReport::default(),
            archiver: Archiver::default(),
        }
    }

    pub fn params(&self) -> &FollowerParams {
        &self.params
    }

    pub fn mode(&self) -> FollowerMode {
        self.mode
    }

    pub fn is_following(&self) -> bool {
        self.mode == FollowerMode::Following
    }

    /// Time along the current trajectory.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// The current or most recently completed trajectory.
    pub fn trajectory(&self) -> Option<&Arc<Trajectory>> {
        self.trajectory.as_ref()
    }

    /// Begin following a trajectory.
    ///
    /// Any trajectory currently being followed is replaced. Following starts from the beginning
    /// of the new trajectory on the next update, with the controllers and markers reset.
    pub fn follow_trajectory(&mut self, trajectory: Arc<Trajectory>) {
        info!(
            "Following trajectory of duration {:.3} s with {} markers",
            trajectory.duration(),
            trajectory.markers().len()
        );

        self.fired = vec![false; trajectory.markers().len()];
        self.trajectory = Some(trajectory);
        self.elapsed = 0.0;
        self.last_clock_time = None;
        self.controllers.reset();
        self.mode = FollowerMode::Following;
    }

    /// Stop following the current trajectory.
    pub fn abort(&mut self) {
        if self.is_following() {
            info!("Trajectory aborted after {:.3} s", self.elapsed);
        }

        self.mode = FollowerMode::Idle;
    }

    /// Update the follower.
    ///
    /// # Inputs
    /// - `pose`: field-frame pose estimate.
    /// - `field_vel`: field-frame velocity estimate, if known.
    /// - `dt`: time since the last update in seconds.
    ///
    /// # Outputs
    /// - The drive signal, which is zero when the follower isn't following.
    /// - The status report.
    pub fn update(
        &mut self,
        pose: &Pose2d,
        field_vel: Option<&Twist2d>,
        dt: f64
    ) -> (DriveSignal, StatusReport) {
        // Setup cycle data
        self.output = DriveSignal::default();
        self.report = StatusReport {
            mode: self.mode,
            elapsed: self.elapsed,
            ..StatusReport::default()
        };

        match self.mode {
            FollowerMode::Idle => self.mode_idle(),
            FollowerMode::Following => self.mode_following(pose, field_vel, dt),
        }

        self.report.mode = self.mode;

        (self.output, self.report.clone())
    }

    /// Update the follower, timing the update from a clock.
    ///
    /// The first self-timed update after starting a trajectory has a time step of zero.
    pub fn update_now(
        &mut self,
        pose: &Pose2d,
        field_vel: Option<&Twist2d>,
        clock: &dyn Clock
    ) -> (DriveSignal, StatusReport) {
        let now = clock.seconds();
        let dt = match self.last_clock_time {
            Some(t) => now - t,
            None => 0.0,
        };
        self.last_clock_time = Some(now);

        self.update(pose, field_vel, dt)
    }

    /// Mode idle
    ///
    /// Nothing is commanded in this mode. To start following call `follow_trajectory`.
    fn mode_idle(&mut self) {}

    /// Mode following
    fn mode_following(&mut self, pose: &Pose2d, field_vel: Option<&Twist2d>, dt: f64) {
        let traj = match self.trajectory {
            Some(ref t) => Arc::clone(t),
            None => {
                self.mode = FollowerMode::Idle;
                return;
            }
        };

        self.elapsed += dt.max(0.0);
        let t = self.elapsed;

        // Targets in the robot frame
        let target_pose = traj.get(t);
        let target_field_vel = traj.velocity(t);
        let target_field_accel = traj.acceleration(t);
        let target_vel = field_to_robot_velocity(&target_pose, &target_field_vel);
        let target_accel =
            field_to_robot_acceleration(&target_pose, &target_field_vel, &target_field_accel);

        let error = robot_pose_error(&target_pose, pose);
        let measured_vel = field_vel.map(|v| field_to_robot_velocity(pose, v));

        self.output =
            self.controllers
                .update(t, &error, &target_vel, &target_accel, measured_vel.as_ref());

        let admissible = self
            .params
            .admissible_error
            .admits(error.x(), error.y(), error.heading());

        self.report.elapsed = t;
        self.report.error = error;
        self.report.admissible = admissible;

        self.fire_markers(&traj, false);

        if t > traj.duration() && admissible {
            self.fire_markers(&traj, true);
            self.output = DriveSignal::default();
            self.mode = FollowerMode::Idle;

            info!(
                "Trajectory complete after {:.3} s, final error ({:.3}, {:.3}, {:.3})",
                t,
                error.x(),
                error.y(),
                error.heading()
            );
        }
    }

    /// Fire the markers the follower has passed, or every unfired marker if `all` is set.
    fn fire_markers(&mut self, traj: &Trajectory, all: bool) {
        let displacement = traj.profile().get(self.elapsed).x;

        for (marker, fired) in traj.markers().iter().zip(self.fired.iter_mut()) {
            if *fired {
                continue;
            }

            let passed = match marker.trigger {
                MarkerTrigger::Time { time } => self.elapsed >= time,
                MarkerTrigger::Displacement { displacement: s } => displacement >= s,
            };

            if passed || all {
                trace!("Marker {} fired at {:.3} s", marker.label, self.elapsed);

                marker.fire();
                *fired = true;
                self.report.fired_markers.push(marker.label.clone());
            }
        }
    }
}
