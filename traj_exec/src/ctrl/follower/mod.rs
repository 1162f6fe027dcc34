//! # Trajectory follower module
//!
//! The follower keeps the robot on a trajectory. Each cycle it advances its own clock along the
//! trajectory, samples the target pose, velocity and acceleration, and compares the target pose
//! against the current pose estimate. The error, expressed in the robot frame, is passed through
//! the configured control law which produces a correction on top of the target velocity.
//!
//! Following completes once the trajectory's duration has passed and the robot is within the
//! admissible error of the end pose. Until then the follower keeps driving towards the final
//! target, so a robot which falls behind will still reach the end.
//!
//! Markers attached to the trajectory are fired as the follower passes them. Each fires at most
//! once per run, and any which haven't fired by completion are fired on the completing cycle.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod controllers;
mod params;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use params::{AdmissibleError, FollowerKind, FollowerParams};
pub use state::{
    DriveSignal, FollowerError, FollowerMode, InputData, StatusReport, TrajectoryFollower,
};
