//! # Control module
//!
//! Closed-loop control of the robot along a trajectory. The [`TrajectoryFollower`] is fed pose
//! estimates from a localiser and produces robot-frame drive signals for the drivetrain, using
//! [`PidfController`]s or a non-linear tracking law depending on its parameters.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod clock;
mod follower;
mod pid;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use clock::{Clock, SystemClock};
pub use follower::{
    AdmissibleError, DriveSignal, FollowerError, FollowerKind, FollowerMode, FollowerParams,
    InputData, StatusReport, TrajectoryFollower,
};
pub use pid::{PidfController, PidfParams};
