//! # Trajectory module
//!
//! A trajectory is a path plus a motion profile along it, giving the target pose, velocity and
//! acceleration as functions of time. The profile is generated from the path under velocity and
//! acceleration constraints. Trajectories also carry markers, which the follower fires as the
//! trajectory passes them.
//!
//! Trajectories are immutable once built and may be shared between threads.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod builder;
mod constraints;
mod generator;
mod marker;
mod profile;
mod trajectory;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use builder::TrajectoryBuilder;
pub use constraints::{
    AccelerationConstraint, ConstraintError, DriveConstraints, TrajectoryAccelerationConstraint,
    TrajectoryVelocityConstraint, VelocityConstraint,
};
pub use generator::{
    generate_motion_profile, generate_path_profile, generate_simple_motion_profile,
    ProfileParams, DEFAULT_RESOLUTION,
};
pub use marker::{MarkerCallback, MarkerSpec, MarkerTime, MarkerTrigger, TrajectoryMarker};
pub use profile::{MotionProfile, MotionState, ProfileSample};
pub use trajectory::Trajectory;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Contents of the constraints parameter file.
#[derive(Debug, Clone, Deserialize)]
pub struct ConstraintParams {
    pub drive: DriveConstraints,

    #[serde(default)]
    pub profile: ProfileParams,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while generating a motion profile.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProfileError {
    #[error("No velocity satisfies the constraints at displacement {s}")]
    UnsatisfiableConstraint { s: f64 },

    #[error("Profile resolution must be positive (got {0})")]
    InvalidResolution(f64),

    #[error("A motion profile must contain at least one sample")]
    EmptyProfile,
}

/// Errors which can occur while building a trajectory.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrajectoryError {
    #[error("Could not generate the motion profile: {0}")]
    Profile(#[from] ProfileError),

    #[error("Marker {label} resolves to {value}, which is outside the trajectory")]
    MarkerOutOfRange { label: String, value: f64 },
}
