//! # Trajectory library.
//!
//! Generation and following of time-parameterised trajectories for planar robots. A path is built
//! from lines and splines with a heading interpolator on each segment, a motion profile is
//! generated along it under velocity and acceleration constraints, and the resulting trajectory is
//! followed by a closed-loop controller.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Control module - follows trajectories using pose estimates
pub mod ctrl;

/// Geometry module - poses, twists, angles and frame conversions
pub mod geom;

/// Localisation module - provides the follower with an idea of where the robot is
pub mod loc;

/// Path module - geometric paths and the builder used to create them
pub mod path;

/// Trajectory module - motion profiles, constraints, markers and trajectories
pub mod traj;
