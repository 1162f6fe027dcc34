//! # Geometry module
//!
//! Planar geometry primitives shared by the path, trajectory and control modules.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod angle;
pub mod kinematics;
mod pose;
mod vector;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use pose::{Pose2d, Twist2d};
pub use vector::{Vector2Ext, Vector2d};
