//! Trajectory follower parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::ctrl::PidfParams;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the trajectory follower
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowerParams {
    /// The control law and its gains
    pub kind: FollowerKind,

    /// Largest error at the end of the trajectory for which following is complete
    pub admissible_error: AdmissibleError,
}

/// Per-axis error tolerances, in the robot frame.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdmissibleError {
    /// Along-track tolerance
    pub x: f64,

    /// Cross-track tolerance
    pub y: f64,

    /// Heading tolerance in radians
    pub heading: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The control law used by the follower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FollowerKind {
    /// Independent PIDF control of each robot-frame axis, for drives that can strafe.
    Holonomic {
        axial: PidfParams,
        lateral: PidfParams,
        heading: PidfParams,
    },

    /// PIDF control for a differential drive. The cross-track error is corrected by turning, so the
    /// lateral output is always zero.
    Tank {
        axial: PidfParams,
        cross_track: PidfParams,
        heading: PidfParams,
    },

    /// Non-linear unicycle tracking law.
    Ramsete {
        /// Aggressiveness of the convergence, must be positive
        b: f64,

        /// Damping, in (0, 1)
        zeta: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for FollowerParams {
    fn default() -> Self {
        Self {
            kind: FollowerKind::Ramsete { b: 2.0, zeta: 0.7 },
            admissible_error: AdmissibleError::default(),
        }
    }
}

impl Default for AdmissibleError {
    fn default() -> Self {
        Self {
            x: 0.05,
            y: 0.05,
            heading: 0.05,
        }
    }
}

impl AdmissibleError {
    /// True if every component of the robot-frame error is within tolerance.
    pub fn admits(&self, x_error: f64, y_error: f64, heading_error: f64) -> bool {
        x_error.abs() <= self.x && y_error.abs() <= self.y && heading_error.abs() <= self.heading
    }
}
