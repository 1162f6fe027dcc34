//! Trajectories

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{MotionProfile, TrajectoryMarker};
use crate::geom::{Pose2d, Twist2d};
use crate::path::Path;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A path with a motion profile along it, giving the target pose at every instant.
///
/// Velocities and accelerations are in the field frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    path: Path,
    profile: MotionProfile,
    markers: Vec<TrajectoryMarker>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trajectory {
    pub fn new(path: Path, profile: MotionProfile, markers: Vec<TrajectoryMarker>) -> Self {
        Self {
            path,
            profile,
            markers,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn profile(&self) -> &MotionProfile {
        &self.profile
    }

    pub fn markers(&self) -> &[TrajectoryMarker] {
        &self.markers
    }

    pub fn duration(&self) -> f64 {
        self.profile.duration()
    }

    /// Target pose at time `t`.
    pub fn get(&self, t: f64) -> Pose2d {
        self.path.get(self.profile.get(t).x)
    }

    /// Target velocity at time `t`.
    pub fn velocity(&self, t: f64) -> Twist2d {
        let state = self.profile.get(t);
        self.path.deriv(state.x) * state.v
    }

    /// Target acceleration at time `t`.
    pub fn acceleration(&self, t: f64) -> Twist2d {
        let state = self.profile.get(t);

        self.path.second_deriv(state.x) * (state.v * state.v) + self.path.deriv(state.x) * state.a
    }

    pub fn start(&self) -> Pose2d {
        self.path.start()
    }

    pub fn end(&self) -> Pose2d {
        self.path.end()
    }
}
