//! # Trajectory markers
//!
//! Markers are actions attached to a point in a trajectory, triggered by the follower once the
//! trajectory reaches that point. Markers are requested with a [`MarkerSpec`] which is resolved
//! into a [`TrajectoryMarker`] once the trajectory's path and profile are known.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::{MotionProfile, TrajectoryError};
use crate::geom::Vector2d;
use crate::path::Path;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Action run when a marker fires.
#[derive(Clone)]
pub struct MarkerCallback(Arc<dyn Fn() + Send + Sync>);

/// A marker with a resolved trigger point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryMarker {
    /// Name reported by the follower when the marker fires
    pub label: String,

    pub trigger: MarkerTrigger,

    #[serde(skip)]
    pub callback: Option<MarkerCallback>,
}

/// A request for a marker, before the trajectory is built.
#[derive(Debug, Clone)]
pub struct MarkerSpec {
    label: String,
    kind: MarkerKind,
    callback: Option<MarkerCallback>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// When a resolved marker fires.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MarkerTrigger {
    /// Once this many seconds have elapsed.
    Time { time: f64 },

    /// Once the trajectory has covered this displacement.
    Displacement { displacement: f64 },
}

/// Time of a temporal marker relative to the trajectory.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarkerTime {
    /// Seconds from the start.
    Absolute(f64),

    /// Seconds before the end.
    BeforeEnd(f64),

    /// Fraction of the duration.
    Fraction(f64),
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum MarkerKind {
    Temporal(MarkerTime),
    Displacement(f64),
    Spatial(Vector2d),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MarkerCallback {
    pub fn new<F: Fn() + Send + Sync + 'static>(f: F) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl fmt::Debug for MarkerCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MarkerCallback")
    }
}

impl TrajectoryMarker {
    /// Run the callback, if there is one.
    pub fn fire(&self) {
        if let Some(ref cb) = self.callback {
            cb.call();
        }
    }
}

impl MarkerTime {
    /// Time from the start of a trajectory of the given duration.
    pub fn resolve(&self, duration: f64) -> f64 {
        match *self {
            MarkerTime::Absolute(t) => t,
            MarkerTime::BeforeEnd(t) => duration - t,
            MarkerTime::Fraction(f) => f * duration,
        }
    }
}

impl MarkerSpec {
    /// A marker firing at a time.
    pub fn temporal(label: &str, time: MarkerTime) -> Self {
        Self::new(label, MarkerKind::Temporal(time))
    }

    /// A marker firing at a displacement along the path.
    pub fn displacement(label: &str, displacement: f64) -> Self {
        Self::new(label, MarkerKind::Displacement(displacement))
    }

    /// A marker firing where the path passes closest to a point.
    pub fn spatial(label: &str, point: Vector2d) -> Self {
        Self::new(label, MarkerKind::Spatial(point))
    }

    /// Attach an action to the marker.
    pub fn with_callback<F: Fn() + Send + Sync + 'static>(mut self, callback: F) -> Self {
        self.callback = Some(MarkerCallback::new(callback));
        self
    }

    /// Resolve the marker's trigger against the trajectory's path and profile.
    pub fn resolve(
        &self,
        path: &Path,
        profile: &MotionProfile
    ) -> Result<TrajectoryMarker, TrajectoryError> {
        let trigger = match self.kind {
            MarkerKind::Temporal(time) => {
                let t = time.resolve(profile.duration());
                check_range(&self.label, t, profile.duration())?;
                MarkerTrigger::Time { time: t }
            }
            MarkerKind::Displacement(s) => {
                check_range(&self.label, s, path.length())?;
                MarkerTrigger::Displacement { displacement: s }
            }
            MarkerKind::Spatial(point) => MarkerTrigger::Displacement {
                displacement: path.project_nearest(point),
            },
        };

        Ok(TrajectoryMarker {
            label: self.label.clone(),
            trigger,
            callback: self.callback.clone(),
        })
    }

    fn new(label: &str, kind: MarkerKind) -> Self {
        Self {
            label: label.to_string(),
            kind,
            callback: None,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn check_range(label: &str, value: f64, max: f64) -> Result<(), TrajectoryError> {
    if value >= 0.0 && value <= max {
        Ok(())
    }
    else {
        Err(TrajectoryError::MarkerOutOfRange {
            label: label.to_string(),
            value,
        })
    }
}
