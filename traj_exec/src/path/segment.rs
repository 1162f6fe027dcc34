//! Path segments

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{HeadingInterpolator, ParametricCurve};
use crate::geom::{Pose2d, Twist2d};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A curve paired with the heading the robot holds along it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    pub curve: ParametricCurve,
    pub interpolator: HeadingInterpolator,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathSegment {
    pub fn new(curve: ParametricCurve, interpolator: HeadingInterpolator) -> Self {
        Self {
            curve,
            interpolator,
        }
    }

    pub fn length(&self) -> f64 {
        self.curve.length()
    }

    pub fn get(&self, s: f64) -> Pose2d {
        Pose2d::from_position(self.curve.get(s), self.interpolator.get(&self.curve, s))
    }

    pub fn deriv(&self, s: f64) -> Twist2d {
        Twist2d::from_parts(self.curve.deriv(s), self.interpolator.deriv(&self.curve, s))
    }

    pub fn second_deriv(&self, s: f64) -> Twist2d {
        Twist2d::from_parts(
            self.curve.second_deriv(s),
            self.interpolator.second_deriv(&self.curve, s)
        )
    }

    pub fn start(&self) -> Pose2d {
        self.get(0.0)
    }

    pub fn end(&self) -> Pose2d {
        self.get(self.length())
    }

    pub fn start_deriv(&self) -> Twist2d {
        self.deriv(0.0)
    }

    pub fn end_deriv(&self) -> Twist2d {
        self.deriv(self.length())
    }

    pub fn start_second_deriv(&self) -> Twist2d {
        self.second_deriv(0.0)
    }

    pub fn end_second_deriv(&self) -> Twist2d {
        self.second_deriv(self.length())
    }

    /// Direction of travel at the end of the segment.
    pub fn end_tangent_angle(&self) -> f64 {
        self.curve.tangent_angle(self.length())
    }
}
