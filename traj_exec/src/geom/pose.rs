//! # Poses and twists
//!
//! A [`Pose2d`] is a position plus a heading, with the heading always normalised into (-pi, pi].
//! A [`Twist2d`] is the rate of change of a pose (a velocity or an acceleration), whose angular
//! component is not wrapped.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

// Internal
use super::{angle, Vector2Ext, Vector2d};
use util::maths::epsilon_eq;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Position and heading of a rigid body in the plane.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Pose2dDef")]
pub struct Pose2d {
    x: f64,
    y: f64,
    heading: f64,
}

/// Unchecked mirror of [`Pose2d`] used to normalise deserialised headings.
#[derive(Deserialize)]
struct Pose2dDef {
    x: f64,
    y: f64,
    heading: f64,
}

/// Rate of change of a pose.
///
/// `x` and `y` are the translational components and `heading` the angular component. Whether the
/// translational components are in the field or the robot frame depends on where the twist came
/// from.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Twist2d {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose2d {
    /// Create a new pose, normalising the heading.
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self {
            x,
            y,
            heading: angle::norm(heading),
        }
    }

    /// Create a new pose from a position vector and a heading.
    pub fn from_position(position: Vector2d, heading: f64) -> Self {
        Self::new(position.x, position.y, heading)
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    /// Heading in (-pi, pi].
    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn position(&self) -> Vector2d {
        Vector2d::new(self.x, self.y)
    }

    /// Unit vector pointing along the heading.
    pub fn heading_vec(&self) -> Vector2d {
        Vector2d::from_polar(1.0, self.heading)
    }

    /// Approximate equality, comparing headings by their shortest angular distance.
    pub fn epsilon_eq(&self, other: &Self) -> bool {
        epsilon_eq(self.x, other.x)
            && epsilon_eq(self.y, other.y)
            && epsilon_eq(angle::delta(self.heading, other.heading), 0.0)
    }
}

impl From<Pose2dDef> for Pose2d {
    fn from(def: Pose2dDef) -> Self {
        Self::new(def.x, def.y, def.heading)
    }
}

impl Twist2d {
    pub fn new(x: f64, y: f64, heading: f64) -> Self {
        Self { x, y, heading }
    }

    /// Create a twist from its translational and angular parts.
    pub fn from_parts(translation: Vector2d, heading: f64) -> Self {
        Self::new(translation.x, translation.y, heading)
    }

    /// The translational part of the twist.
    pub fn vec(&self) -> Vector2d {
        Vector2d::new(self.x, self.y)
    }

    pub fn epsilon_eq(&self, other: &Self) -> bool {
        epsilon_eq(self.x, other.x)
            && epsilon_eq(self.y, other.y)
            && epsilon_eq(self.heading, other.heading)
    }
}

impl Add for Twist2d {
    type Output = Twist2d;

    fn add(self, rhs: Twist2d) -> Twist2d {
        Twist2d::new(self.x + rhs.x, self.y + rhs.y, self.heading + rhs.heading)
    }
}

impl Sub for Twist2d {
    type Output = Twist2d;

    fn sub(self, rhs: Twist2d) -> Twist2d {
        Twist2d::new(self.x - rhs.x, self.y - rhs.y, self.heading - rhs.heading)
    }
}

impl Mul<f64> for Twist2d {
    type Output = Twist2d;

    fn mul(self, rhs: f64) -> Twist2d {
        Twist2d::new(self.x * rhs, self.y * rhs, self.heading * rhs)
    }
}

impl Neg for Twist2d {
    type Output = Twist2d;

    fn neg(self) -> Twist2d {
        self * -1.0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_pose_heading_normalised() {
        let pose = Pose2d::new(1.0, 2.0, 2.5 * PI);
        assert!(epsilon_eq(pose.heading(), 0.5 * PI));

        // Deserialising goes through the same normalisation
        let pose: Pose2d = serde_json::from_str(r#"{"x": 1.0, "y": 2.0, "heading": -7.0}"#)
            .unwrap();
        assert!(epsilon_eq(pose.heading(), -7.0 + 2.0 * PI));

        // Headings either side of the wrap compare equal
        assert!(Pose2d::new(0.0, 0.0, PI - 1e-9).epsilon_eq(&Pose2d::new(0.0, 0.0, -PI + 1e-9)));
    }

    #[test]
    fn test_twist_not_wrapped() {
        let twist = Twist2d::new(1.0, 0.0, 4.0 * PI) * 0.5;
        assert!(epsilon_eq(twist.heading, 2.0 * PI));

        let sum = twist + Twist2d::new(1.0, 1.0, 1.0) - Twist2d::new(0.5, 0.0, 0.0);
        assert!(sum.epsilon_eq(&Twist2d::new(1.0, 1.0, 2.0 * PI + 1.0)));
        assert!((-sum).epsilon_eq(&Twist2d::new(-1.0, -1.0, -2.0 * PI - 1.0)));
    }
}
