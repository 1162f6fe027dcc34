//! # 2D vectors
//!
//! Plain `nalgebra` vectors are used for positions and directions. This module adds the few planar
//! operations `nalgebra` doesn't name the way the rest of the library needs them.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;

// Internal
use util::maths::epsilon_eq;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A 2D vector of reals.
pub type Vector2d = Vector2<f64>;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Planar operations on [`Vector2d`].
pub trait Vector2Ext {
    /// Build a vector from its polar coordinates.
    fn from_polar(radius: f64, angle: f64) -> Self;

    /// The z component of the cross product of `self` and `other` extended into 3D.
    fn cross2(&self, other: &Self) -> f64;

    /// Rotate the vector anticlockwise by `angle` radians.
    fn rotated(&self, angle: f64) -> Self;

    /// The angle of the vector to the positive x axis, in (-pi, pi].
    fn polar_angle(&self) -> f64;

    /// Component-wise approximate equality.
    fn epsilon_eq(&self, other: &Self) -> bool;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Vector2Ext for Vector2d {
    fn from_polar(radius: f64, angle: f64) -> Self {
        Vector2d::new(radius * angle.cos(), radius * angle.sin())
    }

    fn cross2(&self, other: &Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    fn rotated(&self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Vector2d::new(
            cos * self.x - sin * self.y,
            sin * self.x + cos * self.y
        )
    }

    fn polar_angle(&self) -> f64 {
        self.y.atan2(self.x)
    }

    fn epsilon_eq(&self, other: &Self) -> bool {
        epsilon_eq(self.x, other.x) && epsilon_eq(self.y, other.y)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_planar_ops() {
        let v = Vector2d::from_polar(2.0, PI / 2.0);
        assert!(v.epsilon_eq(&Vector2d::new(0.0, 2.0)));
        assert!(epsilon_eq(v.polar_angle(), PI / 2.0));

        let r = Vector2d::new(1.0, 0.0).rotated(PI / 2.0);
        assert!(r.epsilon_eq(&Vector2d::new(0.0, 1.0)));

        assert!(epsilon_eq(Vector2d::new(1.0, 0.0).cross2(&Vector2d::new(0.0, 1.0)), 1.0));
        assert!(epsilon_eq(Vector2d::new(0.0, 1.0).cross2(&Vector2d::new(1.0, 0.0)), -1.0));
        assert!(epsilon_eq(Vector2d::new(3.0, 4.0).norm(), 5.0));
    }
}
