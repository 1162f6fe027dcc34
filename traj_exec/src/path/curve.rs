//! # Parametric curves
//!
//! All curves are parametrised by arc length `s` in `[0, length]`, so their first derivative is
//! the unit tangent and their second derivative is the curvature vector.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{LineSegment, QuinticSpline};
use crate::geom::{Vector2Ext, Vector2d};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The position part of a path segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ParametricCurve {
    Line(LineSegment),
    QuinticSpline(QuinticSpline),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ParametricCurve {
    pub fn length(&self) -> f64 {
        match self {
            ParametricCurve::Line(l) => l.length(),
            ParametricCurve::QuinticSpline(q) => q.length(),
        }
    }

    pub fn get(&self, s: f64) -> Vector2d {
        match self {
            ParametricCurve::Line(l) => l.get(s),
            ParametricCurve::QuinticSpline(q) => q.get(s),
        }
    }

    pub fn deriv(&self, s: f64) -> Vector2d {
        match self {
            ParametricCurve::Line(l) => l.deriv(s),
            ParametricCurve::QuinticSpline(q) => q.deriv(s),
        }
    }

    pub fn second_deriv(&self, s: f64) -> Vector2d {
        match self {
            ParametricCurve::Line(l) => l.second_deriv(s),
            ParametricCurve::QuinticSpline(q) => q.second_deriv(s),
        }
    }

    pub fn third_deriv(&self, s: f64) -> Vector2d {
        match self {
            ParametricCurve::Line(l) => l.third_deriv(s),
            ParametricCurve::QuinticSpline(q) => q.third_deriv(s),
        }
    }

    pub fn start(&self) -> Vector2d {
        self.get(0.0)
    }

    pub fn end(&self) -> Vector2d {
        self.get(self.length())
    }

    /// Direction of travel at `s`.
    pub fn tangent_angle(&self, s: f64) -> f64 {
        self.deriv(s).polar_angle()
    }

    /// Rate of change of the tangent angle with arc length, i.e. the signed curvature.
    pub fn tangent_angle_deriv(&self, s: f64) -> f64 {
        self.deriv(s).cross2(&self.second_deriv(s))
    }

    pub fn tangent_angle_second_deriv(&self, s: f64) -> f64 {
        self.deriv(s).cross2(&self.third_deriv(s))
    }
}

impl From<LineSegment> for ParametricCurve {
    fn from(line: LineSegment) -> Self {
        ParametricCurve::Line(line)
    }
}

impl From<QuinticSpline> for ParametricCurve {
    fn from(spline: QuinticSpline) -> Self {
        ParametricCurve::QuinticSpline(spline)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::path::Knot;
    use std::f64::consts::PI;

    #[test]
    fn test_tangent_angle_derivs() {
        let line: ParametricCurve = LineSegment::new(Vector2d::zeros(), Vector2d::new(0.0, 2.0)).into();
        assert!((line.tangent_angle(1.0) - PI / 2.0).abs() < 1e-9);
        assert_eq!(line.tangent_angle_deriv(1.0), 0.0);

        // Left turning spline has positive curvature somewhere in the middle
        let spline: ParametricCurve = QuinticSpline::new(
            Knot::new(Vector2d::zeros(), Vector2d::new(10.0, 0.0), Vector2d::zeros()),
            Knot::new(Vector2d::new(5.0, 5.0), Vector2d::new(0.0, 10.0), Vector2d::zeros())
        )
        .into();
        assert!(spline.tangent_angle_deriv(0.5 * spline.length()) > 0.0);

        // The arc length table is piecewise linear in s, so finite differences in s only agree
        // with the analytic curvature to the table's accuracy
        let h = 1e-4;
        for &frac in &[0.3, 0.5, 0.7] {
            let s = frac * spline.length();
            let numeric = (spline.tangent_angle(s + h) - spline.tangent_angle(s - h)) / (2.0 * h);
            assert!((numeric - spline.tangent_angle_deriv(s)).abs() < 5e-3);
        }
    }
}
