//! # Heading interpolators
//!
//! A heading interpolator gives the robot's heading along a segment, independently of the
//! segment's curve. All derivatives are with respect to arc length.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{ParametricCurve, QuinticPolynomial};
use crate::geom::angle;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How the heading changes along a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HeadingInterpolator {
    /// Follow the curve's tangent, plus a fixed offset (pi to drive backwards).
    Tangent { offset: f64 },

    /// Hold one heading for the whole segment.
    Constant { heading: f64 },

    /// Rotate at a constant rate from `start_heading` by `angle`.
    Linear { start_heading: f64, angle: f64 },

    /// Blend from `start_heading` using a quintic in the segment's normalised arc length.
    Spline {
        start_heading: f64,
        poly: QuinticPolynomial,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl HeadingInterpolator {
    /// Tangent interpolator which starts at `start_heading` on the given curve.
    pub fn tangent(curve: &ParametricCurve, start_heading: f64) -> Self {
        HeadingInterpolator::Tangent {
            offset: angle::delta(curve.tangent_angle(0.0), start_heading),
        }
    }

    /// Linear interpolator taking the shortest rotation between the headings.
    pub fn linear(start_heading: f64, end_heading: f64) -> Self {
        HeadingInterpolator::Linear {
            start_heading,
            angle: angle::delta(start_heading, end_heading),
        }
    }

    /// Spline interpolator between two headings on the given curve.
    ///
    /// `start_derivs` and `end_derivs` are the heading's (rate, acceleration) with respect to arc
    /// length at each end. Where they are not given the curve's tangent angle derivatives are used,
    /// so the heading blends in and out of tangent following.
    pub fn spline(
        curve: &ParametricCurve,
        start_heading: f64,
        end_heading: f64,
        start_derivs: Option<(f64, f64)>,
        end_derivs: Option<(f64, f64)>
    ) -> Self {
        let len = curve.length();

        let (start_deriv, start_second_deriv) = start_derivs.unwrap_or_else(|| {
            (curve.tangent_angle_deriv(0.0), curve.tangent_angle_second_deriv(0.0))
        });
        let (end_deriv, end_second_deriv) = end_derivs.unwrap_or_else(|| {
            (curve.tangent_angle_deriv(len), curve.tangent_angle_second_deriv(len))
        });

        // The polynomial runs over the normalised arc length u = s/len
        let poly = QuinticPolynomial::new(
            0.0,
            start_deriv * len,
            start_second_deriv * len * len,
            angle::delta(start_heading, end_heading),
            end_deriv * len,
            end_second_deriv * len * len
        );

        HeadingInterpolator::Spline {
            start_heading,
            poly,
        }
    }

    /// Heading at `s`, normalised.
    pub fn get(&self, curve: &ParametricCurve, s: f64) -> f64 {
        match self {
            HeadingInterpolator::Tangent { offset } => angle::norm(offset + curve.tangent_angle(s)),
            HeadingInterpolator::Constant { heading } => angle::norm(*heading),
            HeadingInterpolator::Linear {
                start_heading,
                angle: sweep,
            } => angle::norm(start_heading + s / curve.length() * sweep),
            HeadingInterpolator::Spline {
                start_heading,
                poly,
            } => angle::norm(start_heading + poly.get(s / curve.length())),
        }
    }

    pub fn deriv(&self, curve: &ParametricCurve, s: f64) -> f64 {
        match self {
            HeadingInterpolator::Tangent { .. } => curve.tangent_angle_deriv(s),
            HeadingInterpolator::Constant { .. } => 0.0,
            HeadingInterpolator::Linear { angle: sweep, .. } => sweep / curve.length(),
            HeadingInterpolator::Spline { poly, .. } => {
                let len = curve.length();
                poly.deriv(s / len) / len
            }
        }
    }

    pub fn second_deriv(&self, curve: &ParametricCurve, s: f64) -> f64 {
        match self {
            HeadingInterpolator::Tangent { .. } => curve.tangent_angle_second_deriv(s),
            HeadingInterpolator::Constant { .. } => 0.0,
            HeadingInterpolator::Linear { .. } => 0.0,
            HeadingInterpolator::Spline { poly, .. } => {
                let len = curve.length();
                poly.second_deriv(s / len) / (len * len)
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::Vector2d;
    use crate::path::LineSegment;
    use std::f64::consts::PI;
    use util::maths::epsilon_eq;

    fn line() -> ParametricCurve {
        LineSegment::new(Vector2d::zeros(), Vector2d::new(4.0, 0.0)).into()
    }

    #[test]
    fn test_tangent_and_constant() {
        let curve = line();

        // Driving backwards along the line
        let interp = HeadingInterpolator::tangent(&curve, PI);
        assert!(epsilon_eq(angle::delta(interp.get(&curve, 1.0), PI), 0.0));
        assert!(epsilon_eq(angle::delta(interp.get(&curve, 4.0), PI), 0.0));
        assert!(epsilon_eq(interp.deriv(&curve, 2.0), 0.0));

        let interp = HeadingInterpolator::Constant { heading: 1.0 };
        assert!(epsilon_eq(interp.get(&curve, 3.0), 1.0));
        assert!(epsilon_eq(interp.deriv(&curve, 3.0), 0.0));
    }

    #[test]
    fn test_linear_takes_short_way() {
        let curve = line();
        let interp = HeadingInterpolator::linear(PI - 0.1, -PI + 0.1);

        assert!(epsilon_eq(interp.get(&curve, 0.0), PI - 0.1));
        assert!(epsilon_eq(interp.get(&curve, 1.0), PI - 0.05));
        assert!(epsilon_eq(interp.get(&curve, 4.0), -PI + 0.1));
        assert!(epsilon_eq(interp.deriv(&curve, 1.0), 0.2 / 4.0));
    }

    #[test]
    fn test_spline_boundary_values() {
        let curve = line();
        let interp = HeadingInterpolator::spline(&curve, 0.0, PI / 2.0, Some((0.1, 0.0)), None);

        assert!(epsilon_eq(interp.get(&curve, 0.0), 0.0));
        assert!(epsilon_eq(interp.deriv(&curve, 0.0), 0.1));
        assert!(epsilon_eq(interp.second_deriv(&curve, 0.0), 0.0));

        // End blends into the line's tangent heading rate of zero
        assert!(epsilon_eq(interp.get(&curve, 4.0), PI / 2.0));
        assert!(epsilon_eq(interp.deriv(&curve, 4.0), 0.0));
        assert!(epsilon_eq(interp.second_deriv(&curve, 4.0), 0.0));
    }
}
