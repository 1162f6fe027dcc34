//! # Quintic splines
//!
//! A quintic spline is a pair of quintic polynomials, one per axis, over an internal parameter
//! `t` in `[0, 1]`. The polynomials are fitted to the [`Knot`]s at each end.
//!
//! Positions along a path are indexed by arc length, so on construction the spline builds a table
//! mapping arc length to `t`. The table is built by recursively halving the parameter interval
//! until each piece is short and of near constant curvature, and measuring each piece as the
//! circular arc through its start, midpoint and end.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::QuinticPolynomial;
use crate::geom::{Vector2Ext, Vector2d};
use util::maths::EPSILON;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Largest curvature change allowed across one piece of the arc length table.
const MAX_DELTA_K: f64 = 0.01;

/// Largest length of one piece of the arc length table.
const MAX_SEGMENT_LENGTH: f64 = 0.25;

/// Subdivision stops at this depth whatever the piece looks like.
const MAX_DEPTH: usize = 30;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Boundary condition of a quintic spline.
///
/// The derivatives are with respect to the spline's internal parameter, so their magnitude sets how
/// far the end's direction carries into the spline.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Knot {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub d2x: f64,
    pub d2y: f64,
}

/// A quintic spline parametrised by arc length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "QuinticSplineDef", into = "QuinticSplineDef")]
pub struct QuinticSpline {
    start: Knot,
    end: Knot,

    x: QuinticPolynomial,
    y: QuinticPolynomial,

    length: f64,

    /// Arc length at each entry of the table
    s_samples: Vec<f64>,

    /// Internal parameter at each entry of the table
    t_samples: Vec<f64>,
}

/// Serialised form of a spline, just its knots.
#[derive(Serialize, Deserialize)]
struct QuinticSplineDef {
    start: Knot,
    end: Knot,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Knot {
    pub fn new(position: Vector2d, deriv: Vector2d, second_deriv: Vector2d) -> Self {
        Self {
            x: position.x,
            y: position.y,
            dx: deriv.x,
            dy: deriv.y,
            d2x: second_deriv.x,
            d2y: second_deriv.y,
        }
    }

    pub fn position(&self) -> Vector2d {
        Vector2d::new(self.x, self.y)
    }
}

impl QuinticSpline {
    /// Fit a spline between two knots and build its arc length table.
    pub fn new(start: Knot, end: Knot) -> Self {
        let mut spline = Self {
            start,
            end,
            x: QuinticPolynomial::new(start.x, start.dx, start.d2x, end.x, end.dx, end.d2x),
            y: QuinticPolynomial::new(start.y, start.dy, start.d2y, end.y, end.dy, end.d2y),
            length: 0.0,
            s_samples: vec![0.0],
            t_samples: vec![0.0],
        };

        let v_lo = spline.internal_get(0.0);
        let v_hi = spline.internal_get(1.0);
        spline.parametrise(0.0, 1.0, v_lo, v_hi, 0);

        spline
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn get(&self, s: f64) -> Vector2d {
        self.internal_get(self.reparam(s))
    }

    pub fn deriv(&self, s: f64) -> Vector2d {
        self.deriv_at(self.reparam(s))
    }

    pub fn second_deriv(&self, s: f64) -> Vector2d {
        self.second_deriv_at(self.reparam(s))
    }

    pub fn third_deriv(&self, s: f64) -> Vector2d {
        self.third_deriv_at(self.reparam(s))
    }

    /// Arc length derivative at an internal parameter value.
    fn deriv_at(&self, t: f64) -> Vector2d {
        self.internal_deriv(t) * self.param_deriv(t)
    }

    fn second_deriv_at(&self, t: f64) -> Vector2d {
        let p = self.param_deriv(t);

        self.internal_second_deriv(t) * (p * p)
            + self.internal_deriv(t) * self.param_second_deriv(t)
    }

    fn third_deriv_at(&self, t: f64) -> Vector2d {
        let p = self.param_deriv(t);
        let dp = self.param_second_deriv(t);

        self.internal_third_deriv(t) * (p * p * p)
            + self.internal_second_deriv(t) * (3.0 * p * dp)
            + self.internal_deriv(t) * self.param_third_deriv(t)
    }

    fn internal_get(&self, t: f64) -> Vector2d {
        Vector2d::new(self.x.get(t), self.y.get(t))
    }

    fn internal_deriv(&self, t: f64) -> Vector2d {
        Vector2d::new(self.x.deriv(t), self.y.deriv(t))
    }

    fn internal_second_deriv(&self, t: f64) -> Vector2d {
        Vector2d::new(self.x.second_deriv(t), self.y.second_deriv(t))
    }

    fn internal_third_deriv(&self, t: f64) -> Vector2d {
        Vector2d::new(self.x.third_deriv(t), self.y.third_deriv(t))
    }

    /// dt/ds
    fn param_deriv(&self, t: f64) -> f64 {
        1.0 / self.internal_deriv(t).norm()
    }

    /// d2t/ds2
    fn param_second_deriv(&self, t: f64) -> f64 {
        let deriv = self.internal_deriv(t);
        let second_deriv = self.internal_second_deriv(t);
        let norm_sq = deriv.norm_squared();

        -deriv.dot(&second_deriv) / (norm_sq * norm_sq)
    }

    /// d3t/ds3
    fn param_third_deriv(&self, t: f64) -> f64 {
        let deriv = self.internal_deriv(t);
        let second_deriv = self.internal_second_deriv(t);
        let third_deriv = self.internal_third_deriv(t);

        let norm_sq = deriv.norm_squared();
        let deriv_dot_second = deriv.dot(&second_deriv);

        4.0 * deriv_dot_second * deriv_dot_second / norm_sq.powf(3.5)
            - (second_deriv.norm_squared() + deriv.dot(&third_deriv)) / norm_sq.powf(2.5)
    }

    /// Unsigned curvature of the spline at an internal parameter value.
    fn internal_curvature(&self, t: f64) -> f64 {
        let deriv = self.internal_deriv(t);
        let second_deriv = self.internal_second_deriv(t);

        deriv.cross2(&second_deriv).abs() / deriv.norm().powi(3)
    }

    fn parametrise(&mut self, t_lo: f64, t_hi: f64, v_lo: Vector2d, v_hi: Vector2d, depth: usize) {
        let t_mid = 0.5 * (t_lo + t_hi);
        let v_mid = self.internal_get(t_mid);

        let delta_k = (self.internal_curvature(t_lo) - self.internal_curvature(t_hi)).abs();
        let segment_length = approx_length(v_lo, v_mid, v_hi);

        if depth < MAX_DEPTH && (delta_k > MAX_DELTA_K || segment_length > MAX_SEGMENT_LENGTH) {
            self.parametrise(t_lo, t_mid, v_lo, v_mid, depth + 1);
            self.parametrise(t_mid, t_hi, v_mid, v_hi, depth + 1);
        }
        else {
            self.length += segment_length;
            self.s_samples.push(self.length);
            self.t_samples.push(t_hi);
        }
    }

    /// Internal parameter for an arc length, interpolated from the table.
    fn reparam(&self, s: f64) -> f64 {
        if s <= 0.0 {
            return 0.0;
        }
        if s >= self.length {
            return 1.0;
        }

        // First entry at or beyond s, never the first entry since s > 0
        let hi = self.s_samples.partition_point(|&sample| sample < s);
        let lo = hi - 1;

        let s_lo = self.s_samples[lo];
        let s_hi = self.s_samples[hi];
        let t_lo = self.t_samples[lo];
        let t_hi = self.t_samples[hi];

        t_lo + (s - s_lo) * (t_hi - t_lo) / (s_hi - s_lo)
    }
}

impl From<QuinticSplineDef> for QuinticSpline {
    fn from(def: QuinticSplineDef) -> Self {
        Self::new(def.start, def.end)
    }
}

impl From<QuinticSpline> for QuinticSplineDef {
    fn from(spline: QuinticSpline) -> Self {
        Self {
            start: spline.start,
            end: spline.end,
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Length of the circular arc through three points, or the chord if they're collinear.
fn approx_length(v1: Vector2d, v2: Vector2d, v3: Vector2d) -> f64 {
    let w1 = (v2 - v1) * 2.0;
    let w2 = (v2 - v3) * 2.0;
    let det = w1.cross2(&w2);
    let chord = (v3 - v1).norm();

    if det.abs() < EPSILON {
        return chord;
    }

    let x1 = v1.norm_squared();
    let x2 = v2.norm_squared();
    let x3 = v3.norm_squared();
    let y1 = x2 - x1;
    let y2 = x2 - x3;

    let centre = Vector2d::new(y1 * w2.y - y2 * w1.y, y2 * w1.x - y1 * w2.x) / det;
    let radius = (centre - v1).norm();

    2.0 * radius * (chord / (2.0 * radius)).min(1.0).asin()
}
