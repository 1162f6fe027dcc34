//! # Path module
//!
//! A path is the geometry of a manoeuvre with no notion of time: an ordered sequence of segments,
//! each a curve plus a heading interpolator, indexed by arc length from the start of the first
//! segment.
//!
//! Paths are continuous in pose, first derivative and positional second derivative at every
//! interior segment boundary. This is checked on construction and paths are immutable afterwards.
//! Paths are normally made with the [`PathBuilder`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod builder;
mod curve;
mod heading;
mod line;
mod polynomial;
mod segment;
mod spec;
mod spline;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use builder::PathBuilder;
pub use curve::ParametricCurve;
pub use heading::HeadingInterpolator;
pub use line::LineSegment;
pub use polynomial::QuinticPolynomial;
pub use segment::PathSegment;
pub use spec::{PathCommand, PathSpec};
pub use spline::{Knot, QuinticSpline};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use thiserror::Error;

use crate::geom::{Pose2d, Twist2d, Vector2Ext, Vector2d};
use util::maths::{epsilon_eq, EPSILON};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum number of Newton steps taken when projecting a point onto a path.
const MAX_PROJECTION_ITERS: usize = 200;

/// Number of coarse samples used to pick the starting guess for a global projection.
const PROJECTION_SAMPLES: usize = 100;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A continuous sequence of path segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PathSegment>", into = "Vec<PathSegment>")]
pub struct Path {
    segments: Vec<PathSegment>,
    length: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while building a path.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PathError {
    #[error("Attempted to add a path segment of zero length")]
    EmptyPathSegment,

    #[error("Path segment does not continue from the previous one at displacement {0}")]
    PathContinuityViolation(f64),

    #[error("A path must contain at least one segment")]
    EmptyPath,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Path {
    /// Create a path from its segments, checking each has a length and is continuous with the one
    /// before it.
    pub fn new(segments: Vec<PathSegment>) -> Result<Self, PathError> {
        if segments.is_empty() {
            return Err(PathError::EmptyPath);
        }

        let mut length = 0.0;
        for (i, segment) in segments.iter().enumerate() {
            if !(segment.length() >= EPSILON) {
                warn!("Path segment {} has zero length", i);
                return Err(PathError::EmptyPathSegment);
            }

            if i > 0 {
                let prev = &segments[i - 1];

                if !is_continuous(
                    &prev.end(),
                    &prev.end_deriv(),
                    &prev.end_second_deriv(),
                    segment
                ) {
                    warn!("Path segment {} is not continuous with segment {}", i, i - 1);
                    return Err(PathError::PathContinuityViolation(length));
                }
            }

            length += segment.length();
        }

        Ok(Self { segments, length })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// The segment containing displacement `s`, and the displacement within that segment.
    ///
    /// Displacements outside the path are clamped to its ends.
    pub fn segment(&self, s: f64) -> (&PathSegment, f64) {
        let first = &self.segments[0];
        if s <= 0.0 {
            return (first, 0.0);
        }

        let mut remaining = s;
        for segment in &self.segments {
            if remaining <= segment.length() {
                return (segment, remaining);
            }
            remaining -= segment.length();
        }

        let last = &self.segments[self.segments.len() - 1];
        (last, last.length())
    }

    pub fn get(&self, s: f64) -> Pose2d {
        let (segment, local_s) = self.segment(s);
        segment.get(local_s)
    }

    pub fn deriv(&self, s: f64) -> Twist2d {
        let (segment, local_s) = self.segment(s);
        segment.deriv(local_s)
    }

    pub fn second_deriv(&self, s: f64) -> Twist2d {
        let (segment, local_s) = self.segment(s);
        segment.second_deriv(local_s)
    }

    pub fn start(&self) -> Pose2d {
        self.get(0.0)
    }

    pub fn end(&self) -> Pose2d {
        self.get(self.length)
    }

    /// Project a point onto the path, starting Newton's method from the displacement `guess`.
    ///
    /// Returns the displacement of the closest point found, which is only a local minimum.
    pub fn project(&self, query: Vector2d, guess: f64) -> f64 {
        let mut s = guess.max(0.0).min(self.length);

        for _ in 0..MAX_PROJECTION_ITERS {
            let deriv = self.deriv(s).vec();
            let ds = (query - self.get(s).position()).dot(&deriv);

            if epsilon_eq(ds, 0.0) {
                break;
            }

            s = (s + ds).max(0.0).min(self.length);

            if s <= 0.0 || s >= self.length {
                break;
            }
        }

        s
    }

    /// Project a point onto the path, searching the whole path for the best starting guess.
    pub fn project_nearest(&self, query: Vector2d) -> f64 {
        let guess = (0..=PROJECTION_SAMPLES)
            .map(|i| self.length * i as f64 / PROJECTION_SAMPLES as f64)
            .map(|s| (s, (self.get(s).position() - query).norm_squared()))
            .fold((0.0, std::f64::INFINITY), |best, sample| {
                if sample.1 < best.1 { sample } else { best }
            })
            .0;

        self.project(query, guess)
    }
}

impl TryFrom<Vec<PathSegment>> for Path {
    type Error = PathError;

    fn try_from(segments: Vec<PathSegment>) -> Result<Self, Self::Error> {
        Path::new(segments)
    }
}

impl From<Path> for Vec<PathSegment> {
    fn from(path: Path) -> Self {
        path.segments
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Returns true if `next` starts where the given end state finishes.
///
/// Compares the pose, the full first derivative (including heading rate) and the positional
/// second derivative.
pub(crate) fn is_continuous(
    end: &Pose2d,
    end_deriv: &Twist2d,
    end_second_deriv: &Twist2d,
    next: &PathSegment
) -> bool {
    end.epsilon_eq(&next.start())
        && end_deriv.epsilon_eq(&next.start_deriv())
        && end_second_deriv.vec().epsilon_eq(&next.start_second_deriv().vec())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    fn test_path() -> Path {
        PathBuilder::new(Pose2d::default(), 0.0)
            .line_to(Vector2d::new(10.0, 0.0))
            .and_then(|b| b.spline_to(Vector2d::new(20.0, 10.0), PI / 2.0))
            .and_then(|b| b.line_to(Vector2d::new(20.0, 15.0)))
            .and_then(|b| b.build())
            .unwrap()
    }

    #[test]
    fn test_continuity_and_length() {
        let path = test_path();

        // Length is the sum of segment lengths
        let sum: f64 = path.segments().iter().map(|s| s.length()).sum();
        assert!(epsilon_eq(path.length(), sum));

        // Every interior boundary is continuous
        for pair in path.segments().windows(2) {
            assert!(is_continuous(
                &pair[0].end(),
                &pair[0].end_deriv(),
                &pair[0].end_second_deriv(),
                &pair[1]
            ));
        }

        // Pose varies continuously with displacement
        let n = 2000;
        for i in 0..n {
            let s0 = path.length() * i as f64 / n as f64;
            let s1 = path.length() * (i + 1) as f64 / n as f64;
            let step = (path.get(s1).position() - path.get(s0).position()).norm();
            assert!(step <= 1.1 * (s1 - s0));
        }

        assert!(path.end().epsilon_eq(&Pose2d::new(20.0, 15.0, PI / 2.0)));
    }

    #[test]
    fn test_segment_lookup_clamps() {
        let path = test_path();

        assert!(path.get(-1.0).epsilon_eq(&path.start()));
        assert!(path.get(path.length() + 1.0).epsilon_eq(&path.end()));

        let (segment, local_s) = path.segment(12.0);
        assert!(epsilon_eq(local_s, 2.0));
        assert_eq!(segment, &path.segments()[1]);
    }

    #[test]
    fn test_project() {
        let path = test_path();

        // A point just off the first line
        let s = path.project(Vector2d::new(4.0, 0.5), 1.0);
        assert!(epsilon_eq(s, 4.0));

        // A point near the final line, found from anywhere
        let s = path.project_nearest(Vector2d::new(19.0, 13.0));
        assert!(path.get(s).position().epsilon_eq(&Vector2d::new(20.0, 13.0)));
    }

    #[test]
    fn test_empty_path() {
        assert_eq!(Path::new(vec![]), Err(PathError::EmptyPath));
    }

    #[test]
    fn test_zero_length_segment_rejected() {
        let point = PathSegment::new(
            LineSegment::new(Vector2d::new(1.0, 1.0), Vector2d::new(1.0, 1.0)).into(),
            HeadingInterpolator::Constant { heading: 0.0 }
        );
        assert_eq!(Path::new(vec![point]), Err(PathError::EmptyPathSegment));

        let json = r#"[
            {"curve": {"type": "Line", "start": [1.0, 1.0], "end": [1.0, 1.0]},
             "interpolator": {"type": "Constant", "heading": 0.0}}
        ]"#;
        assert!(serde_json::from_str::<Path>(json).is_err());
    }

    #[test]
    fn test_discontinuous_segments_rejected() {
        let a = PathSegment::new(
            LineSegment::new(Vector2d::zeros(), Vector2d::new(1.0, 0.0)).into(),
            HeadingInterpolator::Constant { heading: 0.0 }
        );
        let b = PathSegment::new(
            LineSegment::new(Vector2d::new(1.0, 0.0), Vector2d::new(1.0, 1.0)).into(),
            HeadingInterpolator::Constant { heading: 0.0 }
        );

        assert_eq!(Path::new(vec![a, b]), Err(PathError::PathContinuityViolation(1.0)));
    }

    #[test]
    fn test_json_round_trip() {
        let path = test_path();

        let json = serde_json::to_string(&path).unwrap();
        let back: Path = serde_json::from_str(&json).unwrap();

        assert!(epsilon_eq(back.length(), path.length()));
        for i in 0..=10 {
            let s = path.length() * i as f64 / 10.0;
            assert!(back.get(s).epsilon_eq(&path.get(s)));
        }

        // Deserialising goes through the continuity check
        let bad = r#"[
            {"curve": {"type": "Line", "start": [0.0, 0.0], "end": [1.0, 0.0]},
             "interpolator": {"type": "Constant", "heading": 0.0}},
            {"curve": {"type": "Line", "start": [2.0, 0.0], "end": [3.0, 0.0]},
             "interpolator": {"type": "Constant", "heading": 0.0}}
        ]"#;
        assert!(serde_json::from_str::<Path>(bad).is_err());
    }
}
