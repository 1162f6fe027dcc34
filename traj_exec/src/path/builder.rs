//! # Path builder
//!
//! Paths are built by appending segments one at a time. The builder tracks the state at the end of
//! the last segment and uses it as the start of the next, so consecutive segments join smoothly.
//!
//! Every append consumes the builder and hands it back, so a path reads as a chain:
//!
//! ```ignore
//! let path = PathBuilder::new(Pose2d::default(), 0.0)
//!     .line_to(Vector2d::new(10.0, 0.0))?
//!     .spline_to(Vector2d::new(20.0, 10.0), FRAC_PI_2)?
//!     .build()?;
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;

use super::{
    is_continuous, HeadingInterpolator, Knot, LineSegment, ParametricCurve, Path, PathError,
    PathSegment, QuinticSpline,
};
use crate::geom::{Pose2d, Twist2d, Vector2Ext, Vector2d};
use util::maths::EPSILON;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Incrementally builds a [`Path`].
#[derive(Debug, Clone)]
pub struct PathBuilder {
    segments: Vec<PathSegment>,

    /// State at the end of the path so far
    end: EndState,

    /// Total length of the segments so far
    length: f64,
}

/// The state the next segment must continue from.
#[derive(Debug, Clone)]
struct EndState {
    pose: Pose2d,

    /// Direction of travel
    tangent: f64,

    /// Arc length derivative of the pose
    deriv: Twist2d,

    /// Arc length second derivative of the pose
    second_deriv: Twist2d,

    /// Heading rate and acceleration, once a segment or path has given them
    heading_derivs: Option<(f64, f64)>,

    /// Whether the next segment is checked against this state. A bare pose gives no derivatives to
    /// check against.
    checked: bool,
}

/// Which heading interpolator a new segment uses.
enum HeadingKind {
    Tangent,
    Constant,
    Linear(f64),
    Spline(f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathBuilder {
    /// Start a path at a pose, travelling in the direction `tangent`.
    pub fn new(start: Pose2d, tangent: f64) -> Self {
        Self {
            segments: Vec::new(),
            end: EndState {
                pose: start,
                tangent,
                deriv: Twist2d::default(),
                second_deriv: Twist2d::default(),
                heading_derivs: None,
                checked: false,
            },
            length: 0.0,
        }
    }

    /// Start a path at a pose, travelling forwards along its heading or backwards if `reversed`.
    pub fn from_pose(start: Pose2d, reversed: bool) -> Self {
        let tangent = if reversed {
            start.heading() + std::f64::consts::PI
        }
        else {
            start.heading()
        };

        Self::new(start, tangent)
    }

    /// Start a path which continues smoothly from an existing path at displacement `s`.
    pub fn from_path(path: &Path, s: f64) -> Self {
        let deriv = path.deriv(s);
        let second_deriv = path.second_deriv(s);

        Self {
            segments: Vec::new(),
            end: EndState {
                pose: path.get(s),
                tangent: deriv.vec().polar_angle(),
                deriv,
                second_deriv,
                heading_derivs: Some((deriv.heading, second_deriv.heading)),
                checked: true,
            },
            length: 0.0,
        }
    }

    /// Add a line to `end_position`, with the heading following the line.
    pub fn line_to(self, end_position: Vector2d) -> Result<Self, PathError> {
        self.add_line(end_position, HeadingKind::Tangent)
    }

    /// Add a line to `end_position`, holding the current heading.
    pub fn line_to_constant_heading(self, end_position: Vector2d) -> Result<Self, PathError> {
        self.add_line(end_position, HeadingKind::Constant)
    }

    /// Add a line to the position of `end_pose`, turning at a constant rate to its heading.
    pub fn line_to_linear_heading(self, end_pose: Pose2d) -> Result<Self, PathError> {
        self.add_line(end_pose.position(), HeadingKind::Linear(end_pose.heading()))
    }

    /// Add a line to the position of `end_pose`, blending smoothly to its heading.
    pub fn line_to_spline_heading(self, end_pose: Pose2d) -> Result<Self, PathError> {
        self.add_line(end_pose.position(), HeadingKind::Spline(end_pose.heading()))
    }

    /// Translate to `end_position` without turning.
    pub fn strafe_to(self, end_position: Vector2d) -> Result<Self, PathError> {
        self.line_to_constant_heading(end_position)
    }

    /// Move `distance` along the current heading.
    pub fn forward(self, distance: f64) -> Result<Self, PathError> {
        let end = self.end.pose.position() + self.end.pose.heading_vec() * distance;
        self.line_to_constant_heading(end)
    }

    /// Move `distance` against the current heading.
    pub fn back(self, distance: f64) -> Result<Self, PathError> {
        self.forward(-distance)
    }

    /// Move `distance` to the left of the current heading.
    pub fn strafe_left(self, distance: f64) -> Result<Self, PathError> {
        let left = self.end.pose.heading_vec().rotated(std::f64::consts::FRAC_PI_2);
        let end = self.end.pose.position() + left * distance;
        self.line_to_constant_heading(end)
    }

    /// Move `distance` to the right of the current heading.
    pub fn strafe_right(self, distance: f64) -> Result<Self, PathError> {
        self.strafe_left(-distance)
    }

    /// Add a spline to `end_position`, arriving travelling along `end_tangent`, with the heading
    /// following the spline.
    pub fn spline_to(self, end_position: Vector2d, end_tangent: f64) -> Result<Self, PathError> {
        self.add_spline(end_position, end_tangent, HeadingKind::Tangent)
    }

    /// Add a spline to `end_position`, holding the current heading.
    pub fn spline_to_constant_heading(
        self,
        end_position: Vector2d,
        end_tangent: f64
    ) -> Result<Self, PathError> {
        self.add_spline(end_position, end_tangent, HeadingKind::Constant)
    }

    /// Add a spline to the position of `end_pose`, turning at a constant rate to its heading.
    pub fn spline_to_linear_heading(
        self,
        end_pose: Pose2d,
        end_tangent: f64
    ) -> Result<Self, PathError> {
        self.add_spline(
            end_pose.position(),
            end_tangent,
            HeadingKind::Linear(end_pose.heading())
        )
    }

    /// Add a spline to the position of `end_pose`, blending smoothly to its heading.
    pub fn spline_to_spline_heading(
        self,
        end_pose: Pose2d,
        end_tangent: f64
    ) -> Result<Self, PathError> {
        self.add_spline(
            end_pose.position(),
            end_tangent,
            HeadingKind::Spline(end_pose.heading())
        )
    }

    /// Finish building the path.
    pub fn build(self) -> Result<Path, PathError> {
        Path::new(self.segments)
    }

    fn add_line(self, end_position: Vector2d, heading: HeadingKind) -> Result<Self, PathError> {
        let start_position = self.end.pose.position();
        if (end_position - start_position).norm() < EPSILON {
            return Err(PathError::EmptyPathSegment);
        }

        let curve = ParametricCurve::from(LineSegment::new(start_position, end_position));
        self.add_segment(curve, heading)
    }

    fn add_spline(
        self,
        end_position: Vector2d,
        end_tangent: f64,
        heading: HeadingKind
    ) -> Result<Self, PathError> {
        let start_position = self.end.pose.position();

        // Derivative magnitude at both knots is the chord length
        let deriv_mag = (end_position - start_position).norm();
        if deriv_mag < EPSILON {
            return Err(PathError::EmptyPathSegment);
        }

        // Convert the arc length derivatives at the end of the path to knot derivatives. A bare
        // pose only gives the direction of travel.
        let start_knot = if self.end.checked {
            Knot::new(
                start_position,
                self.end.deriv.vec() * deriv_mag,
                self.end.second_deriv.vec() * (deriv_mag * deriv_mag)
            )
        }
        else {
            Knot::new(
                start_position,
                Vector2d::from_polar(deriv_mag, self.end.tangent),
                Vector2d::zeros()
            )
        };
        let end_knot = Knot::new(
            end_position,
            Vector2d::from_polar(deriv_mag, end_tangent),
            Vector2d::zeros()
        );

        let curve = ParametricCurve::from(QuinticSpline::new(start_knot, end_knot));
        self.add_segment(curve, heading)
    }

    fn add_segment(mut self, curve: ParametricCurve, heading: HeadingKind) -> Result<Self, PathError> {
        let start_heading = self.end.pose.heading();

        let interpolator = match heading {
            HeadingKind::Tangent => HeadingInterpolator::tangent(&curve, start_heading),
            HeadingKind::Constant => HeadingInterpolator::Constant {
                heading: start_heading,
            },
            HeadingKind::Linear(end_heading) => {
                HeadingInterpolator::linear(start_heading, end_heading)
            }
            HeadingKind::Spline(end_heading) => HeadingInterpolator::spline(
                &curve,
                start_heading,
                end_heading,
                self.end.heading_derivs,
                None
            ),
        };

        let segment = PathSegment::new(curve, interpolator);

        if self.end.checked
            && !is_continuous(
                &self.end.pose,
                &self.end.deriv,
                &self.end.second_deriv,
                &segment
            )
        {
            warn!(
                "Segment {} does not continue from the end of the path at displacement {}",
                self.segments.len(),
                self.length
            );
            return Err(PathError::PathContinuityViolation(self.length));
        }

        let end_deriv = segment.end_deriv();
        let end_second_deriv = segment.end_second_deriv();

        self.end = EndState {
            pose: segment.end(),
            tangent: segment.end_tangent_angle(),
            deriv: end_deriv,
            second_deriv: end_second_deriv,
            heading_derivs: Some((end_deriv.heading, end_second_deriv.heading)),
            checked: true,
        };
        self.length += segment.length();
        self.segments.push(segment);

        Ok(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};
    use util::maths::epsilon_eq;

    #[test]
    fn test_line_to_round_trip() {
        let start = Pose2d::new(1.0, 2.0, 0.3);
        let end = Vector2d::new(4.0, 6.0);
        let path = PathBuilder::new(start, 0.3)
            .line_to(end)
            .and_then(|b| b.build())
            .unwrap();

        assert!(epsilon_eq(path.length(), 5.0));
        assert!(path.start().position().epsilon_eq(&start.position()));
        assert!(path.end().position().epsilon_eq(&end));

        // Heading starts at the start pose's heading and holds its offset from the tangent
        assert!(epsilon_eq(path.start().heading(), 0.3));
        assert!(epsilon_eq(path.end().heading(), 0.3));
    }

    #[test]
    fn test_relative_moves() {
        let path = PathBuilder::from_pose(Pose2d::new(0.0, 0.0, FRAC_PI_2), false)
            .forward(2.0)
            .and_then(|b| b.strafe_right(1.0))
            .and_then(|b| b.back(1.0))
            .and_then(|b| b.strafe_left(1.0))
            .and_then(|b| b.build());

        // Strafing after forward breaks first derivative continuity
        assert_eq!(path.unwrap_err(), PathError::PathContinuityViolation(2.0));

        let b = PathBuilder::from_pose(Pose2d::new(0.0, 0.0, FRAC_PI_2), false)
            .strafe_right(1.0)
            .unwrap();
        let path = b.build().unwrap();
        assert!(path.end().epsilon_eq(&Pose2d::new(1.0, 0.0, FRAC_PI_2)));
    }

    #[test]
    fn test_reversed_start() {
        let path = PathBuilder::from_pose(Pose2d::new(0.0, 0.0, 0.0), true)
            .line_to(Vector2d::new(-3.0, 0.0))
            .and_then(|b| b.spline_to(Vector2d::new(-6.0, -3.0), -FRAC_PI_2))
            .and_then(|b| b.build())
            .unwrap();

        // The robot faces away from the direction of travel the whole way
        assert!(epsilon_eq(path.get(1.0).heading(), 0.0));
        assert!(path.end().epsilon_eq(&Pose2d::new(-6.0, -3.0, FRAC_PI_2)));
    }

    #[test]
    fn test_empty_segment() {
        let err = PathBuilder::new(Pose2d::default(), 0.0)
            .line_to(Vector2d::new(0.0, 0.0))
            .unwrap_err();
        assert_eq!(err, PathError::EmptyPathSegment);

        let err = PathBuilder::new(Pose2d::default(), 0.0)
            .spline_to(Vector2d::new(0.0, 0.0), 1.0)
            .unwrap_err();
        assert_eq!(err, PathError::EmptyPathSegment);

        let err = PathBuilder::new(Pose2d::default(), 0.0).build().unwrap_err();
        assert_eq!(err, PathError::EmptyPath);
    }

    #[test]
    fn test_linear_then_tangent_violates_continuity() {
        let err = PathBuilder::new(Pose2d::default(), 0.0)
            .line_to_linear_heading(Pose2d::new(5.0, 0.0, FRAC_PI_2))
            .and_then(|b| b.line_to(Vector2d::new(10.0, 0.0)))
            .unwrap_err();

        assert_eq!(err, PathError::PathContinuityViolation(5.0));
    }

    #[test]
    fn test_spline_heading_follows_linear_heading() {
        let path = PathBuilder::new(Pose2d::default(), 0.0)
            .line_to_linear_heading(Pose2d::new(5.0, 0.0, FRAC_PI_2))
            .and_then(|b| b.spline_to_spline_heading(Pose2d::new(10.0, 5.0, PI), FRAC_PI_2))
            .and_then(|b| b.spline_to(Vector2d::new(5.0, 10.0), PI))
            .and_then(|b| b.build())
            .unwrap();

        // The final tangent segment keeps the quarter turn offset the spline heading ended with
        assert!(path.get(path.segments()[0].length() + 0.1).heading() > FRAC_PI_2);
        assert!(path.end().epsilon_eq(&Pose2d::new(5.0, 10.0, -FRAC_PI_2)));
    }

    #[test]
    fn test_from_path_continues_smoothly() {
        let base = PathBuilder::new(Pose2d::default(), 0.0)
            .spline_to(Vector2d::new(10.0, 10.0), FRAC_PI_2)
            .and_then(|b| b.build())
            .unwrap();

        let s = 0.5 * base.length();
        let branch = PathBuilder::from_path(&base, s)
            .spline_to(Vector2d::new(15.0, 2.0), 0.0)
            .and_then(|b| b.build())
            .unwrap();

        assert!(branch.start().epsilon_eq(&base.get(s)));
        assert!(branch.deriv(0.0).epsilon_eq(&base.deriv(s)));
        assert!(branch.second_deriv(0.0).vec().epsilon_eq(&base.second_deriv(s).vec()));

        // A line can't continue from a curving point
        let err = PathBuilder::from_path(&base, s)
            .line_to(Vector2d::new(20.0, 0.0))
            .unwrap_err();
        assert_eq!(err, PathError::PathContinuityViolation(0.0));
    }
}
