//! # Path specifications
//!
//! A [`PathSpec`] is a path written down as the list of builder calls which make it, so paths can
//! be given in parameter files or sent from an editor. Building a spec replays the calls through a
//! [`PathBuilder`], with all the usual checks.
//!
//! In TOML a spec looks like:
//!
//! ```toml
//! start = { x = 0.0, y = 0.0, heading = 0.0 }
//!
//! [[commands]]
//! type = "LineTo"
//! x = 10.0
//! y = 0.0
//!
//! [[commands]]
//! type = "SplineTo"
//! x = 20.0
//! y = 10.0
//! tangent = 1.5708
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{Path, PathBuilder, PathError};
use crate::geom::{Pose2d, Vector2d};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A path described by its start and the builder commands which follow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSpec {
    pub start: Pose2d,

    /// Start direction of travel. If not given the path starts along the start heading, or
    /// against it if `reversed` is set.
    #[serde(default)]
    pub tangent: Option<f64>,

    #[serde(default)]
    pub reversed: bool,

    pub commands: Vec<PathCommand>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// One path builder call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PathCommand {
    LineTo { x: f64, y: f64 },
    LineToConstantHeading { x: f64, y: f64 },
    LineToLinearHeading { x: f64, y: f64, heading: f64 },
    LineToSplineHeading { x: f64, y: f64, heading: f64 },
    StrafeTo { x: f64, y: f64 },
    Forward { distance: f64 },
    Back { distance: f64 },
    StrafeLeft { distance: f64 },
    StrafeRight { distance: f64 },
    SplineTo { x: f64, y: f64, tangent: f64 },
    SplineToConstantHeading { x: f64, y: f64, tangent: f64 },
    SplineToLinearHeading { x: f64, y: f64, heading: f64, tangent: f64 },
    SplineToSplineHeading { x: f64, y: f64, heading: f64, tangent: f64 },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PathSpec {
    /// Replay the commands through a builder.
    pub fn build(&self) -> Result<Path, PathError> {
        let builder = match self.tangent {
            Some(t) => PathBuilder::new(self.start, t),
            None => PathBuilder::from_pose(self.start, self.reversed),
        };

        self.commands
            .iter()
            .try_fold(builder, |builder, cmd| cmd.apply(builder))?
            .build()
    }
}

impl PathCommand {
    /// Apply this command to a builder.
    pub fn apply(&self, builder: PathBuilder) -> Result<PathBuilder, PathError> {
        use PathCommand::*;

        match *self {
            LineTo { x, y } => builder.line_to(Vector2d::new(x, y)),
            LineToConstantHeading { x, y } => {
                builder.line_to_constant_heading(Vector2d::new(x, y))
            }
            LineToLinearHeading { x, y, heading } => {
                builder.line_to_linear_heading(Pose2d::new(x, y, heading))
            }
            LineToSplineHeading { x, y, heading } => {
                builder.line_to_spline_heading(Pose2d::new(x, y, heading))
            }
            StrafeTo { x, y } => builder.strafe_to(Vector2d::new(x, y)),
            Forward { distance } => builder.forward(distance),
            Back { distance } => builder.back(distance),
            StrafeLeft { distance } => builder.strafe_left(distance),
            StrafeRight { distance } => builder.strafe_right(distance),
            SplineTo { x, y, tangent } => builder.spline_to(Vector2d::new(x, y), tangent),
            SplineToConstantHeading { x, y, tangent } => {
                builder.spline_to_constant_heading(Vector2d::new(x, y), tangent)
            }
            SplineToLinearHeading {
                x,
                y,
                heading,
                tangent,
            } => builder.spline_to_linear_heading(Pose2d::new(x, y, heading), tangent),
            SplineToSplineHeading {
                x,
                y,
                heading,
                tangent,
            } => builder.spline_to_spline_heading(Pose2d::new(x, y, heading), tangent),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_toml_spec() {
        let spec: PathSpec = toml::from_str(
            r#"
            start = { x = 0.0, y = 0.0, heading = 0.0 }

            [[commands]]
            type = "LineTo"
            x = 10.0
            y = 0.0

            [[commands]]
            type = "SplineTo"
            x = 20.0
            y = 10.0
            tangent = 1.5707963267948966

            [[commands]]
            type = "Forward"
            distance = 5.0
            "#
        )
        .unwrap();

        assert!(!spec.reversed);
        assert_eq!(spec.commands.len(), 3);

        let path = spec.build().unwrap();
        assert_eq!(path.segments().len(), 3);
        assert!(path.end().epsilon_eq(&Pose2d::new(20.0, 15.0, FRAC_PI_2)));
    }

    #[test]
    fn test_spec_errors_propagate() {
        let spec = PathSpec {
            start: Pose2d::default(),
            tangent: None,
            reversed: false,
            commands: vec![
                PathCommand::LineTo { x: 1.0, y: 0.0 },
                PathCommand::LineTo { x: 1.0, y: 0.0 },
            ],
        };
        assert_eq!(spec.build(), Err(PathError::EmptyPathSegment));

        let spec = PathSpec {
            commands: vec![],
            ..spec
        };
        assert_eq!(spec.build(), Err(PathError::EmptyPath));
    }
}
