//! # Trajectory constraints
//!
//! Constraints bound the robot's speed along a path, and the rate at which that speed can change,
//! as a function of where on the path it is. They are evaluated pointwise by the profile
//! generator.
//!
//! All bounds are on the path velocity `ds/dt` (or its rate of change), not on a robot velocity.
//! A constraint is given the pose and the field frame path derivative at the point, so it can
//! convert a path velocity into whatever robot quantity it limits. It's also given a base robot
//! velocity which is added on top of the path motion, which is zero when generating plain path
//! profiles.
//!
//! The built in constraints are closed enums which can be loaded from parameter files. Custom
//! constraints implement [`TrajectoryVelocityConstraint`] or [`TrajectoryAccelerationConstraint`].

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::{
    kinematics::{field_to_robot_velocity, mecanum_wheel_velocities, tank_wheel_velocities},
    Pose2d, Twist2d,
};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A bound on path velocity.
pub trait TrajectoryVelocityConstraint {
    /// Maximum path velocity at displacement `s`.
    ///
    /// # Inputs
    /// - `s`: displacement along the path.
    /// - `pose`: the path's pose at `s`.
    /// - `deriv`: the path's field frame derivative at `s`.
    /// - `base_robot_vel`: robot frame velocity added on top of the path motion.
    fn get(
        &self,
        s: f64,
        pose: &Pose2d,
        deriv: &Twist2d,
        base_robot_vel: &Twist2d
    ) -> Result<f64, ConstraintError>;
}

/// A bound on path acceleration.
pub trait TrajectoryAccelerationConstraint {
    /// Maximum magnitude of path acceleration at displacement `s`.
    ///
    /// Inputs are as for [`TrajectoryVelocityConstraint::get`].
    fn get(
        &self,
        s: f64,
        pose: &Pose2d,
        deriv: &Twist2d,
        base_robot_vel: &Twist2d
    ) -> Result<f64, ConstraintError>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The usual limits of a drivetrain, from which the standard constraint set is made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveConstraints {
    /// Maximum translational speed
    pub max_vel: f64,

    /// Maximum path acceleration
    pub max_accel: f64,

    /// Maximum angular speed
    pub max_ang_vel: f64,

    /// Maximum angular acceleration
    pub max_ang_accel: f64,

    /// Further velocity constraints, such as wheel speed limits
    #[serde(default)]
    pub extra_velocity: Vec<VelocityConstraint>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors reported by constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstraintError {
    #[error("The base robot velocity already exceeds the constraint's bound")]
    BaseVelocityExceedsBound,
}

/// Built in velocity constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum VelocityConstraint {
    /// Limit on the robot's translational speed.
    Translational { max_vel: f64 },

    /// Limit on the robot's angular speed.
    Angular { max_ang_vel: f64 },

    /// Limit on the wheel speeds of a tank drive.
    TankWheel { max_wheel_vel: f64, track_width: f64 },

    /// Limit on the wheel speeds of a mecanum drive.
    MecanumWheel {
        max_wheel_vel: f64,
        track_width: f64,
        wheel_base: f64,
        #[serde(default = "default_lateral_multiplier")]
        lateral_multiplier: f64,
    },

    /// The tightest of several constraints.
    Min { constraints: Vec<VelocityConstraint> },
}

/// Built in acceleration constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AccelerationConstraint {
    /// Fixed limit on path acceleration.
    Profile { max_accel: f64 },

    /// Limit on the robot's angular acceleration.
    Angular { max_ang_accel: f64 },

    /// The tightest of several constraints.
    Min { constraints: Vec<AccelerationConstraint> },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveConstraints {
    /// The translational and angular velocity limits plus any extra constraints.
    pub fn velocity_constraint(&self) -> VelocityConstraint {
        let mut constraints = vec![
            VelocityConstraint::Translational {
                max_vel: self.max_vel,
            },
            VelocityConstraint::Angular {
                max_ang_vel: self.max_ang_vel,
            },
        ];
        constraints.extend(self.extra_velocity.iter().cloned());

        VelocityConstraint::Min { constraints }
    }

    /// The path and angular acceleration limits.
    pub fn acceleration_constraint(&self) -> AccelerationConstraint {
        AccelerationConstraint::Min {
            constraints: vec![
                AccelerationConstraint::Profile {
                    max_accel: self.max_accel,
                },
                AccelerationConstraint::Angular {
                    max_ang_accel: self.max_ang_accel,
                },
            ],
        }
    }
}

impl TrajectoryVelocityConstraint for VelocityConstraint {
    fn get(
        &self,
        s: f64,
        pose: &Pose2d,
        deriv: &Twist2d,
        base_robot_vel: &Twist2d
    ) -> Result<f64, ConstraintError> {
        match self {
            VelocityConstraint::Translational { max_vel } => {
                let v0 = base_robot_vel.vec();
                if v0.norm() >= *max_vel {
                    return Err(ConstraintError::BaseVelocityExceedsBound);
                }

                // Largest v with |v0 + v1 v| = max_vel
                let v1 = field_to_robot_velocity(pose, deriv).vec();
                let a = v1.dot(&v1);
                let b = 2.0 * v0.dot(&v1);
                let c = v0.dot(&v0) - max_vel * max_vel;

                if a == 0.0 {
                    return Ok(std::f64::INFINITY);
                }

                Ok((-b + (b * b - 4.0 * a * c).sqrt()) / (2.0 * a))
            }
            VelocityConstraint::Angular { max_ang_vel } => {
                let omega0 = base_robot_vel.heading;
                if omega0.abs() >= *max_ang_vel {
                    return Err(ConstraintError::BaseVelocityExceedsBound);
                }

                Ok(wheel_limit(*max_ang_vel, &[omega0], &[deriv.heading]))
            }
            VelocityConstraint::TankWheel {
                max_wheel_vel,
                track_width,
            } => {
                let base = tank_wheel_velocities(base_robot_vel, *track_width);
                if base.iter().any(|w| w.abs() >= *max_wheel_vel) {
                    return Err(ConstraintError::BaseVelocityExceedsBound);
                }

                let per_unit =
                    tank_wheel_velocities(&field_to_robot_velocity(pose, deriv), *track_width);

                Ok(wheel_limit(*max_wheel_vel, &base, &per_unit))
            }
            VelocityConstraint::MecanumWheel {
                max_wheel_vel,
                track_width,
                wheel_base,
                lateral_multiplier,
            } => {
                let base = mecanum_wheel_velocities(
                    base_robot_vel,
                    *track_width,
                    *wheel_base,
                    *lateral_multiplier
                );
                if base.iter().any(|w| w.abs() >= *max_wheel_vel) {
                    return Err(ConstraintError::BaseVelocityExceedsBound);
                }

                let per_unit = mecanum_wheel_velocities(
                    &field_to_robot_velocity(pose, deriv),
                    *track_width,
                    *wheel_base,
                    *lateral_multiplier
                );

                Ok(wheel_limit(*max_wheel_vel, &base, &per_unit))
            }
            VelocityConstraint::Min { constraints } => {
                constraints.iter().try_fold(std::f64::INFINITY, |min, c| {
                    Ok(min.min(c.get(s, pose, deriv, base_robot_vel)?))
                })
            }
        }
    }
}

impl TrajectoryAccelerationConstraint for AccelerationConstraint {
    fn get(
        &self,
        s: f64,
        pose: &Pose2d,
        deriv: &Twist2d,
        base_robot_vel: &Twist2d
    ) -> Result<f64, ConstraintError> {
        match self {
            AccelerationConstraint::Profile { max_accel } => Ok(*max_accel),
            AccelerationConstraint::Angular { max_ang_accel } => {
                Ok(max_ang_accel / deriv.heading.abs())
            }
            AccelerationConstraint::Min { constraints } => {
                constraints.iter().try_fold(std::f64::INFINITY, |min, c| {
                    Ok(min.min(c.get(s, pose, deriv, base_robot_vel)?))
                })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Largest path velocity keeping every `base[i] + per_unit[i] * v` within `+/- max`.
///
/// Assumes every base value is already within the limit.
fn wheel_limit(max: f64, base: &[f64], per_unit: &[f64]) -> f64 {
    base.iter()
        .zip(per_unit)
        .map(|(w0, w)| ((max - w0) / w).max((-max - w0) / w))
        .fold(std::f64::INFINITY, f64::min)
}

fn default_lateral_multiplier() -> f64 {
    1.0
}
