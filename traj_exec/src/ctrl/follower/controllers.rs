//! # Follower control laws
//!
//! Each control law turns the robot-frame pose error into a correction on top of the target robot
//! velocity. The PIDF based laws control each axis towards zero error: the error is used as the
//! target position with a measured position of zero, and the target velocity as the target rate
//! so that the derivative term acts on the velocity error.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::{DriveSignal, FollowerKind};
use crate::ctrl::PidfController;
use crate::geom::{Pose2d, Twist2d};
use util::maths::EPSILON;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The follower's controllers, one variant per [`FollowerKind`].
pub(crate) enum FollowerControllers {
    Holonomic {
        axial: PidfController,
        lateral: PidfController,
        heading: PidfController,
    },
    Tank {
        axial: PidfController,
        cross_track: PidfController,
        heading: PidfController,
    },
    Ramsete {
        b: f64,
        zeta: f64,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FollowerControllers {
    /// Create the controllers for the given control law.
    pub fn new(kind: &FollowerKind) -> Self {
        match kind {
            FollowerKind::Holonomic {
                axial,
                lateral,
                heading,
            } => FollowerControllers::Holonomic {
                axial: PidfController::new(axial.clone()),
                lateral: PidfController::new(lateral.clone()),
                heading: PidfController::new(heading.clone()),
            },
            FollowerKind::Tank {
                axial,
                cross_track,
                heading,
            } => FollowerControllers::Tank {
                axial: PidfController::new(axial.clone()),
                cross_track: PidfController::new(cross_track.clone()),
                heading: PidfController::new(heading.clone()),
            },
            FollowerKind::Ramsete { b, zeta } => FollowerControllers::Ramsete { b: *b, zeta: *zeta },
        }
    }

    /// Reset the state of every PIDF.
    pub fn reset(&mut self) {
        match self {
            FollowerControllers::Holonomic {
                axial,
                lateral,
                heading,
            } => {
                axial.reset();
                lateral.reset();
                heading.reset();
            }
            FollowerControllers::Tank {
                axial,
                cross_track,
                heading,
            } => {
                axial.reset();
                cross_track.reset();
                heading.reset();
            }
            FollowerControllers::Ramsete { .. } => (),
        }
    }

    /// Calculate the drive signal.
    ///
    /// # Inputs
    /// - `timestamp_s`: time since following began.
    /// - `error`: robot-frame pose error.
    /// - `target_vel`, `target_accel`: robot-frame target velocity and acceleration.
    /// - `measured_vel`: robot-frame velocity estimate, if there is one.
    pub fn update(
        &mut self,
        timestamp_s: f64,
        error: &Pose2d,
        target_vel: &Twist2d,
        target_accel: &Twist2d,
        measured_vel: Option<&Twist2d>
    ) -> DriveSignal {
        match self {
            FollowerControllers::Holonomic {
                axial,
                lateral,
                heading,
            } => {
                axial.set_target(error.x(), target_vel.x, target_accel.x);
                lateral.set_target(error.y(), target_vel.y, target_accel.y);
                heading.set_target(error.heading(), target_vel.heading, target_accel.heading);

                let correction = Twist2d::new(
                    axial.update(timestamp_s, 0.0, measured_vel.map(|v| v.x)),
                    lateral.update(timestamp_s, 0.0, measured_vel.map(|v| v.y)),
                    heading.update(timestamp_s, 0.0, measured_vel.map(|v| v.heading))
                );

                DriveSignal {
                    vel: *target_vel + correction,
                    accel: *target_accel,
                }
            }
            FollowerControllers::Tank {
                axial,
                cross_track,
                heading,
            } => {
                axial.set_target(error.x(), target_vel.x, target_accel.x);
                cross_track.set_target(error.y(), target_vel.y, target_accel.y);
                heading.set_target(error.heading(), target_vel.heading, target_accel.heading);

                let axial_correction = axial.update(timestamp_s, 0.0, measured_vel.map(|v| v.x));
                let cross_track_correction =
                    cross_track.update(timestamp_s, 0.0, measured_vel.map(|v| v.y));
                let heading_correction =
                    heading.update(timestamp_s, 0.0, measured_vel.map(|v| v.heading));

                // Turning towards the path reduces the cross-track error only in the direction of
                // travel, and not at all while the target is at rest
                let direction = if target_vel.x.abs() > EPSILON {
                    target_vel.x.signum()
                }
                else {
                    0.0
                };

                DriveSignal {
                    vel: Twist2d::new(
                        target_vel.x + axial_correction,
                        0.0,
                        target_vel.heading
                            + heading_correction
                            + direction * cross_track_correction
                    ),
                    accel: Twist2d::new(target_accel.x, 0.0, target_accel.heading),
                }
            }
            FollowerControllers::Ramsete { b, zeta } => {
                let (b, zeta) = (*b, *zeta);
                let vd = target_vel.x;
                let wd = target_vel.heading;

                let k = 2.0 * zeta * (wd * wd + b * vd * vd).sqrt();

                let v = vd * error.heading().cos() + k * error.x();
                let w = wd
                    + k * error.heading()
                    + b * vd * sinc(error.heading()) * error.y();

                DriveSignal {
                    vel: Twist2d::new(v, 0.0, w),
                    accel: Twist2d::new(target_accel.x, 0.0, target_accel.heading),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// `sin(x) / x`, continuous through zero.
fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-6 {
        1.0 - x * x / 6.0
    }
    else {
        x.sin() / x
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ctrl::PidfParams;
    use util::maths::epsilon_eq;

    #[test]
    fn test_no_error_passes_target_through() {
        let kinds = vec![
            FollowerKind::Holonomic {
                axial: PidfParams::pid(1.0, 0.0, 0.0),
                lateral: PidfParams::pid(1.0, 0.0, 0.0),
                heading: PidfParams::pid(1.0, 0.0, 0.0),
            },
            FollowerKind::Tank {
                axial: PidfParams::pid(1.0, 0.0, 0.0),
                cross_track: PidfParams::pid(1.0, 0.0, 0.0),
                heading: PidfParams::pid(1.0, 0.0, 0.0),
            },
            FollowerKind::Ramsete { b: 2.0, zeta: 0.7 },
        ];
        let target_vel = Twist2d::new(1.0, 0.0, 0.5);
        let target_accel = Twist2d::new(0.2, 0.0, 0.1);

        for kind in kinds.iter() {
            let mut ctrl = FollowerControllers::new(kind);
            let signal = ctrl.update(
                0.0,
                &Pose2d::default(),
                &target_vel,
                &target_accel,
                Some(&target_vel)
            );

            assert!(signal.vel.epsilon_eq(&target_vel));
            assert!(signal.accel.epsilon_eq(&target_accel));
        }
    }

    #[test]
    fn test_corrections_reduce_error() {
        let error = Pose2d::new(0.1, 0.2, 0.0);
        let target_vel = Twist2d::new(1.0, 0.0, 0.0);

        // Holonomic strafes towards the target
        let mut ctrl = FollowerControllers::new(&FollowerKind::Holonomic {
            axial: PidfParams::pid(2.0, 0.0, 0.0),
            lateral: PidfParams::pid(2.0, 0.0, 0.0),
            heading: PidfParams::pid(2.0, 0.0, 0.0),
        });
        let signal = ctrl.update(0.0, &error, &target_vel, &Twist2d::default(), None);
        assert!(signal.vel.epsilon_eq(&Twist2d::new(1.2, 0.4, 0.0)));

        // Tank turns towards it instead
        let mut ctrl = FollowerControllers::new(&FollowerKind::Tank {
            axial: PidfParams::pid(2.0, 0.0, 0.0),
            cross_track: PidfParams::pid(1.0, 0.0, 0.0),
            heading: PidfParams::pid(2.0, 0.0, 0.0),
        });
        let signal = ctrl.update(0.0, &error, &target_vel, &Twist2d::default(), None);
        assert!(signal.vel.epsilon_eq(&Twist2d::new(1.2, 0.0, 0.2)));

        // Ramsete with k = 2 * 0.5 * sqrt(b)
        let mut ctrl = FollowerControllers::new(&FollowerKind::Ramsete { b: 4.0, zeta: 0.5 });
        let signal = ctrl.update(0.0, &error, &target_vel, &Twist2d::default(), None);
        assert!(epsilon_eq(signal.vel.x, 1.0 + 2.0 * 0.1));
        assert!(epsilon_eq(signal.vel.heading, 4.0 * 0.2));
        assert_eq!(signal.vel.y, 0.0);
    }

    #[test]
    fn test_tank_cross_track_direction() {
        let error = Pose2d::new(0.0, 0.2, 0.0);
        let kind = FollowerKind::Tank {
            axial: PidfParams::pid(2.0, 0.0, 0.0),
            cross_track: PidfParams::pid(1.0, 0.0, 0.0),
            heading: PidfParams::pid(2.0, 0.0, 0.0),
        };

        // Reversing turns the other way
        let mut ctrl = FollowerControllers::new(&kind);
        let reversing = Twist2d::new(-1.0, 0.0, 0.0);
        let signal = ctrl.update(0.0, &error, &reversing, &Twist2d::default(), None);
        assert!(epsilon_eq(signal.vel.heading, -0.2));

        // No turn at rest, whatever the sign of zero
        for &vx in &[0.0, -0.0] {
            let mut ctrl = FollowerControllers::new(&kind);
            let signal =
                ctrl.update(0.0, &error, &Twist2d::new(vx, 0.0, 0.0), &Twist2d::default(), None);
            assert_eq!(signal.vel.heading, 0.0);
        }
    }

    #[test]
    fn test_sinc() {
        assert_eq!(sinc(0.0), 1.0);
        assert!(epsilon_eq(sinc(1e-7), 1.0));
        assert!(epsilon_eq(sinc(std::f64::consts::FRAC_PI_2), 2.0 / std::f64::consts::PI));
    }
}
