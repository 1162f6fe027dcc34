//! # Localisation module
//!
//! The follower needs a pose estimate, and optionally a velocity estimate, every cycle. Anything
//! which can provide them implements [`Localiser`].
//!
//! The only localiser provided here is [`DeadReckoning`], which integrates the commanded robot
//! velocity. It has no feedback from the real world so is only suitable for simulation and
//! testing.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::geom::{
    kinematics::{relative_odometry_update, robot_to_field_velocity},
    Pose2d, Twist2d,
};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source of pose estimates in the field frame.
pub trait Localiser {
    /// Update the estimates, called once per cycle before they're read.
    fn update(&mut self);

    /// The current field-frame pose estimate.
    fn pose_estimate(&self) -> Pose2d;

    /// The current field-frame velocity estimate, if the localiser can provide one.
    fn velocity_estimate(&self) -> Option<Twist2d>;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Localiser which assumes the robot moves exactly as commanded.
#[derive(Debug, Copy, Clone, Default)]
pub struct DeadReckoning {
    pose: Pose2d,

    /// Robot-frame velocity being driven
    robot_vel: Twist2d,

    /// Time the velocity has been driven for since the last update
    pending_dt: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DeadReckoning {
    pub fn new(pose: Pose2d) -> Self {
        Self {
            pose,
            robot_vel: Twist2d::default(),
            pending_dt: 0.0,
        }
    }

    /// Record a robot-frame velocity which will be driven for `dt` seconds.
    ///
    /// The motion is applied to the estimate on the next call to `update`.
    pub fn set_drive(&mut self, robot_vel: Twist2d, dt: f64) {
        self.robot_vel = robot_vel;
        self.pending_dt = dt;
    }
}

impl Localiser for DeadReckoning {
    fn update(&mut self) {
        if self.pending_dt > 0.0 {
            self.pose = relative_odometry_update(&self.pose, &(self.robot_vel * self.pending_dt));
            self.pending_dt = 0.0;
        }
    }

    fn pose_estimate(&self) -> Pose2d {
        self.pose
    }

    fn velocity_estimate(&self) -> Option<Twist2d> {
        Some(robot_to_field_velocity(&self.pose, &self.robot_vel))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_dead_reckoning_arc() {
        let mut loc = DeadReckoning::new(Pose2d::default());

        // Half a circle of radius 1 in 10 steps
        for _ in 0..10 {
            loc.set_drive(Twist2d::new(PI / 10.0, 0.0, PI / 10.0), 1.0);
            loc.update();
        }

        assert!(loc.pose_estimate().epsilon_eq(&Pose2d::new(0.0, 2.0, PI)));
        assert!(loc
            .velocity_estimate()
            .unwrap()
            .epsilon_eq(&Twist2d::new(-PI / 10.0, 0.0, PI / 10.0)));
    }

    #[test]
    fn test_update_applies_drive_once() {
        let mut loc = DeadReckoning::new(Pose2d::new(1.0, 1.0, FRAC_PI_2));
        loc.set_drive(Twist2d::new(1.0, 0.0, 0.0), 0.5);
        loc.update();
        loc.update();

        assert!(loc.pose_estimate().epsilon_eq(&Pose2d::new(1.0, 1.5, FRAC_PI_2)));
    }
}
