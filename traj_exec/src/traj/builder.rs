//! # Trajectory builder
//!
//! Collects everything needed to turn a path into a trajectory: the constraints, the boundary
//! velocities, the generation resolution and any markers.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;

use super::{
    generate_path_profile, MarkerSpec, Trajectory, TrajectoryAccelerationConstraint,
    TrajectoryError, TrajectoryVelocityConstraint, DEFAULT_RESOLUTION,
};
use crate::path::Path;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Builds a [`Trajectory`] from a path.
pub struct TrajectoryBuilder<'a> {
    path: Path,
    vel_constraint: &'a dyn TrajectoryVelocityConstraint,
    accel_constraint: &'a dyn TrajectoryAccelerationConstraint,
    start_vel: f64,
    end_vel: f64,
    resolution: f64,
    markers: Vec<MarkerSpec>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<'a> TrajectoryBuilder<'a> {
    /// Start building a trajectory which begins and ends at rest.
    pub fn new(
        path: Path,
        vel_constraint: &'a dyn TrajectoryVelocityConstraint,
        accel_constraint: &'a dyn TrajectoryAccelerationConstraint
    ) -> Self {
        Self {
            path,
            vel_constraint,
            accel_constraint,
            start_vel: 0.0,
            end_vel: 0.0,
            resolution: DEFAULT_RESOLUTION,
            markers: Vec::new(),
        }
    }

    pub fn start_vel(mut self, start_vel: f64) -> Self {
        self.start_vel = start_vel;
        self
    }

    pub fn end_vel(mut self, end_vel: f64) -> Self {
        self.end_vel = end_vel;
        self
    }

    pub fn resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn add_marker(mut self, marker: MarkerSpec) -> Self {
        self.markers.push(marker);
        self
    }

    /// Generate the profile and resolve the markers.
    pub fn build(self) -> Result<Trajectory, TrajectoryError> {
        let profile = generate_path_profile(
            &self.path,
            self.vel_constraint,
            self.accel_constraint,
            self.start_vel,
            self.end_vel,
            self.resolution
        )?;

        let markers = self
            .markers
            .iter()
            .map(|m| m.resolve(&self.path, &profile))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "Built trajectory of length {:.3} and duration {:.3} s with {} markers",
            self.path.length(),
            profile.duration(),
            markers.len()
        );

        Ok(Trajectory::new(self.path, profile, markers))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::{Pose2d, Twist2d, Vector2Ext, Vector2d};
    use crate::path::PathBuilder;
    use crate::traj::{
        AccelerationConstraint, MarkerTime, MarkerTrigger, ProfileError, VelocityConstraint,
    };
    use std::f64::consts::FRAC_PI_2;
    use util::maths::epsilon_eq;

    fn constraints() -> (VelocityConstraint, AccelerationConstraint) {
        (
            VelocityConstraint::Translational { max_vel: 5.0 },
            AccelerationConstraint::Profile { max_accel: 2.5 },
        )
    }

    fn straight() -> Path {
        PathBuilder::new(Pose2d::default(), 0.0)
            .line_to(Vector2d::new(10.0, 0.0))
            .and_then(|b| b.build())
            .unwrap()
    }

    #[test]
    fn test_straight_trajectory() {
        let (vel, accel) = constraints();
        let traj = TrajectoryBuilder::new(straight(), &vel, &accel).build().unwrap();

        assert!(epsilon_eq(traj.duration(), 4.0));
        assert!(traj.get(0.0).epsilon_eq(&Pose2d::default()));
        assert!(traj.get(2.0).epsilon_eq(&Pose2d::new(5.0, 0.0, 0.0)));
        assert!(traj.get(4.0).epsilon_eq(&Pose2d::new(10.0, 0.0, 0.0)));

        assert!(traj.velocity(2.0).epsilon_eq(&Twist2d::new(5.0, 0.0, 0.0)));
        assert!(traj.acceleration(1.0).epsilon_eq(&Twist2d::new(2.5, 0.0, 0.0)));
        assert!(traj.acceleration(3.0).epsilon_eq(&Twist2d::new(-2.5, 0.0, 0.0)));
    }

    #[test]
    fn test_curved_acceleration_has_centripetal_term() {
        let path = PathBuilder::new(Pose2d::default(), 0.0)
            .spline_to(Vector2d::new(10.0, 10.0), FRAC_PI_2)
            .and_then(|b| b.build())
            .unwrap();
        let (vel, accel) = constraints();
        let traj = TrajectoryBuilder::new(path, &vel, &accel).build().unwrap();

        // Part way round the bend the acceleration has a component across the direction of travel
        let t = 0.5 * traj.duration();
        let v = traj.velocity(t).vec();
        let a = traj.acceleration(t).vec();
        assert!(v.cross2(&a).abs() > 1e-3);
    }

    #[test]
    fn test_markers_resolved() {
        let (vel, accel) = constraints();
        let traj = TrajectoryBuilder::new(straight(), &vel, &accel)
            .add_marker(MarkerSpec::temporal("before_end", MarkerTime::BeforeEnd(1.0)))
            .add_marker(MarkerSpec::temporal("half", MarkerTime::Fraction(0.5)))
            .add_marker(MarkerSpec::displacement("at_three", 3.0))
            .add_marker(MarkerSpec::spatial("near_seven", Vector2d::new(7.0, 1.0)))
            .build()
            .unwrap();

        let triggers: Vec<MarkerTrigger> = traj.markers().iter().map(|m| m.trigger).collect();
        assert_eq!(triggers[0], MarkerTrigger::Time { time: traj.duration() - 1.0 });
        assert_eq!(triggers[1], MarkerTrigger::Time { time: 0.5 * traj.duration() });
        assert_eq!(triggers[2], MarkerTrigger::Displacement { displacement: 3.0 });
        match triggers[3] {
            MarkerTrigger::Displacement { displacement } => assert!(epsilon_eq(displacement, 7.0)),
            _ => panic!("Spatial marker should resolve to a displacement"),
        }
    }

    #[test]
    fn test_marker_out_of_range() {
        let (vel, accel) = constraints();
        let err = TrajectoryBuilder::new(straight(), &vel, &accel)
            .add_marker(MarkerSpec::displacement("too_far", 11.0))
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            TrajectoryError::MarkerOutOfRange {
                label: "too_far".to_string(),
                value: 11.0
            }
        );
    }

    #[test]
    fn test_unsatisfiable_propagates() {
        let vel = VelocityConstraint::Translational { max_vel: 5.0 };
        let accel = AccelerationConstraint::Profile { max_accel: -1.0 };
        let err = TrajectoryBuilder::new(straight(), &vel, &accel).build().unwrap_err();

        assert_eq!(
            err,
            TrajectoryError::Profile(ProfileError::UnsatisfiableConstraint { s: 0.0 })
        );
    }

    #[test]
    fn test_json_round_trip() {
        let (vel, accel) = constraints();
        let traj = TrajectoryBuilder::new(straight(), &vel, &accel)
            .add_marker(MarkerSpec::displacement("mark", 3.0).with_callback(|| ()))
            .build()
            .unwrap();

        let json = serde_json::to_string(&traj).unwrap();
        let back: Trajectory = serde_json::from_str(&json).unwrap();

        assert!(epsilon_eq(back.duration(), traj.duration()));
        assert!(back.get(1.5).epsilon_eq(&traj.get(1.5)));
        assert_eq!(back.markers()[0].label, "mark");

        // Callbacks aren't serialised
        assert!(traj.markers()[0].callback.is_some());
        assert!(back.markers()[0].callback.is_none());
    }
}
