//! # Kinematics
//!
//! Conversions between the field frame and the robot frame, and the wheel velocity mappings used
//! by the wheel-limited velocity constraints.
//!
//! The robot frame has +x pointing forwards along the robot's heading and +y to the robot's left.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::{angle, Pose2d, Twist2d, Vector2Ext, Vector2d};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Rotate a field-frame velocity into the robot frame.
pub fn field_to_robot_velocity(field_pose: &Pose2d, field_vel: &Twist2d) -> Twist2d {
    Twist2d::from_parts(field_vel.vec().rotated(-field_pose.heading()), field_vel.heading)
}

/// Rotate a robot-frame velocity into the field frame.
pub fn robot_to_field_velocity(field_pose: &Pose2d, robot_vel: &Twist2d) -> Twist2d {
    Twist2d::from_parts(robot_vel.vec().rotated(field_pose.heading()), robot_vel.heading)
}

/// Convert a field-frame acceleration into the robot frame.
///
/// The robot frame rotates with the robot, so the field velocity contributes a term proportional
/// to the angular velocity.
pub fn field_to_robot_acceleration(
    field_pose: &Pose2d,
    field_vel: &Twist2d,
    field_accel: &Twist2d
) -> Twist2d {
    let (sin, cos) = field_pose.heading().sin_cos();

    let rotated = Twist2d::from_parts(
        field_accel.vec().rotated(-field_pose.heading()),
        field_accel.heading
    );
    let frame_rate = Twist2d::new(
        -field_vel.x * sin + field_vel.y * cos,
        -field_vel.x * cos - field_vel.y * sin,
        0.0
    );

    rotated + frame_rate * field_vel.heading
}

/// Error between the target and current field poses, expressed in the current robot frame.
///
/// The heading component is the shortest signed rotation from the current to the target heading.
pub fn robot_pose_error(target_field_pose: &Pose2d, current_field_pose: &Pose2d) -> Pose2d {
    let field_error = target_field_pose.position() - current_field_pose.position();

    Pose2d::from_position(
        field_error.rotated(-current_field_pose.heading()),
        angle::delta(current_field_pose.heading(), target_field_pose.heading())
    )
}

/// Apply a robot-frame pose delta to a field pose using the pose exponential.
///
/// The delta is assumed to come from a constant twist over the update interval, so the robot moves
/// along a circular arc rather than a straight line.
pub fn relative_odometry_update(field_pose: &Pose2d, robot_pose_delta: &Twist2d) -> Pose2d {
    let dtheta = robot_pose_delta.heading;

    // Series expansions near zero avoid the 0/0 in sin(x)/x and (1 - cos(x))/x
    let (sine_term, cos_term) = if dtheta.abs() < 1e-6 {
        (1.0 - dtheta * dtheta / 6.0, dtheta / 2.0)
    }
    else {
        (dtheta.sin() / dtheta, (1.0 - dtheta.cos()) / dtheta)
    };

    let robot_position_delta = Vector2d::new(
        sine_term * robot_pose_delta.x - cos_term * robot_pose_delta.y,
        cos_term * robot_pose_delta.x + sine_term * robot_pose_delta.y
    );
    let field_position_delta = robot_position_delta.rotated(field_pose.heading());

    Pose2d::from_position(
        field_pose.position() + field_position_delta,
        field_pose.heading() + dtheta
    )
}

/// Wheel velocities of a tank (differential) drive for a robot-frame velocity.
///
/// Returned as `[left, right]`. The lateral component of the velocity is ignored since a tank drive
/// cannot realise it.
pub fn tank_wheel_velocities(robot_vel: &Twist2d, track_width: f64) -> [f64; 2] {
    [
        robot_vel.x - 0.5 * track_width * robot_vel.heading,
        robot_vel.x + 0.5 * track_width * robot_vel.heading,
    ]
}

/// Wheel velocities of a mecanum drive for a robot-frame velocity.
///
/// Returned as `[front_left, rear_left, rear_right, front_right]`.
pub fn mecanum_wheel_velocities(
    robot_vel: &Twist2d,
    track_width: f64,
    wheel_base: f64,
    lateral_multiplier: f64
) -> [f64; 4] {
    let k = 0.5 * (track_width + wheel_base);
    let lateral = lateral_multiplier * robot_vel.y;

    [
        robot_vel.x - lateral - k * robot_vel.heading,
        robot_vel.x + lateral - k * robot_vel.heading,
        robot_vel.x - lateral + k * robot_vel.heading,
        robot_vel.x + lateral + k * robot_vel.heading,
    ]
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;
    use util::maths::epsilon_eq;

    #[test]
    fn test_frame_conversions() {
        let pose = Pose2d::new(1.0, 1.0, PI / 2.0);
        let field_vel = Twist2d::new(0.0, 2.0, 0.5);

        // Moving along +y while facing +y is pure forward motion
        let robot_vel = field_to_robot_velocity(&pose, &field_vel);
        assert!(robot_vel.epsilon_eq(&Twist2d::new(2.0, 0.0, 0.5)));
        assert!(robot_to_field_velocity(&pose, &robot_vel).epsilon_eq(&field_vel));

        // Turning while translating in the field produces an apparent lateral acceleration
        let robot_accel = field_to_robot_acceleration(&pose, &field_vel, &Twist2d::default());
        assert!(robot_accel.epsilon_eq(&Twist2d::new(0.0, -1.0, 0.0)));
    }

    #[test]
    fn test_robot_pose_error() {
        let target = Pose2d::new(1.0, 1.0, PI - 0.1);
        let current = Pose2d::new(0.0, 0.0, PI / 2.0);
        let error = robot_pose_error(&target, &current);

        // Target is 1 ahead (+y in field) and 1 to the right (+x in field)
        assert!(epsilon_eq(error.x(), 1.0));
        assert!(epsilon_eq(error.y(), -1.0));
        assert!(epsilon_eq(error.heading(), PI / 2.0 - 0.1));

        // Heading error takes the short way round
        let error = robot_pose_error(&Pose2d::new(0.0, 0.0, -PI + 0.1), &Pose2d::new(0.0, 0.0, PI - 0.1));
        assert!(epsilon_eq(error.heading(), 0.2));
    }

    #[test]
    fn test_relative_odometry_update() {
        // Straight line
        let pose = relative_odometry_update(&Pose2d::new(1.0, 0.0, PI / 2.0), &Twist2d::new(2.0, 0.0, 0.0));
        assert!(pose.epsilon_eq(&Pose2d::new(1.0, 2.0, PI / 2.0)));

        // Quarter circle of radius 1
        let pose = relative_odometry_update(&Pose2d::default(), &Twist2d::new(PI / 2.0, 0.0, PI / 2.0));
        assert!(pose.epsilon_eq(&Pose2d::new(1.0, 1.0, PI / 2.0)));
    }

    #[test]
    fn test_wheel_velocities() {
        let wheels = tank_wheel_velocities(&Twist2d::new(1.0, 0.0, 1.0), 0.5);
        assert!(epsilon_eq(wheels[0], 0.75));
        assert!(epsilon_eq(wheels[1], 1.25));

        let wheels = mecanum_wheel_velocities(&Twist2d::new(0.0, 1.0, 0.0), 0.5, 0.5, 1.0);
        assert!(epsilon_eq(wheels[0], -1.0));
        assert!(epsilon_eq(wheels[1], 1.0));
        assert!(epsilon_eq(wheels[2], -1.0));
        assert!(epsilon_eq(wheels[3], 1.0));
    }
}
