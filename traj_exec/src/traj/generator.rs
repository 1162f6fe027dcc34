//! # Motion profile generation
//!
//! Profiles are generated by sampling the constraints at evenly spaced displacements and then:
//!
//! 1. Running forwards from the start velocity, accelerating as hard as the acceleration bound
//!    allows without exceeding the velocity bound at the next sample.
//! 2. Running backwards from the goal velocity in the same way, decelerating, and taking the
//!    smaller of the two results at each sample.
//! 3. Integrating time from the trapezoidal mean velocity between samples.
//!
//! This gives the fastest profile which respects the sampled constraints at every sample.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    ConstraintError, MotionProfile, MotionState, ProfileError, ProfileSample,
    TrajectoryAccelerationConstraint, TrajectoryVelocityConstraint,
};
use crate::geom::Twist2d;
use crate::path::Path;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default distance between constraint samples.
pub const DEFAULT_RESOLUTION: f64 = 0.25;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters of profile generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileParams {
    /// Distance between constraint samples
    #[serde(default = "default_resolution")]
    pub resolution: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for ProfileParams {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_RESOLUTION,
        }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Generate a profile along a path which starts at `start_vel` and finishes at `end_vel`.
pub fn generate_path_profile(
    path: &Path,
    vel_constraint: &dyn TrajectoryVelocityConstraint,
    accel_constraint: &dyn TrajectoryAccelerationConstraint,
    start_vel: f64,
    end_vel: f64,
    resolution: f64
) -> Result<MotionProfile, ProfileError> {
    let base_robot_vel = Twist2d::default();

    generate_motion_profile(
        MotionState::new(0.0, start_vel, 0.0),
        MotionState::new(path.length(), end_vel, 0.0),
        |s| vel_constraint.get(s, &path.get(s), &path.deriv(s), &base_robot_vel),
        |s| accel_constraint.get(s, &path.get(s), &path.deriv(s), &base_robot_vel),
        resolution
    )
}

/// Generate a profile between two states under displacement dependent bounds.
///
/// `vel_fn` and `accel_fn` give the velocity and acceleration bounds at a displacement. If the goal
/// is behind the start the mirrored problem is solved and the result flipped, in which case the
/// velocities in the states are negative for travel towards the goal.
pub fn generate_motion_profile<V, A>(
    start: MotionState,
    goal: MotionState,
    vel_fn: V,
    accel_fn: A,
    resolution: f64
) -> Result<MotionProfile, ProfileError>
where
    V: Fn(f64) -> Result<f64, ConstraintError>,
    A: Fn(f64) -> Result<f64, ConstraintError>
{
    if !(resolution > 0.0) {
        return Err(ProfileError::InvalidResolution(resolution));
    }

    if goal.x < start.x {
        return Ok(generate_forward(
            start.flipped(),
            goal.flipped(),
            |x| vel_fn(-x),
            |x| accel_fn(-x),
            resolution
        )?
        .flipped());
    }

    generate_forward(start, goal, vel_fn, accel_fn, resolution)
}

/// Generate a trapezoidal (or triangular) profile under fixed bounds.
///
/// This is the closed form of [`generate_motion_profile`] with constant bounds, and needs no
/// sampling.
pub fn generate_simple_motion_profile(
    start: MotionState,
    goal: MotionState,
    max_vel: f64,
    max_accel: f64
) -> Result<MotionProfile, ProfileError> {
    if !(max_vel > 0.0) {
        return Err(ProfileError::UnsatisfiableConstraint { s: start.x });
    }
    if !(max_accel > 0.0) {
        return Err(ProfileError::UnsatisfiableConstraint { s: start.x });
    }

    if goal.x < start.x {
        return Ok(simple_forward(start.flipped(), goal.flipped(), max_vel, max_accel)?.flipped());
    }

    simple_forward(start, goal, max_vel, max_accel)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn generate_forward<V, A>(
    start: MotionState,
    goal: MotionState,
    vel_fn: V,
    accel_fn: A,
    resolution: f64
) -> Result<MotionProfile, ProfileError>
where
    V: Fn(f64) -> Result<f64, ConstraintError>,
    A: Fn(f64) -> Result<f64, ConstraintError>
{
    let length = goal.x - start.x;
    let num_intervals = ((length / resolution).ceil() as usize).max(1);
    let ds = length / num_intervals as f64;

    let xs: Vec<f64> = (0..=num_intervals).map(|i| start.x + ds * i as f64).collect();

    // Sample the bounds
    let mut max_vels = Vec::with_capacity(xs.len());
    let mut max_accels = Vec::with_capacity(xs.len());
    for &x in &xs {
        let unsatisfiable = |_| ProfileError::UnsatisfiableConstraint { s: x };

        let max_vel = vel_fn(x).map_err(unsatisfiable)?;
        if max_vel.is_nan() || max_vel < 0.0 {
            return Err(ProfileError::UnsatisfiableConstraint { s: x });
        }

        let max_accel = accel_fn(x).map_err(unsatisfiable)?;
        if max_accel.is_nan() || max_accel <= 0.0 {
            return Err(ProfileError::UnsatisfiableConstraint { s: x });
        }

        max_vels.push(max_vel);
        max_accels.push(max_accel);
    }

    // Forward pass
    let mut vels = Vec::with_capacity(xs.len());
    vels.push(start.v.min(max_vels[0]));
    for i in 0..num_intervals {
        let reachable = (vels[i] * vels[i] + 2.0 * max_accels[i] * ds).sqrt();
        vels.push(max_vels[i + 1].min(reachable));
    }

    // Backward pass
    vels[num_intervals] = vels[num_intervals].min(goal.v);
    for i in (0..num_intervals).rev() {
        let reachable = (vels[i + 1] * vels[i + 1] + 2.0 * max_accels[i] * ds).sqrt();
        vels[i] = vels[i].min(reachable);
    }

    // Integrate time
    let mut samples = Vec::with_capacity(xs.len());
    let mut t = 0.0;
    for i in 0..num_intervals {
        // Clamped so a stationary step, e.g. over zero length, has a finite dt
        let mean_vel = (0.5 * (vels[i] + vels[i + 1])).max(std::f64::MIN_POSITIVE);
        let dt = ds / mean_vel;
        let a = if dt > 0.0 { (vels[i + 1] - vels[i]) / dt } else { 0.0 };

        samples.push(ProfileSample {
            t,
            x: xs[i],
            v: vels[i],
            a,
        });
        t += dt;
    }
    samples.push(ProfileSample {
        t,
        x: xs[num_intervals],
        v: vels[num_intervals],
        a: 0.0,
    });

    debug!(
        "Generated profile over {:.3} in {:.3} s with {} samples, peak velocity {:.3}",
        length,
        t,
        samples.len(),
        vels.iter().cloned().fold(0.0, f64::max)
    );

    MotionProfile::new(samples)
}

fn simple_forward(
    start: MotionState,
    goal: MotionState,
    max_vel: f64,
    max_accel: f64
) -> Result<MotionProfile, ProfileError> {
    let d = goal.x - start.x;
    let v0 = start.v.max(0.0).min(max_vel);
    let v1 = goal.v.max(0.0).min(max_vel);

    // Peak velocity if accelerating then decelerating with no cruise
    let peak_sq = max_accel * d + 0.5 * (v0 * v0 + v1 * v1);

    // Phases of (duration, acceleration) from the start state
    let mut phases: Vec<(f64, f64)> = Vec::with_capacity(3);

    if peak_sq >= max_vel * max_vel {
        let accel_dist = (max_vel * max_vel - v0 * v0) / (2.0 * max_accel);
        let decel_dist = (max_vel * max_vel - v1 * v1) / (2.0 * max_accel);
        let cruise_dist = d - accel_dist - decel_dist;

        phases.push(((max_vel - v0) / max_accel, max_accel));
        phases.push((cruise_dist / max_vel, 0.0));
        phases.push(((max_vel - v1) / max_accel, -max_accel));
    }
    else {
        let peak = peak_sq.max(0.0).sqrt();

        if peak < v0 {
            // Can't slow to the goal velocity in time, brake the whole way
            let end = (v0 * v0 - 2.0 * max_accel * d).max(0.0).sqrt();
            phases.push(((v0 - end) / max_accel, -max_accel));
        }
        else if peak < v1 {
            // Can't reach the goal velocity in time, accelerate the whole way
            let end = (v0 * v0 + 2.0 * max_accel * d).sqrt();
            phases.push(((end - v0) / max_accel, max_accel));
        }
        else {
            phases.push(((peak - v0) / max_accel, max_accel));
            phases.push(((peak - v1) / max_accel, -max_accel));
        }
    }

    let mut samples = Vec::with_capacity(phases.len() + 1);
    let mut t = 0.0;
    let mut state = MotionState::new(start.x, v0, 0.0);
    for (dt, a) in phases {
        if dt <= 0.0 {
            continue;
        }

        state.a = a;
        samples.push(ProfileSample {
            t,
            x: state.x,
            v: state.v,
            a,
        });

        state = state.after(dt);
        t += dt;
    }
    samples.push(ProfileSample {
        t,
        x: state.x,
        v: state.v,
        a: 0.0,
    });

    MotionProfile::new(samples)
}

fn default_resolution() -> f64 {
    DEFAULT_RESOLUTION
}
