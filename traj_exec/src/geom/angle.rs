//! Angle arithmetic with wrap-around at +/- pi.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::{get_ang_dist, norm_angle};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Normalise an angle into (-pi, pi].
pub fn norm(angle_rad: f64) -> f64 {
    norm_angle(angle_rad)
}

/// The signed shortest rotation taking `from` onto `to`.
pub fn delta(from_rad: f64, to_rad: f64) -> f64 {
    get_ang_dist(from_rad, to_rad)
}
