//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::{Float, FloatConst};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance used for approximate floating point comparisons.
pub const EPSILON: f64 = 1e-6;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Returns true if the two values are within [`EPSILON`] of each other.
pub fn epsilon_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Normalise an angle into the range (-pi, pi].
pub fn norm_angle<T>(angle: T) -> T
where
    T: Float + FloatConst
{
    let pi_t = T::PI();
    let tau_t = pi_t + pi_t;

    let r = rem_euclid(angle, tau_t);

    if r > pi_t {
        r - tau_t
    }
    else {
        r
    }
}

/// Get the signed angular distance from `a` to `b`.
///
/// This function will return the shortest signed distance between a and b accounting for wrapping,
/// so that `norm_angle(a + get_ang_dist(a, b)) == norm_angle(b)`. The result is in (-pi, pi].
pub fn get_ang_dist<T>(a: T, b: T) -> T
where
    T: Float + FloatConst
{
    norm_angle(b - a)
}

/// Wrap a value (usually an error) into the range `[-(max - min)/2, (max - min)/2)`.
///
/// Used for modular quantities where the shortest signed distance within a range is wanted.
pub fn wrap_to_range<T>(value: T, min: T, max: T) -> T
where
    T: Float
{
    let range = max - min;
    let half = range / (T::one() + T::one());

    rem_euclid(value + half, range) - half
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float
{
    let r = lhs % rhs;
    if r < T::zero() { r + rhs.abs() } else { r }
}
