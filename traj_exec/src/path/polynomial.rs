//! # Quintic polynomials
//!
//! A quintic is the lowest order polynomial which can match a value, first derivative and second
//! derivative at both ends of an interval, which is what continuous splines and heading blends
//! need.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Quintic polynomial `a t^5 + b t^4 + c t^3 + d t^2 + e t + f` over `t` in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuinticPolynomial {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl QuinticPolynomial {
    /// Fit the polynomial to the value and first two derivatives at `t = 0` and `t = 1`.
    pub fn new(
        start: f64,
        start_deriv: f64,
        start_second_deriv: f64,
        end: f64,
        end_deriv: f64,
        end_second_deriv: f64
    ) -> Self {
        // The t = 0 conditions fix the three lowest order coefficients directly
        let f = start;
        let e = start_deriv;
        let d = 0.5 * start_second_deriv;

        // What the high order terms must contribute at t = 1
        let rem_val = end - (d + e + f);
        let rem_deriv = end_deriv - (2.0 * d + e);
        let rem_second_deriv = end_second_deriv - 2.0 * d;

        Self {
            a: 6.0 * rem_val - 3.0 * rem_deriv + 0.5 * rem_second_deriv,
            b: -15.0 * rem_val + 7.0 * rem_deriv - rem_second_deriv,
            c: 10.0 * rem_val - 4.0 * rem_deriv + 0.5 * rem_second_deriv,
            d,
            e,
            f,
        }
    }

    pub fn get(&self, t: f64) -> f64 {
        ((((self.a * t + self.b) * t + self.c) * t + self.d) * t + self.e) * t + self.f
    }

    pub fn deriv(&self, t: f64) -> f64 {
        (((5.0 * self.a * t + 4.0 * self.b) * t + 3.0 * self.c) * t + 2.0 * self.d) * t + self.e
    }

    pub fn second_deriv(&self, t: f64) -> f64 {
        ((20.0 * self.a * t + 12.0 * self.b) * t + 6.0 * self.c) * t + 2.0 * self.d
    }

    pub fn third_deriv(&self, t: f64) -> f64 {
        (60.0 * self.a * t + 24.0 * self.b) * t + 6.0 * self.c
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use util::maths::epsilon_eq;

    #[test]
    fn test_boundary_conditions() {
        let poly = QuinticPolynomial::new(1.0, -2.0, 3.0, 4.0, 5.0, -6.0);

        assert!(epsilon_eq(poly.get(0.0), 1.0));
        assert!(epsilon_eq(poly.deriv(0.0), -2.0));
        assert!(epsilon_eq(poly.second_deriv(0.0), 3.0));
        assert!(epsilon_eq(poly.get(1.0), 4.0));
        assert!(epsilon_eq(poly.deriv(1.0), 5.0));
        assert!(epsilon_eq(poly.second_deriv(1.0), -6.0));
    }

    #[test]
    fn test_third_deriv() {
        let poly = QuinticPolynomial::new(0.0, 1.0, 0.5, 2.0, -1.0, 0.0);
        let h = 1e-5;

        // Compare against a central difference of the second derivative
        for &t in &[0.1, 0.5, 0.9] {
            let numeric = (poly.second_deriv(t + h) - poly.second_deriv(t - h)) / (2.0 * h);
            assert!((numeric - poly.third_deriv(t)).abs() < 1e-4);
        }
    }
}
