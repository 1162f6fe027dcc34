//! # PIDF controller
//!
//! A single axis PID controller with velocity, acceleration, static friction and custom
//! feedforward terms.
//!
//! The controller is timestamped rather than given a time step, so it can be updated at an
//! irregular rate. The first update after construction or a reset has no previous sample to
//! integrate or differentiate against, so it contributes only the proportional and feedforward
//! terms.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use util::maths::{wrap_to_range, EPSILON};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains and limits of a [`PidfController`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PidfParams {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Derivative gain
    pub k_d: f64,

    /// Velocity feedforward gain
    #[serde(default)]
    pub k_v: f64,

    /// Acceleration feedforward gain
    #[serde(default)]
    pub k_a: f64,

    /// Static friction feedforward, added in the direction of the output
    #[serde(default)]
    pub k_static: f64,

    /// Derivative low pass filter coefficient. If not given the derivative isn't filtered.
    #[serde(default)]
    pub derivative_filter_n: Option<f64>,

    /// Range of a modular input, e.g. `[-pi, pi]` for an angle. Errors are wrapped into half this
    /// range either side of zero.
    #[serde(default)]
    pub input_bounds: Option<(f64, f64)>,

    /// Output limits
    #[serde(default)]
    pub output_bounds: Option<(f64, f64)>,

    /// Error below which the controller is at its set point
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

/// A PID controller with feedforward.
pub struct PidfController {
    params: PidfParams,

    target_position: f64,
    target_velocity: f64,
    target_acceleration: f64,

    /// Integral of the error
    error_sum: f64,

    /// Error and timestamp of the last update
    last_error: Option<f64>,
    last_update_timestamp: Option<f64>,

    /// Output of the derivative filter
    filtered_deriv: f64,

    custom_feedforward: Option<Box<dyn Fn(f64, Option<f64>) -> f64 + Send>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PidfParams {
    fn default() -> Self {
        Self {
            k_p: 0.0,
            k_i: 0.0,
            k_d: 0.0,
            k_v: 0.0,
            k_a: 0.0,
            k_static: 0.0,
            derivative_filter_n: None,
            input_bounds: None,
            output_bounds: None,
            tolerance: default_tolerance(),
        }
    }
}

impl PidfParams {
    /// Proportional, integral and derivative gains with no feedforward or limits.
    pub fn pid(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            ..Self::default()
        }
    }
}

impl PidfController {
    pub fn new(params: PidfParams) -> Self {
        Self {
            params,
            target_position: 0.0,
            target_velocity: 0.0,
            target_acceleration: 0.0,
            error_sum: 0.0,
            last_error: None,
            last_update_timestamp: None,
            filtered_deriv: 0.0,
            custom_feedforward: None,
        }
    }

    /// Add a feedforward term computed from the measured position and velocity.
    pub fn set_custom_feedforward<F>(&mut self, feedforward: F)
    where
        F: Fn(f64, Option<f64>) -> f64 + Send + 'static
    {
        self.custom_feedforward = Some(Box::new(feedforward));
    }

    pub fn params(&self) -> &PidfParams {
        &self.params
    }

    pub fn set_target(&mut self, position: f64, velocity: f64, acceleration: f64) {
        self.target_position = position;
        self.target_velocity = velocity;
        self.target_acceleration = acceleration;
    }

    pub fn error_sum(&self) -> f64 {
        self.error_sum
    }

    pub fn last_error(&self) -> Option<f64> {
        self.last_error
    }

    /// True once the last error was within the tolerance.
    pub fn is_at_set_point(&self) -> bool {
        match self.last_error {
            Some(e) => e.abs() <= self.params.tolerance,
            None => false,
        }
    }

    /// Clear the integral, the last error and the timestamp baseline.
    pub fn reset(&mut self) {
        self.error_sum = 0.0;
        self.last_error = None;
        self.last_update_timestamp = None;
        self.filtered_deriv = 0.0;
    }

    /// Error between the target and a measured position, wrapped if the input is modular.
    pub fn error(&self, measured_position: f64) -> f64 {
        let error = self.target_position - measured_position;

        match self.params.input_bounds {
            Some((min, max)) => wrap_to_range(error, min, max),
            None => error,
        }
    }

    /// Compute the controller output.
    ///
    /// # Inputs
    /// - `timestamp_s`: time of the measurement in seconds.
    /// - `measured_position`: the measured position.
    /// - `measured_velocity`: the measured velocity, if known. If not the derivative term uses the
    ///   rate of change of the error.
    pub fn update(
        &mut self,
        timestamp_s: f64,
        measured_position: f64,
        measured_velocity: Option<f64>
    ) -> f64 {
        let error = self.error(measured_position);

        let mut integral_increment = 0.0;
        let deriv = match (self.last_update_timestamp, self.last_error) {
            (Some(last_timestamp), Some(last_error)) if timestamp_s > last_timestamp => {
                let dt = timestamp_s - last_timestamp;

                // Trapezoidal integration
                integral_increment = 0.5 * (error + last_error) * dt;
                self.error_sum += integral_increment;

                let raw_deriv = match measured_velocity {
                    Some(v) => self.target_velocity - v,
                    None => (error - last_error) / dt,
                };

                match self.params.derivative_filter_n {
                    Some(n) => {
                        let alpha = n * dt / (1.0 + n * dt);
                        self.filtered_deriv += alpha * (raw_deriv - self.filtered_deriv);
                    }
                    None => self.filtered_deriv = raw_deriv,
                }

                self.filtered_deriv
            }
            (Some(_), Some(_)) => self.filtered_deriv,
            _ => 0.0,
        };

        let feedforward = self.params.k_v * self.target_velocity
            + self.params.k_a * self.target_acceleration
            + self
                .custom_feedforward
                .as_ref()
                .map_or(0.0, |ff| ff(measured_position, measured_velocity));

        let base_output = self.params.k_p * error
            + self.params.k_i * self.error_sum
            + self.params.k_d * deriv
            + feedforward;

        let mut output = if base_output.abs() < EPSILON {
            0.0
        }
        else {
            base_output + base_output.signum() * self.params.k_static
        };

        if let Some((min, max)) = self.params.output_bounds {
            let clamped = output.max(min).min(max);

            // Anti-windup, don't integrate further into saturation
            if clamped != output && error.signum() == output.signum() {
                self.error_sum -= integral_increment;
            }

            output = clamped;
        }

        self.last_error = Some(error);
        self.last_update_timestamp = Some(timestamp_s);

        output
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn default_tolerance() -> f64 {
    1e-3
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;
    use util::maths::epsilon_eq;

    #[test]
    fn test_at_set_point_gives_feedforward() {
        let mut ctrl = PidfController::new(PidfParams {
            k_v: 0.5,
            k_a: 0.1,
            ..PidfParams::pid(2.0, 1.0, 0.3)
        });
        ctrl.set_target(1.0, 2.0, 3.0);

        let out = ctrl.update(0.0, 1.0, Some(2.0));
        assert!(epsilon_eq(out, 0.5 * 2.0 + 0.1 * 3.0));
        assert!(ctrl.is_at_set_point());

        // Staying on target adds nothing from the feedback terms
        let out = ctrl.update(0.1, 1.0, Some(2.0));
        assert!(epsilon_eq(out, 1.3));
    }

    #[test]
    fn test_trapezoidal_integral_and_reset() {
        let mut ctrl = PidfController::new(PidfParams::pid(0.0, 1.0, 0.0));
        ctrl.set_target(1.0, 0.0, 0.0);

        // No integral on the first update
        assert_eq!(ctrl.update(0.0, 0.0, None), 0.0);

        // Mean error of 0.75 over 2 s
        ctrl.update(2.0, 0.5, None);
        assert!(epsilon_eq(ctrl.error_sum(), 1.5));

        ctrl.reset();
        assert_eq!(ctrl.error_sum(), 0.0);
        assert!(ctrl.last_error().is_none());
        assert!(!ctrl.is_at_set_point());
    }

    #[test]
    fn test_anti_windup() {
        let mut ctrl = PidfController::new(PidfParams {
            output_bounds: Some((-1.0, 1.0)),
            ..PidfParams::pid(1.0, 1.0, 0.0)
        });
        ctrl.set_target(10.0, 0.0, 0.0);

        for i in 0..10 {
            let out = ctrl.update(i as f64, 0.0, None);
            assert_eq!(out, 1.0);
            assert_eq!(ctrl.error_sum(), 0.0);
        }

        // An error opposing the saturated output still integrates
        let mut ctrl = PidfController::new(PidfParams {
            k_v: 10.0,
            output_bounds: Some((-1.0, 1.0)),
            ..PidfParams::pid(1.0, 1.0, 0.0)
        });
        ctrl.set_target(-0.5, 1.0, 0.0);
        assert_eq!(ctrl.update(0.0, 0.0, None), 1.0);
        assert_eq!(ctrl.update(1.0, 0.0, None), 1.0);
        assert!(epsilon_eq(ctrl.error_sum(), -0.5));
    }

    #[test]
    fn test_derivative_sources() {
        // From the measured velocity
        let mut ctrl = PidfController::new(PidfParams::pid(0.0, 0.0, 1.0));
        ctrl.set_target(0.0, 1.0, 0.0);
        assert_eq!(ctrl.update(0.0, 0.0, Some(0.0)), 0.0);
        assert!(epsilon_eq(ctrl.update(1.0, 0.0, Some(0.25)), 0.75));

        // From the change in error
        let mut ctrl = PidfController::new(PidfParams::pid(0.0, 0.0, 1.0));
        ctrl.set_target(1.0, 0.0, 0.0);
        ctrl.update(0.0, 0.0, None);
        assert!(epsilon_eq(ctrl.update(0.5, 0.5, None), -1.0));
    }

    #[test]
    fn test_derivative_filter() {
        let mut ctrl = PidfController::new(PidfParams {
            derivative_filter_n: Some(1.0),
            ..PidfParams::pid(0.0, 0.0, 1.0)
        });
        ctrl.set_target(0.0, 0.0, 0.0);

        // A step in the raw derivative of 2 approached with alpha = 0.5
        ctrl.update(0.0, 0.0, Some(-2.0));
        assert!(epsilon_eq(ctrl.update(1.0, 0.0, Some(-2.0)), 1.0));
        assert!(epsilon_eq(ctrl.update(2.0, 0.0, Some(-2.0)), 1.5));
        assert!(epsilon_eq(ctrl.update(3.0, 0.0, Some(-2.0)), 1.75));
    }

    #[test]
    fn test_input_wrap() {
        let mut ctrl = PidfController::new(PidfParams {
            input_bounds: Some((-PI, PI)),
            ..PidfParams::pid(1.0, 0.0, 0.0)
        });
        ctrl.set_target(PI - 0.1, 0.0, 0.0);

        // The short way round is negative
        assert!(epsilon_eq(ctrl.update(0.0, -PI + 0.1, None), -0.2));
    }

    #[test]
    fn test_static_friction() {
        let mut ctrl = PidfController::new(PidfParams {
            k_static: 0.1,
            ..PidfParams::pid(1.0, 0.0, 0.0)
        });

        ctrl.set_target(2.0, 0.0, 0.0);
        assert!(epsilon_eq(ctrl.update(0.0, 0.0, None), 2.1));

        ctrl.set_target(-2.0, 0.0, 0.0);
        assert!(epsilon_eq(ctrl.update(1.0, 0.0, None), -2.1));

        // None when there's nothing to overcome
        ctrl.set_target(0.0, 0.0, 0.0);
        assert_eq!(ctrl.update(2.0, 0.0, None), 0.0);
    }

    #[test]
    fn test_custom_feedforward() {
        let mut ctrl = PidfController::new(PidfParams::default());
        ctrl.set_custom_feedforward(|position, _| 0.5 * position.cos());

        assert!(epsilon_eq(ctrl.update(0.0, 0.0, None), 0.5));
    }

    #[test]
    fn test_toml_params() {
        let params: PidfParams = toml::from_str(
            r#"
            k_p = 1.0
            k_i = 0.0
            k_d = 0.1
            input_bounds = [-3.141592653589793, 3.141592653589793]
            "#
        )
        .unwrap();

        assert_eq!(params.k_v, 0.0);
        assert!(params.output_bounds.is_none());
        assert!(params.input_bounds.is_some());
    }
}
