//! # Motion profiles
//!
//! A motion profile is a one dimensional schedule of displacement, velocity and acceleration
//! against time. It's stored as samples with constant acceleration between consecutive samples, so
//! the profile is piecewise quadratic in time.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

use super::ProfileError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Displacement, velocity and acceleration at an instant.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionState {
    pub x: f64,
    pub v: f64,
    #[serde(default)]
    pub a: f64,
}

/// One sample of a profile. The acceleration holds until the next sample.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSample {
    pub t: f64,
    pub x: f64,
    pub v: f64,
    pub a: f64,
}

/// A time parametrised motion profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ProfileSample>", into = "Vec<ProfileSample>")]
pub struct MotionProfile {
    samples: Vec<ProfileSample>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotionState {
    pub fn new(x: f64, v: f64, a: f64) -> Self {
        Self { x, v, a }
    }

    /// The state after `dt` seconds at constant acceleration.
    pub fn after(&self, dt: f64) -> Self {
        Self {
            x: self.x + self.v * dt + 0.5 * self.a * dt * dt,
            v: self.v + self.a * dt,
            a: self.a,
        }
    }

    /// The same state with all quantities negated.
    pub fn flipped(&self) -> Self {
        Self::new(-self.x, -self.v, -self.a)
    }
}

impl ProfileSample {
    pub fn state(&self) -> MotionState {
        MotionState::new(self.x, self.v, self.a)
    }
}

impl MotionProfile {
    /// Create a profile from its samples, which must be non-empty and ordered in time.
    pub fn new(samples: Vec<ProfileSample>) -> Result<Self, ProfileError> {
        if samples.is_empty() {
            return Err(ProfileError::EmptyProfile);
        }

        Ok(Self { samples })
    }

    pub fn samples(&self) -> &[ProfileSample] {
        &self.samples
    }

    /// Total time taken by the profile.
    pub fn duration(&self) -> f64 {
        self.last().t
    }

    /// Displacement covered by the profile.
    pub fn length(&self) -> f64 {
        self.last().x - self.samples[0].x
    }

    pub fn start(&self) -> MotionState {
        self.samples[0].state()
    }

    /// The final state, at rest in acceleration.
    pub fn end(&self) -> MotionState {
        let last = self.last();
        MotionState::new(last.x, last.v, 0.0)
    }

    /// The state at time `t`. Times before the start give the start state and times after the end
    /// give the end state. A NaN time gives the start state.
    pub fn get(&self, t: f64) -> MotionState {
        if !(t > 0.0) {
            return self.start();
        }
        if t >= self.duration() {
            return self.end();
        }

        // Last sample at or before t, never the final sample since t < duration
        let i = self.samples.partition_point(|sample| sample.t <= t) - 1;
        let sample = &self.samples[i];

        sample.state().after(t - sample.t)
    }

    /// Time at which the profile first reaches displacement `x`, clamped to the profile.
    pub fn time_at_displacement(&self, x: f64) -> f64 {
        // Work in the direction of travel so displacement is increasing
        let sign = if self.last().x < self.samples[0].x { -1.0 } else { 1.0 };
        let target = sign * x;

        if target <= sign * self.samples[0].x {
            return 0.0;
        }
        if target >= sign * self.last().x {
            return self.duration();
        }

        let i = self
            .samples
            .partition_point(|sample| sign * sample.x <= target)
            .max(1)
            - 1;
        let sample = &self.samples[i];

        let d = target - sign * sample.x;
        let v = sign * sample.v;
        let a = sign * sample.a;

        let dt = if a.abs() < 1e-12 {
            if v > 0.0 { d / v } else { 0.0 }
        }
        else {
            (-v + (v * v + 2.0 * a * d).max(0.0).sqrt()) / a
        };

        let max_dt = match self.samples.get(i + 1) {
            Some(next) => next.t - sample.t,
            None => 0.0,
        };

        sample.t + dt.max(0.0).min(max_dt)
    }

    /// The mirrored profile, with displacement, velocity and acceleration negated.
    pub fn flipped(&self) -> Self {
        Self {
            samples: self
                .samples
                .iter()
                .map(|s| ProfileSample {
                    t: s.t,
                    x: -s.x,
                    v: -s.v,
                    a: -s.a,
                })
                .collect(),
        }
    }

    fn last(&self) -> &ProfileSample {
        &self.samples[self.samples.len() - 1]
    }
}

impl TryFrom<Vec<ProfileSample>> for MotionProfile {
    type Error = ProfileError;

    fn try_from(samples: Vec<ProfileSample>) -> Result<Self, Self::Error> {
        MotionProfile::new(samples)
    }
}

impl From<MotionProfile> for Vec<ProfileSample> {
    fn from(profile: MotionProfile) -> Self {
        profile.samples
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use util::maths::epsilon_eq;

    /// Accelerate at 1 for 2 s then cruise for 1 s.
    fn test_profile() -> MotionProfile {
        MotionProfile::new(vec![
            ProfileSample { t: 0.0, x: 0.0, v: 0.0, a: 1.0 },
            ProfileSample { t: 2.0, x: 2.0, v: 2.0, a: 0.0 },
            ProfileSample { t: 3.0, x: 4.0, v: 2.0, a: 0.0 },
        ])
        .unwrap()
    }

    #[test]
    fn test_get() {
        let profile = test_profile();

        assert!(epsilon_eq(profile.duration(), 3.0));
        assert!(epsilon_eq(profile.length(), 4.0));

        let state = profile.get(1.0);
        assert!(epsilon_eq(state.x, 0.5));
        assert!(epsilon_eq(state.v, 1.0));
        assert!(epsilon_eq(state.a, 1.0));

        let state = profile.get(2.5);
        assert!(epsilon_eq(state.x, 3.0));

        // Clamped at both ends
        assert_eq!(profile.get(-1.0), profile.start());
        assert_eq!(profile.get(10.0), MotionState::new(4.0, 2.0, 0.0));
        assert_eq!(profile.get(f64::NAN), profile.start());
    }

    #[test]
    fn test_time_at_displacement() {
        let profile = test_profile();

        assert!(epsilon_eq(profile.time_at_displacement(0.5), 1.0));
        assert!(epsilon_eq(profile.time_at_displacement(3.0), 2.5));
        assert!(epsilon_eq(profile.time_at_displacement(-1.0), 0.0));
        assert!(epsilon_eq(profile.time_at_displacement(5.0), 3.0));

        // Same times on the mirrored profile
        let flipped = profile.flipped();
        assert!(epsilon_eq(flipped.time_at_displacement(-0.5), 1.0));
        assert!(epsilon_eq(flipped.get(2.5).x, -3.0));
    }

    #[test]
    fn test_empty_profile() {
        assert_eq!(MotionProfile::new(vec![]), Err(ProfileError::EmptyProfile));
        assert!(serde_json::from_str::<MotionProfile>("[]").is_err());
    }
}
