//! # Profile module
//!
//! Precomputed motion profiles. Each profile is a read-only table of per-wheel samples built once
//! at construction and queried by elapsed time.
//!
//! Table units follow the drive loop's feed-forward: positions in inches, velocities in
//! feet/second and accelerations in inches/second^2.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod bezier;
mod bezier_profile;
mod jerk;
mod trapezoidal;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use bezier::*;
pub use bezier_profile::*;
pub use jerk::*;
pub use trapezoidal::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Read surface shared by every profile.
pub trait DriveProfile: std::fmt::Debug {
    /// Sample for the left wheel at the given elapsed time.
    fn left_sample(&self, time_s: f64) -> TrajSample;

    /// Sample for the right wheel at the given elapsed time.
    fn right_sample(&self, time_s: f64) -> TrajSample;

    /// Units: seconds
    fn total_time(&self) -> f64;

    /// Units: inches
    fn total_distance(&self) -> f64;

    /// Number of samples in the table.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One entry of a profile table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TrajSample {
    /// Units: inches
    pub pos: f64,

    /// Units: feet/second
    pub vel: f64,

    /// Units: inches/second^2
    pub acc: f64,
}

/// A table sampled at a fixed tick period, shared by both wheels.
#[derive(Debug, Clone)]
pub(crate) struct TickTable {
    samples: Vec<TrajSample>,
    dt: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Profile {0} must be positive and finite, got {1}")]
    NotPositive(&'static str, f64),

    #[error("A quintic Bezier curve needs exactly 6 control points, got {0}")]
    ControlPoints(usize),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrajSample {
    pub fn new(pos: f64, vel: f64, acc: f64) -> Self {
        Self { pos, vel, acc }
    }
}

impl TickTable {
    pub(crate) fn new(samples: Vec<TrajSample>, dt: f64) -> Self {
        Self { samples, dt }
    }

    /// Sample at index `floor(time / dt)`, clamped to the table.
    pub(crate) fn at(&self, time_s: f64) -> TrajSample {
        if self.samples.is_empty() {
            return TrajSample::default();
        }

        let last = self.samples.len() - 1;
        let index = if time_s <= 0.0 {
            0
        } else {
            ((time_s / self.dt).floor() as usize).min(last)
        };

        self.samples[index]
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    pub(crate) fn samples(&self) -> &[TrajSample] {
        &self.samples
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Check that a profile input is positive and finite.
pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<f64, ProfileError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ProfileError::NotPositive(name, value))
    }
}
