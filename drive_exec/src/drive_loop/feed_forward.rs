//! Profile feed-forward

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::profile::TrajSample;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Open loop voltage from a profile sample, `k_v * v + k_a * a`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedForward {
    /// Units: volts per foot/second
    pub k_v: f64,

    /// Units: volts per inch/second^2
    pub k_a: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FeedForward {
    pub fn new(k_v: f64, k_a: f64) -> Self {
        Self { k_v, k_a }
    }

    /// Units: volts
    pub fn output(&self, sample: &TrajSample) -> f64 {
        self.k_v * sample.vel + self.k_a * sample.acc
    }
}

impl Default for FeedForward {
    /// Empirical fit for the default robot.
    fn default() -> Self {
        Self {
            k_v: 1.07,
            k_a: 0.005,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output() {
        let ff = FeedForward::new(1.0, 0.01);
        assert_eq!(ff.output(&TrajSample::new(50.0, 6.0, 100.0)), 7.0);
        assert_eq!(ff.output(&TrajSample::default()), 0.0);
    }
}
