//! PID gain parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains of one PID regulator.
///
/// Units: volts per unit of error (inches for drive, radians for turn)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidGains {
    pub k_p: f64,

    #[serde(default)]
    pub k_i: f64,

    #[serde(default)]
    pub k_d: f64,
}

/// Gains for both regulators, tuned for one style of motion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainSet {
    pub drive: PidGains,
    pub turn: PidGains,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidGains {
    pub const fn new(k_p: f64, k_i: f64, k_d: f64) -> Self {
        Self { k_p, k_i, k_d }
    }

    /// Drive gains tuned for linear profile following.
    pub const DRIVE_PROFILE: PidGains = PidGains::new(0.9, 0.0, 0.13);

    /// Turn gains tuned for curve following.
    pub const TURN_PROFILE: PidGains = PidGains::new(0.06, 0.0, 0.05);

    /// Drive gains tuned for point to point moves.
    pub const DRIVE_P2P: PidGains = PidGains::new(0.3, 0.0, 1.25);

    /// Turn gains tuned for point to point moves.
    pub const TURN_P2P: PidGains = PidGains::new(7.5, 0.0, 0.05);
}

impl GainSet {
    /// Gains for following profiles and driving set distances.
    pub const PROFILE: GainSet = GainSet {
        drive: PidGains::DRIVE_PROFILE,
        turn: PidGains::TURN_PROFILE,
    };

    /// Gains for turning on the spot and driving to points.
    pub const P2P: GainSet = GainSet {
        drive: PidGains::DRIVE_P2P,
        turn: PidGains::TURN_P2P,
    };
}
