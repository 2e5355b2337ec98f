//! # Simulation parameters
//!
//! Every tunable constant of the simulation, loaded from `drive_sim.toml`. Any table or key left
//! out of the file takes its default.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use crate::{
    cmd::DEFAULT_TIMEOUT_S, drive_loop::FeedForward, pid::GainSet, plant, pursuit::PursuitParams,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default tick period (200 Hz).
///
/// Units: seconds
pub const UPDATE_PERIOD: f64 = 0.005;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the drive simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Tick period of the control loop and the plant.
    ///
    /// Units: seconds
    pub dt: f64,

    /// Physical description of the robot.
    pub robot: plant::Params,

    /// Regulator gains for drive distance and closed loop profile following.
    pub profile_gains: GainSet,

    /// Regulator gains for turn angle and drive to goal.
    pub p2p_gains: GainSet,

    /// Feed-forward used when following profiles.
    pub feed_forward: FeedForward,

    /// Pure pursuit tuning.
    pub pursuit: PursuitParams,

    /// Time after which a command with no timeout of its own is abandoned.
    ///
    /// Units: seconds
    pub default_timeout_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            dt: UPDATE_PERIOD,
            robot: plant::Params::default(),
            profile_gains: GainSet::PROFILE,
            p2p_gains: GainSet::P2P,
            feed_forward: FeedForward::default(),
            pursuit: PursuitParams::default(),
            default_timeout_s: DEFAULT_TIMEOUT_S,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pid::PidGains;
    use crate::plant::MotorKind;

    #[test]
    fn test_partial_file() {
        let params: SimParams = util::params::from_str(
            r#"
            dt = 0.01

            [robot]
            mass_lb = 120.0
            motor = "falcon500"

            [p2p_gains.drive]
            k_p = 0.5

            [p2p_gains.turn]
            k_p = 7.5
            "#,
        )
        .unwrap();

        assert_eq!(params.dt, 0.01);
        assert_eq!(params.robot.mass_lb, 120.0);
        assert_eq!(params.robot.motor, MotorKind::Falcon500);
        assert_eq!(params.robot.gear_ratio, 8.5521);
        assert_eq!(params.p2p_gains.drive, PidGains::new(0.5, 0.0, 0.0));
        assert_eq!(params.p2p_gains.turn, PidGains::new(7.5, 0.0, 0.0));
        assert_eq!(params.profile_gains, GainSet::PROFILE);
        assert_eq!(params.pursuit.lookahead, 18.0);
        assert_eq!(params.default_timeout_s, 10.0);
    }

    #[test]
    fn test_shipped_file_matches_defaults() {
        let params: SimParams = util::params::load_from_path(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../params/drive_sim.toml"
        ))
        .unwrap();
        let default = SimParams::default();

        assert_eq!(params.dt, default.dt);
        assert_eq!(params.robot.gear_ratio, default.robot.gear_ratio);
        assert_eq!(params.robot.motor, default.robot.motor);
        assert_eq!(params.profile_gains, GainSet::PROFILE);
        assert_eq!(params.p2p_gains, GainSet::P2P);
        assert_eq!(params.feed_forward, default.feed_forward);
        assert_eq!(params.default_timeout_s, default.default_timeout_s);
    }

    #[test]
    fn test_empty_file_is_default() {
        let params: SimParams = util::params::from_str("").unwrap();
        assert_eq!(params.dt, UPDATE_PERIOD);
        assert_eq!(params.feed_forward, FeedForward::default());
        assert_eq!(params.default_timeout_s, DEFAULT_TIMEOUT_S);
    }
}
