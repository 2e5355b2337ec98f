//! Pure pursuit parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tuning of the pure pursuit tracker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuitParams {
    // ---- SEEK ----
    /// Time taken to ramp from rest to `max_speed`.
    ///
    /// Units: seconds
    pub acc_time: f64,

    /// Angular output per radian of turn error.
    ///
    /// Units: volts/radian
    pub turn_const: f64,

    /// Largest linear output.
    ///
    /// Units: volts
    pub max_speed: f64,

    /// Drive the path backwards.
    pub reverse: bool,

    // ---- ARRIVE ----
    /// Distance from the final waypoint at which the robot starts slowing down.
    ///
    /// Units: inches
    pub goal_dist: f64,

    /// Distance at which a waypoint counts as reached.
    ///
    /// Units: inches
    pub end_dist: f64,

    // ---- PATH ----
    /// Radius of the lookahead circle.
    ///
    /// Units: inches
    pub lookahead: f64,

    /// Spacing of waypoints generated from a curve.
    ///
    /// Units: inches
    pub spacing: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PursuitParams {
    fn default() -> Self {
        Self {
            acc_time: 0.25,
            turn_const: 22.0,
            max_speed: 12.0,
            reverse: false,
            goal_dist: 30.0,
            end_dist: 3.0,
            lookahead: 18.0,
            spacing: 24.0,
        }
    }
}
