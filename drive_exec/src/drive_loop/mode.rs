//! Drive loop modes

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use crate::{geom::Point, profile::DriveProfile};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The active mode of the drive loop, carrying the setpoints only that mode uses.
#[derive(Debug, Clone)]
pub enum DriveMode {
    /// Hold the robot at rest.
    Waiting,

    /// Drive straight to an average wheel position while holding heading.
    DriveDistance {
        /// Units: inches
        setpoint: f64,

        /// Heading held while driving.
        ///
        /// Units: radians
        heading_rad: f64,

        /// Units: inches
        tolerance: f64,

        /// Units: feet/second
        top_speed: f64,

        /// Units: feet/second
        min_speed: f64,
    },

    /// Turn on the spot to a heading.
    TurnAngle {
        /// Units: radians
        setpoint_rad: f64,

        /// Units: radians
        tolerance_rad: f64,

        /// Units: feet/second
        top_speed: f64,
    },

    /// Drive to a point on the field, steering towards it every tick.
    DriveToGoal {
        /// Units: inches
        goal: Point,

        /// Units: inches
        tolerance: f64,

        /// Units: feet/second
        top_speed: f64,

        /// Units: feet/second
        min_speed: f64,

        reverse: bool,

        /// Extra distance added past the goal so the robot does not slow down early.
        ///
        /// Units: inches
        lookahead: f64,

        /// Average wheel position to drive to, refreshed every tick.
        ///
        /// Units: inches
        dist_setpoint: f64,

        /// Heading to steer to, refreshed every tick.
        ///
        /// Units: radians
        angle_setpoint: f64,
    },

    /// Feed-forward only profile following.
    OpenLoopProfile {
        profile: Rc<dyn DriveProfile>,

        /// Ticks spent following the profile so far.
        tick: usize,
    },

    /// Profile following with the distance-velocity regulator on top of the feed-forward.
    ClosedLoopLinearProfile {
        profile: Rc<dyn DriveProfile>,

        /// Units: inches
        tolerance: f64,

        /// Ticks spent following the profile so far.
        tick: usize,
    },

    /// Delegate to the pure pursuit tracker.
    PurePursuit,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveMode {
    /// Label used in telemetry and logs.
    pub fn label(&self) -> &'static str {
        match self {
            DriveMode::Waiting => "Waiting",
            DriveMode::DriveDistance { .. } => "DriveDistance",
            DriveMode::TurnAngle { .. } => "TurnAngle",
            DriveMode::DriveToGoal { .. } => "DriveToGoal",
            DriveMode::OpenLoopProfile { .. } => "OpenLoopProfile",
            DriveMode::ClosedLoopLinearProfile { .. } => "ClosedLoopLinearProfile",
            DriveMode::PurePursuit => "PurePursuit",
        }
    }

    /// The profile being followed, if any.
    pub fn profile(&self) -> Option<&Rc<dyn DriveProfile>> {
        match self {
            DriveMode::OpenLoopProfile { profile, .. }
            | DriveMode::ClosedLoopLinearProfile { profile, .. } => Some(profile),
            _ => None,
        }
    }

    /// Number of ticks spent following a profile.
    pub fn profile_tick(&self) -> Option<usize> {
        match self {
            DriveMode::OpenLoopProfile { tick, .. }
            | DriveMode::ClosedLoopLinearProfile { tick, .. } => Some(*tick),
            _ => None,
        }
    }
}

impl Default for DriveMode {
    fn default() -> Self {
        DriveMode::Waiting
    }
}

impl std::fmt::Display for DriveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
