//! # Routines
//!
//! A routine is a TOML file holding an ordered `[[steps]]` array. Each step names its command in a
//! `type` key, for example:
//!
//! ```toml
//! [[steps]]
//! type = "drive_distance"
//! distance = 48.0
//! timeout_s = 4.0
//!
//! [[steps]]
//! type = "turn_angle"
//! angle_deg = 90.0
//! ```
//!
//! Building a routine turns the steps into boxed commands, planning any profiles and paths they
//! need up front.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Deserialize;
use std::{path::Path, rc::Rc, str::FromStr};
use thiserror::Error;

// Internal
use super::{
    Command, CommandList, DriveClosedLoopProfile, DriveDistance, DriveOpenLoopProfile,
    DriveToGoal, FollowPurePursuit, SetPose, TimedVoltage, TurnAngle, Wait,
};
use crate::{
    geom::{flip_curve, points_from_pairs, Point},
    params::SimParams,
    profile::{
        BezierCurve, BezierLimits, BezierProfile, DriveProfile, JerkProfile, ProfileError,
        TrapezoidalProfile,
    },
    pursuit::{PathError, PursuitPath},
};
use util::params::{self as param_file, LoadError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An ordered list of steps loaded from a routine file.
#[derive(Debug, Clone, Deserialize)]
pub struct Routine {
    pub steps: Vec<StepSpec>,
}

/// One step of a routine with its optional timeout.
#[derive(Debug, Clone, Deserialize)]
pub struct StepSpec {
    #[serde(flatten)]
    pub step: Step,

    /// Overrides the default command timeout. Ignored by timed steps, which are bounded by their
    /// own duration.
    ///
    /// Units: seconds
    #[serde(default)]
    pub timeout_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    DriveDistance {
        distance: f64,
        #[serde(default = "default_tolerance")]
        tolerance: f64,
        #[serde(default = "default_top_speed")]
        top_speed: f64,
    },

    TurnAngle {
        angle_deg: f64,
        #[serde(default = "default_tolerance")]
        tolerance_deg: f64,
        #[serde(default = "default_top_speed")]
        top_speed: f64,
        #[serde(default)]
        relative: bool,
    },

    DriveToGoal {
        goal: [f64; 2],
        #[serde(default = "default_goal_tolerance")]
        tolerance: f64,
        #[serde(default = "default_top_speed")]
        top_speed: f64,
        #[serde(default = "default_min_speed")]
        min_speed: f64,
        #[serde(default)]
        reverse: bool,
        #[serde(default)]
        lookahead: f64,
    },

    TrapezoidalProfile {
        distance: f64,
        acc_distance: f64,
        max_vel: f64,
        #[serde(default)]
        closed_loop: bool,
        #[serde(default = "default_tolerance")]
        tolerance: f64,
    },

    JerkProfile {
        distance: f64,
        acc_distance: f64,
        max_vel: f64,
        #[serde(default)]
        closed_loop: bool,
        #[serde(default = "default_tolerance")]
        tolerance: f64,
    },

    BezierProfile {
        control_points: Vec<[f64; 2]>,
        #[serde(default)]
        flip: bool,
        /// Units: feet/second
        #[serde(default = "default_max_vel")]
        max_vel: f64,
        /// Units: inches/second^2
        #[serde(default = "default_max_acc")]
        max_acc: f64,
        /// Units: inches/second^2
        #[serde(default = "default_max_acc")]
        max_dec: f64,
    },

    PurePursuit {
        #[serde(default)]
        waypoints: Option<Vec<[f64; 2]>>,
        #[serde(default)]
        control_points: Option<Vec<[f64; 2]>>,
        #[serde(default)]
        spacing: Option<f64>,
        /// Units: feet/second
        #[serde(default = "default_max_vel")]
        max_vel: f64,
        /// Units: inches/second^2
        #[serde(default = "default_max_acc")]
        max_acc: f64,
        /// Units: inches/second^2
        #[serde(default = "default_max_acc")]
        max_dec: f64,
    },

    TimedVoltage {
        left: f64,
        right: f64,
        seconds: f64,
    },

    Wait {
        seconds: f64,
    },

    SetPose {
        x: f64,
        y: f64,
        #[serde(default)]
        heading_deg: f64,
    },
}

#[derive(Debug, Error)]
pub enum RoutineError {
    #[error("Could not load the routine: {0}")]
    Load(#[from] LoadError),

    #[error("Step {0} has an invalid profile: {1}")]
    Profile(usize, ProfileError),

    #[error("Step {0} has an invalid path: {1}")]
    Path(usize, PathError),

    #[error("Step {0} needs either waypoints or control points")]
    MissingWaypoints(usize),

    #[error("The routine has no steps")]
    Empty,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

fn default_tolerance() -> f64 {
    1.0
}

fn default_goal_tolerance() -> f64 {
    3.0
}

fn default_top_speed() -> f64 {
    12.0
}

fn default_min_speed() -> f64 {
    2.0
}

fn default_max_vel() -> f64 {
    8.0
}

fn default_max_acc() -> f64 {
    100.0
}

impl FromStr for Routine {
    type Err = RoutineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let routine: Routine = param_file::from_str(s)?;

        if routine.steps.is_empty() {
            return Err(RoutineError::Empty);
        }

        Ok(routine)
    }
}

impl Routine {
    /// Load a routine from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RoutineError> {
        let routine: Routine = param_file::load_from_path(path)?;

        if routine.steps.is_empty() {
            return Err(RoutineError::Empty);
        }

        Ok(routine)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Build the routine's commands, planning every profile and path.
    pub fn build(&self, params: &SimParams) -> Result<CommandList, RoutineError> {
        let commands = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| step.build(i, params))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CommandList::new(commands))
    }
}

impl StepSpec {
    fn build(&self, index: usize, params: &SimParams) -> Result<Box<dyn Command>, RoutineError> {
        let timeout_s = Some(self.timeout_s.unwrap_or(params.default_timeout_s));
        let track_width = params.robot.width_in;

        let cmd: Box<dyn Command> = match &self.step {
            Step::DriveDistance {
                distance,
                tolerance,
                top_speed,
            } => {
                let mut cmd = DriveDistance::new(*distance, *tolerance, *top_speed);
                cmd.timeout_s = timeout_s;
                Box::new(cmd)
            }
            Step::TurnAngle {
                angle_deg,
                tolerance_deg,
                top_speed,
                relative,
            } => {
                let mut cmd = TurnAngle::new(*angle_deg, *tolerance_deg, *top_speed, *relative);
                cmd.timeout_s = timeout_s;
                Box::new(cmd)
            }
            Step::DriveToGoal {
                goal,
                tolerance,
                top_speed,
                min_speed,
                reverse,
                lookahead,
            } => {
                let mut cmd = DriveToGoal::new(
                    Point::new(goal[0], goal[1]),
                    *tolerance,
                    *top_speed,
                    *min_speed,
                    *reverse,
                )
                .with_lookahead(*lookahead);
                cmd.timeout_s = timeout_s;
                Box::new(cmd)
            }
            Step::TrapezoidalProfile {
                distance,
                acc_distance,
                max_vel,
                closed_loop,
                tolerance,
            } => {
                let profile = TrapezoidalProfile::new(*distance, *acc_distance, *max_vel, params.dt)
                    .map_err(|e| RoutineError::Profile(index, e))?;
                profile_command(Rc::new(profile), *closed_loop, *tolerance, timeout_s)
            }
            Step::JerkProfile {
                distance,
                acc_distance,
                max_vel,
                closed_loop,
                tolerance,
            } => {
                let profile = JerkProfile::new(*distance, *acc_distance, *max_vel, params.dt)
                    .map_err(|e| RoutineError::Profile(index, e))?;
                profile_command(Rc::new(profile), *closed_loop, *tolerance, timeout_s)
            }
            Step::BezierProfile {
                control_points,
                flip,
                max_vel,
                max_acc,
                max_dec,
            } => {
                let curve = curve_from(control_points, *flip)
                    .map_err(|e| RoutineError::Profile(index, e))?;
                let profile = BezierProfile::new(
                    curve,
                    BezierLimits::new(track_width, *max_vel, *max_acc, *max_dec),
                )
                    .map_err(|e| RoutineError::Profile(index, e))?;

                // Curvature is only followed on feed-forward
                profile_command(Rc::new(profile), false, 0.0, timeout_s)
            }
            Step::PurePursuit {
                waypoints,
                control_points,
                spacing,
                max_vel,
                max_acc,
                max_dec,
            } => {
                let limits = BezierLimits::new(track_width, *max_vel, *max_acc, *max_dec);
                let path = match (waypoints, control_points) {
                    (Some(w), _) => PursuitPath::from_waypoints(points_from_pairs(w), limits)
                        .map_err(|e| RoutineError::Path(index, e))?,
                    (None, Some(c)) => {
                        let curve =
                            curve_from(c, false).map_err(|e| RoutineError::Profile(index, e))?;
                        let spacing = spacing.unwrap_or(params.pursuit.spacing);
                        PursuitPath::new(&curve, limits, spacing)
                            .map_err(|e| RoutineError::Path(index, e))?
                    }
                    (None, None) => return Err(RoutineError::MissingWaypoints(index)),
                };

                let mut cmd = FollowPurePursuit::from_path(&path);
                cmd.timeout_s = timeout_s;
                Box::new(cmd)
            }
            Step::TimedVoltage {
                left,
                right,
                seconds,
            } => Box::new(TimedVoltage::new(*left, *right, *seconds)),
            Step::Wait { seconds } => Box::new(Wait::new(*seconds)),
            Step::SetPose { x, y, heading_deg } => {
                Box::new(SetPose::new(Point::new(*x, *y), *heading_deg))
            }
        };

        Ok(cmd)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

fn curve_from(control_points: &[[f64; 2]], flip: bool) -> Result<BezierCurve, ProfileError> {
    if flip {
        BezierCurve::from_pairs(&flip_curve(control_points))
    } else {
        BezierCurve::from_pairs(control_points)
    }
}

fn profile_command(
    profile: Rc<dyn DriveProfile>,
    closed_loop: bool,
    tolerance: f64,
    timeout_s: Option<f64>,
) -> Box<dyn Command> {
    if closed_loop {
        let mut cmd = DriveClosedLoopProfile::new(profile, tolerance);
        cmd.timeout_s = timeout_s;
        Box::new(cmd)
    } else {
        let mut cmd = DriveOpenLoopProfile::new(profile);
        cmd.timeout_s = timeout_s;
        Box::new(cmd)
    }
}
