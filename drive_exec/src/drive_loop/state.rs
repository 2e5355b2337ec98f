//! Drive loop state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use std::rc::Rc;

// Internal
use super::{DriveMode, FeedForward};
use crate::{
    geom::{angle_wrap_deg, dist, goal_yaw, Point},
    params::SimParams,
    pid::{GainSet, PidController},
    plant::Robot,
    profile::DriveProfile,
    pursuit::{PurePursuit, PursuitPath},
    telem::Telemetry,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance of the heading regulator while it is only holding or steering.
///
/// One degree.
///
/// Units: radians
const STEER_TOLERANCE_RAD: f64 = std::f64::consts::PI / 180.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The drive loop: owns the plant and every controller, and turns the active mode into wheel
/// voltages once per tick.
#[derive(Debug)]
pub struct DriveLoop {
    robot: Robot,

    /// Executing mode
    mode: DriveMode,

    drive_pid: PidController,
    turn_pid: PidController,
    pursuit: PurePursuit,
    feed_forward: FeedForward,

    /// Gains used by drive distance and closed loop profiles.
    profile_gains: GainSet,

    /// Gains used by turn angle and drive to goal.
    p2p_gains: GainSet,

    /// Drive regulator output on the last tick, if the mode used it.
    ///
    /// Units: volts
    pid_output: Option<f64>,

    /// Units: seconds
    dt: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveLoop {
    /// Build the plant and controllers described by `params`.
    pub fn new(params: &SimParams) -> Self {
        Self::with_robot(Robot::new(&params.robot, params.dt), params)
    }

    /// Build the controllers described by `params` around an existing plant.
    pub fn with_robot(robot: Robot, params: &SimParams) -> Self {
        let max_speed = robot.max_lin_speed();
        let dt = robot.tick_period();

        Self {
            drive_pid: PidController::new(params.profile_gains.drive, max_speed, dt),
            turn_pid: PidController::new(params.profile_gains.turn, max_speed, dt),
            pursuit: PurePursuit::new(&params.pursuit, dt),
            feed_forward: params.feed_forward,
            profile_gains: params.profile_gains,
            p2p_gains: params.p2p_gains,
            mode: DriveMode::Waiting,
            pid_output: None,
            robot,
            dt,
        }
    }

    /// Run the active mode for one tick and advance the plant.
    pub fn tick(&mut self) {
        self.pid_output = None;

        let (left, right) = match self.mode {
            DriveMode::Waiting => {
                self.robot.set_to_wait();
                (0.0, 0.0)
            }
            DriveMode::DriveDistance { .. } => self.mode_drive_distance(),
            DriveMode::TurnAngle { .. } => self.mode_turn_angle(),
            DriveMode::DriveToGoal { .. } => self.mode_drive_to_goal(),
            DriveMode::OpenLoopProfile { .. } => self.mode_open_loop_profile(),
            DriveMode::ClosedLoopLinearProfile { .. } => self.mode_closed_loop_profile(),
            DriveMode::PurePursuit => self.mode_pure_pursuit(),
        };

        trace!("{} -> ({:.3}, {:.3}) V", self.mode, left, right);

        self.robot.apply(left, right);
    }

    // ---- MODE ENTRY ----

    /// Hold the robot where it is.
    pub fn set_waiting(&mut self) {
        self.robot.set_to_wait();
        self.enter(DriveMode::Waiting);
    }

    /// Drive `distance` inches from the current position, holding the current heading.
    ///
    /// Units: speeds in feet/second
    pub fn set_drive_distance(
        &mut self,
        distance: f64,
        top_speed: f64,
        tolerance: f64,
        min_speed: f64,
    ) {
        self.use_gains(self.profile_gains);

        self.enter(DriveMode::DriveDistance {
            setpoint: self.robot.average_pos() + distance,
            heading_rad: self.robot.heading(),
            tolerance,
            top_speed,
            min_speed,
        });
    }

    /// Turn to `angle_deg`, either absolute or relative to the current heading.
    pub fn set_turn_angle(
        &mut self,
        angle_deg: f64,
        top_speed: f64,
        tolerance_deg: f64,
        relative: bool,
    ) {
        self.use_gains(self.p2p_gains);

        let setpoint_rad = if relative {
            self.robot.heading() + angle_deg.to_radians()
        } else {
            angle_deg.to_radians()
        };

        self.enter(DriveMode::TurnAngle {
            setpoint_rad,
            tolerance_rad: tolerance_deg.to_radians(),
            top_speed,
        });
    }

    /// Drive to `goal`, refreshing the distance and bearing setpoints every tick.
    pub fn set_drive_to_goal(
        &mut self,
        goal: Point,
        tolerance: f64,
        top_speed: f64,
        min_speed: f64,
        reverse: bool,
        lookahead: f64,
    ) {
        self.use_gains(self.p2p_gains);

        self.enter(DriveMode::DriveToGoal {
            goal,
            tolerance,
            top_speed,
            min_speed,
            reverse,
            lookahead,
            dist_setpoint: self.robot.average_pos(),
            angle_setpoint: self.robot.heading(),
        });
        self.update_drive_to_goal();
    }

    /// Follow a profile on feed-forward alone.
    pub fn set_open_loop_profile(&mut self, profile: Rc<dyn DriveProfile>) {
        self.enter(DriveMode::OpenLoopProfile { profile, tick: 0 });
    }

    /// Follow a straight line profile with the distance-velocity regulator correcting the
    /// feed-forward.
    pub fn set_closed_loop_profile(&mut self, profile: Rc<dyn DriveProfile>, tolerance: f64) {
        self.use_gains(self.profile_gains);
        self.drive_pid.set_init_pos(self.robot.average_pos());

        self.enter(DriveMode::ClosedLoopLinearProfile {
            profile,
            tolerance,
            tick: 0,
        });
    }

    /// Follow a list of waypoints with the pure pursuit tracker.
    pub fn set_pure_pursuit(&mut self, waypoints: Vec<Point>) {
        self.pursuit.set_waypoints(waypoints);
        self.enter(DriveMode::PurePursuit);
    }

    /// Follow the waypoints of a path with the pure pursuit tracker.
    pub fn set_pure_pursuit_path(&mut self, path: &PursuitPath) {
        self.set_pure_pursuit(path.points().to_vec());
    }

    /// Load a gain set into both regulators, which also resets them.
    fn use_gains(&mut self, gains: GainSet) {
        self.drive_pid.set_gains(gains.drive);
        self.turn_pid.set_gains(gains.turn);
    }

    fn enter(&mut self, mode: DriveMode) {
        info!("Drive loop: {} -> {}", self.mode, mode);
        self.mode = mode;
    }

    /// Refresh the drive to goal setpoints from the robot's current position.
    ///
    /// Inside the tolerance the setpoints are left alone so the robot settles instead of chasing
    /// a goal it is sitting on.
    pub fn update_drive_to_goal(&mut self) {
        let robot = &self.robot;

        if let DriveMode::DriveToGoal {
            goal,
            tolerance,
            reverse,
            lookahead,
            dist_setpoint,
            angle_setpoint,
            ..
        } = &mut self.mode
        {
            let point = robot.point();
            let d = dist(&point, goal);

            if d >= *tolerance {
                let travel = d + *lookahead;
                *dist_setpoint = robot.average_pos() + if *reverse { -travel } else { travel };

                let mut yaw = goal_yaw(&point, goal);
                if *reverse {
                    yaw -= 180f64.copysign(yaw);
                }
                *angle_setpoint =
                    angle_wrap_deg(yaw - robot.yaw_deg()).to_radians() + robot.heading();
            }
        }
    }

    // ---- MODE ACTIONS ----

    fn mode_drive_distance(&mut self) -> (f64, f64) {
        if let DriveMode::DriveDistance {
            setpoint,
            heading_rad,
            tolerance,
            top_speed,
            min_speed,
        } = self.mode
        {
            let out = self.drive_pid.compute_regulated(
                setpoint,
                self.robot.average_pos(),
                tolerance,
                top_speed,
                min_speed,
            );
            let turn =
                self.turn_pid
                    .compute(heading_rad, self.robot.heading(), STEER_TOLERANCE_RAD);

            self.pid_output = Some(out);
            (out - turn, out + turn)
        } else {
            (0.0, 0.0)
        }
    }

    fn mode_turn_angle(&mut self) -> (f64, f64) {
        if let DriveMode::TurnAngle {
            setpoint_rad,
            tolerance_rad,
            top_speed,
        } = self.mode
        {
            let out = self.turn_pid.compute_regulated(
                setpoint_rad,
                self.robot.heading(),
                tolerance_rad,
                top_speed,
                0.0,
            );

            (-out, out)
        } else {
            (0.0, 0.0)
        }
    }

    fn mode_drive_to_goal(&mut self) -> (f64, f64) {
        self.update_drive_to_goal();

        if let DriveMode::DriveToGoal {
            tolerance,
            top_speed,
            min_speed,
            dist_setpoint,
            angle_setpoint,
            ..
        } = self.mode
        {
            // Slow down for large bearing errors, stopping entirely past 90 degrees
            let bearing_err = (angle_setpoint - self.robot.heading()).to_degrees().abs();
            let scale = if bearing_err > 90.0 {
                0.0
            } else {
                (bearing_err - 90.0).powi(2) / 8100.0
            };

            let out = self.drive_pid.compute_regulated(
                dist_setpoint,
                self.robot.average_pos(),
                tolerance,
                top_speed * scale,
                min_speed,
            );
            let turn =
                self.turn_pid
                    .compute(angle_setpoint, self.robot.heading(), STEER_TOLERANCE_RAD);

            self.pid_output = Some(out);
            (out - turn, out + turn)
        } else {
            (0.0, 0.0)
        }
    }

    fn mode_open_loop_profile(&mut self) -> (f64, f64) {
        let dt = self.dt;
        let ff = self.feed_forward;

        if let DriveMode::OpenLoopProfile { profile, tick } = &mut self.mode {
            let t = *tick as f64 * dt;
            *tick += 1;

            (
                ff.output(&profile.left_sample(t)),
                ff.output(&profile.right_sample(t)),
            )
        } else {
            (0.0, 0.0)
        }
    }

    fn mode_closed_loop_profile(&mut self) -> (f64, f64) {
        let dt = self.dt;
        let ff = self.feed_forward;
        let avg_pos = self.robot.average_pos();

        if let DriveMode::ClosedLoopLinearProfile {
            profile,
            tolerance,
            tick,
        } = &mut self.mode
        {
            let t = *tick as f64 * dt;
            *tick += 1;

            let left = profile.left_sample(t);
            let right = profile.right_sample(t);

            let goal_pos = self.drive_pid.init_pos() + (left.pos + right.pos) / 2.0;
            let goal_vel = (left.vel + right.vel) / 2.0;
            let out = self
                .drive_pid
                .compute_dv(goal_pos, avg_pos, goal_vel, *tolerance);

            self.pid_output = Some(out);
            (out + ff.output(&left), out + ff.output(&right))
        } else {
            (0.0, 0.0)
        }
    }

    fn mode_pure_pursuit(&mut self) -> (f64, f64) {
        self.pursuit
            .update(&self.robot.point(), self.robot.heading());
        self.pursuit.outputs()
    }

    // ---- TELEMETRY ----

    /// Plant telemetry decorated with the active mode's channels.
    pub fn telemetry(&self) -> Telemetry {
        let mut telem = self.robot.telemetry();
        telem.mode = self.mode.label().to_string();
        telem.pid_output = self.pid_output;

        match &self.mode {
            DriveMode::DriveToGoal {
                goal, lookahead, ..
            } => {
                telem.set_goal_point(Some(*goal));
                telem.lookahead_in = Some(*lookahead);
            }
            DriveMode::PurePursuit => {
                telem.set_goal_point(Some(self.pursuit.goal()));
                telem.lookahead_in = Some(self.pursuit.lookahead());
            }
            _ => (),
        }

        telem
    }

    // ---- GETTERS ----

    pub fn mode(&self) -> &DriveMode {
        &self.mode
    }

    pub fn robot(&self) -> &Robot {
        &self.robot
    }

    pub fn robot_mut(&mut self) -> &mut Robot {
        &mut self.robot
    }

    pub fn drive_pid(&self) -> &PidController {
        &self.drive_pid
    }

    pub fn turn_pid(&self) -> &PidController {
        &self.turn_pid
    }

    pub fn pursuit(&self) -> &PurePursuit {
        &self.pursuit
    }

    pub fn pursuit_mut(&mut self) -> &mut PurePursuit {
        &mut self.pursuit
    }

    pub fn feed_forward(&self) -> FeedForward {
        self.feed_forward
    }

    /// Time spent following the active profile.
    ///
    /// Units: seconds
    pub fn profile_elapsed(&self) -> Option<f64> {
        self.mode.profile_tick().map(|t| t as f64 * self.dt)
    }

    /// Units: seconds
    pub fn tick_period(&self) -> f64 {
        self.dt
    }
}
