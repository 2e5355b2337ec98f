//! # Pure pursuit tracker
//!
//! Chases a goal point that slides along the waypoint list, where the path crosses a lookahead
//! circle centred on the robot. Steering is a seek law (turn towards the goal, slowing for sharp
//! turns) blended with an arrive law (ramp down on the approach to the final waypoint).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, PI};

// Internal
use super::{PursuitParams, PursuitPath};
use crate::geom::{angle_wrap, dist, dist_sq, is_within_bounds, line_circle_intersect, Point};
use util::maths::min_mag;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pure pursuit tracker.
#[derive(Debug, Clone, Serialize)]
pub struct PurePursuit {
    waypoints: Vec<Point>,

    /// Index of the waypoint currently being approached.
    index: usize,

    /// Point currently being steered towards.
    goal: Point,

    // ---- SEEK ----
    /// Largest increase in linear output allowed per tick.
    ///
    /// Units: volts
    max_speed_step: f64,

    /// Units: volts/radian
    turn_const: f64,

    /// Units: volts
    max_speed: f64,

    reverse: bool,

    // ---- ARRIVE ----
    /// Units: inches
    goal_dist: f64,

    /// Units: inches
    end_dist: f64,

    /// Units: inches
    lookahead: f64,

    /// Tick period.
    ///
    /// Units: seconds
    dt: f64,

    // ---- OUTPUTS ----
    /// Linear output on the previous tick, used for rate limiting.
    last_speed: f64,

    /// Units: volts
    lin_out: f64,

    /// Units: volts
    ang_out: f64,

    arrived: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PurePursuit {
    /// Create a tracker with no waypoints, which reports itself arrived until given some.
    pub fn new(params: &PursuitParams, dt: f64) -> Self {
        let mut pp = Self {
            waypoints: Vec::new(),
            index: 0,
            goal: Point::zeros(),
            max_speed_step: 0.0,
            turn_const: 0.0,
            max_speed: 0.0,
            reverse: false,
            goal_dist: 0.0,
            end_dist: 0.0,
            lookahead: 0.0,
            dt,
            last_speed: 0.0,
            lin_out: 0.0,
            ang_out: 0.0,
            arrived: true,
        };

        pp.set_params(params);
        pp
    }

    /// Apply every tuning value in `params`.
    pub fn set_params(&mut self, params: &PursuitParams) {
        self.set_seek_constants(
            params.acc_time,
            params.turn_const,
            params.max_speed,
            params.reverse,
        );
        self.set_arrive_constants(params.goal_dist, params.end_dist);
        self.set_lookahead(params.lookahead);
    }

    /// Units: `acc_time` seconds, `turn_const` volts/radian, `max_speed` volts
    pub fn set_seek_constants(
        &mut self,
        acc_time: f64,
        turn_const: f64,
        max_speed: f64,
        reverse: bool,
    ) {
        self.max_speed_step = if acc_time > 0.0 {
            self.dt * max_speed / acc_time
        } else {
            max_speed
        };
        self.turn_const = turn_const;
        self.max_speed = max_speed;
        self.reverse = reverse;
    }

    /// Units: inches
    pub fn set_arrive_constants(&mut self, goal_dist: f64, end_dist: f64) {
        self.goal_dist = goal_dist;
        self.end_dist = end_dist;
    }

    /// Units: inches
    pub fn set_lookahead(&mut self, lookahead: f64) {
        self.lookahead = lookahead;
    }

    /// Replace the waypoints and rewind to the first of them.
    pub fn set_waypoints(&mut self, waypoints: Vec<Point>) {
        self.goal = waypoints.first().copied().unwrap_or_else(Point::zeros);
        self.arrived = waypoints.is_empty();
        self.waypoints = waypoints;
        self.index = 0;
        self.last_speed = 0.0;
        self.lin_out = 0.0;
        self.ang_out = 0.0;

        debug!("Pure pursuit given {} waypoints", self.waypoints.len());
    }

    /// Follow the waypoints of a path.
    pub fn set_path(&mut self, path: &PursuitPath) {
        self.set_waypoints(path.points().to_vec());
    }

    /// Compute the outputs for one tick from the robot's position and heading (radians).
    ///
    /// The measured speed is not taken: the rate limit ramps from the last commanded speed.
    pub fn update(&mut self, position: &Point, heading_rad: f64) {
        if self.waypoints.is_empty() {
            self.stop();
            return;
        }

        let last_index = self.waypoints.len() - 1;

        if dist(position, &self.goal) <= self.end_dist {
            self.index += 1;
            self.goal = self.waypoints[self.index.min(last_index)];
        }

        self.arrived = self.index > last_index;
        if self.arrived {
            self.stop();
            return;
        }

        let final_point = self.waypoints[last_index];
        self.goal = self.select_goal(position, &final_point);

        let speed = self.arrive(position, &final_point);
        self.seek(position, heading_rad, speed);

        trace!(
            "Pursuit goal ({:.2}, {:.2}) idx {} lin {:.3} ang {:.3}",
            self.goal.x,
            self.goal.y,
            self.index,
            self.lin_out,
            self.ang_out
        );
    }

    /// Choose the point to steer towards.
    ///
    /// Near the final waypoint it is the goal outright. Otherwise the last crossing of the
    /// lookahead circle in waypoint order wins, falling back to the nearest waypoint when the
    /// circle touches nothing.
    fn select_goal(&self, position: &Point, final_point: &Point) -> Point {
        if dist(position, final_point) < self.goal_dist {
            return *final_point;
        }

        let last_hit = self
            .waypoints
            .windows(2)
            .flat_map(|seg| line_circle_intersect(&seg[0], &seg[1], position, self.lookahead))
            .last();

        match last_hit {
            Some(p) => p,
            None => self
                .waypoints
                .iter()
                .min_by(|a, b| {
                    dist_sq(position, a)
                        .partial_cmp(&dist_sq(position, b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .copied()
                .unwrap_or(*final_point),
        }
    }

    /// Linear output before steering, ramping down inside `goal_dist` of the final waypoint.
    fn arrive(&self, position: &Point, final_point: &Point) -> f64 {
        if !is_within_bounds(final_point, position, self.goal_dist) {
            return self.max_speed;
        }

        let d = dist(position, &self.goal);
        let scale = if d < self.end_dist {
            0.0
        } else {
            (d - self.end_dist) / (self.goal_dist - self.end_dist)
        };

        self.max_speed * scale
    }

    /// Turn towards the goal and set both outputs.
    fn seek(&mut self, position: &Point, heading_rad: f64, speed: f64) {
        let to_goal = self.goal - position;
        let bearing = to_goal.x.atan2(to_goal.y);

        // Shorter of the two ways round to the goal
        let rel = angle_wrap(bearing - (heading_rad - FRAC_PI_2));
        let right_turn = rel - FRAC_PI_2;
        let mut twist = min_mag(right_turn, right_turn + 2.0 * PI);

        if self.reverse {
            twist = angle_wrap(twist + PI);
        }

        // Stop outright for turns of 90 degrees or more
        let mut speed = speed * (1.0 - twist.abs().min(FRAC_PI_2) / FRAC_PI_2);
        if self.reverse {
            speed = -speed.abs();
        }

        if speed.abs() > self.last_speed.abs() {
            speed = (self.last_speed.abs() + self.max_speed_step)
                .min(speed.abs())
                .copysign(speed);
        }
        self.last_speed = speed;

        self.lin_out = speed;
        self.ang_out = (self.turn_const * twist.abs()).copysign(twist);
    }

    fn stop(&mut self) {
        self.lin_out = 0.0;
        self.ang_out = 0.0;
        self.last_speed = 0.0;
    }

    /// Units: volts
    pub fn lin_out(&self) -> f64 {
        self.lin_out
    }

    /// Units: volts
    pub fn ang_out(&self) -> f64 {
        self.ang_out
    }

    /// Left and right outputs, `(lin - ang, lin + ang)`.
    pub fn outputs(&self) -> (f64, f64) {
        (self.lin_out - self.ang_out, self.lin_out + self.ang_out)
    }

    pub fn goal(&self) -> Point {
        self.goal
    }

    /// Units: inches
    pub fn lookahead(&self) -> f64 {
        self.lookahead
    }

    pub fn is_arrived(&self) -> bool {
        self.arrived
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }
}
