//! Point to point drive commands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::Command;
use crate::{
    drive_loop::DriveLoop,
    geom::{is_within_bounds, Point},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive a distance in a straight line.
#[derive(Debug, Clone)]
pub struct DriveDistance {
    /// Units: inches, negative to reverse
    pub distance: f64,

    /// Units: inches
    pub tolerance: f64,

    /// Units: feet/second
    pub top_speed: f64,

    pub timeout_s: Option<f64>,
}

/// Turn on the spot.
#[derive(Debug, Clone)]
pub struct TurnAngle {
    /// Units: degrees
    pub angle_deg: f64,

    /// Units: degrees
    pub tolerance_deg: f64,

    /// Units: feet/second
    pub top_speed: f64,

    /// Turn relative to the current heading rather than to an absolute heading.
    pub relative: bool,

    pub timeout_s: Option<f64>,
}

/// Drive to a point on the field.
#[derive(Debug, Clone)]
pub struct DriveToGoal {
    pub goal: Point,

    /// Units: inches
    pub tolerance: f64,

    /// Units: feet/second
    pub top_speed: f64,

    /// Units: feet/second
    pub min_speed: f64,

    pub reverse: bool,

    /// Units: inches
    pub lookahead: f64,

    pub timeout_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveDistance {
    pub fn new(distance: f64, tolerance: f64, top_speed: f64) -> Self {
        Self {
            distance,
            tolerance,
            top_speed,
            timeout_s: None,
        }
    }
}

impl Command for DriveDistance {
    fn name(&self) -> &'static str {
        "DriveDistance"
    }

    fn initialize(&mut self, drive: &mut DriveLoop) {
        // Aim a tolerance past the goal so the regulator is still pushing when it arrives
        let setpoint = self.distance + self.tolerance.copysign(self.distance);
        drive.set_drive_distance(setpoint, self.top_speed, self.tolerance, 0.0);
    }

    fn is_finished(&self, drive: &DriveLoop) -> bool {
        let slow = drive.drive_pid().gains().k_p * self.tolerance * 0.01;
        drive.drive_pid().at_target() && drive.robot().is_slower_than_percent(slow)
    }

    fn timeout_s(&self) -> Option<f64> {
        self.timeout_s
    }
}

impl TurnAngle {
    pub fn new(angle_deg: f64, tolerance_deg: f64, top_speed: f64, relative: bool) -> Self {
        Self {
            angle_deg,
            tolerance_deg,
            top_speed,
            relative,
            timeout_s: None,
        }
    }
}

impl Command for TurnAngle {
    fn name(&self) -> &'static str {
        "TurnAngle"
    }

    fn initialize(&mut self, drive: &mut DriveLoop) {
        drive.set_turn_angle(
            self.angle_deg,
            self.top_speed,
            self.tolerance_deg,
            self.relative,
        );
    }

    fn is_finished(&self, drive: &DriveLoop) -> bool {
        drive.turn_pid().at_target() && drive.robot().is_slower_than_percent(0.05)
    }

    fn timeout_s(&self) -> Option<f64> {
        self.timeout_s
    }
}

impl DriveToGoal {
    pub fn new(goal: Point, tolerance: f64, top_speed: f64, min_speed: f64, reverse: bool) -> Self {
        Self {
            goal,
            tolerance,
            top_speed,
            min_speed,
            reverse,
            lookahead: 0.0,
            timeout_s: None,
        }
    }

    pub fn with_lookahead(mut self, lookahead: f64) -> Self {
        self.lookahead = lookahead;
        self
    }
}

impl Command for DriveToGoal {
    fn name(&self) -> &'static str {
        "DriveToGoal"
    }

    fn initialize(&mut self, drive: &mut DriveLoop) {
        drive.set_drive_to_goal(
            self.goal,
            self.tolerance,
            self.top_speed,
            self.min_speed,
            self.reverse,
            self.lookahead,
        );
    }

    fn is_finished(&self, drive: &DriveLoop) -> bool {
        is_within_bounds(&self.goal, &drive.robot().point(), self.tolerance)
            && drive.robot().is_slower_than_vel(self.min_speed)
    }

    fn timeout_s(&self) -> Option<f64> {
        self.timeout_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{run, Completion, Trace};
    use crate::params::SimParams;

    fn drive_loop() -> DriveLoop {
        DriveLoop::new(&SimParams::default())
    }

    #[test]
    fn test_drive_distance() {
        let mut drive = drive_loop();
        let mut trace = Trace::new();

        let outcome = run(
            &mut DriveDistance::new(100.0, 1.0, 12.0),
            &mut drive,
            &mut trace,
        );

        assert_eq!(outcome.completion, Completion::Finished);
        assert!((drive.robot().average_pos() - 100.0).abs() < 1.0);
        assert_eq!(drive.robot().last_voltages(), (0.0, 0.0));
        assert_eq!(drive.mode().label(), "Waiting");
        assert_eq!(trace.len(), outcome.iterations);

        // Straight line, so no drift sideways
        assert!(drive.robot().point().x.abs() < 1e-6);
    }

    #[test]
    fn test_turn_angle() {
        for &angle in &[90.0, -45.0] {
            let mut drive = drive_loop();
            let outcome = run(
                &mut TurnAngle::new(angle, 1.0, 12.0, false),
                &mut drive,
                &mut Trace::new(),
            );

            assert_eq!(outcome.completion, Completion::Finished);
            assert!((drive.robot().heading().to_degrees() - angle).abs() < 1.0);
            assert!(drive.robot().average_pos().abs() < 1e-6);
        }
    }

    #[test]
    fn test_drive_to_goal() {
        for &(x, y, reverse) in &[
            (0.0, 100.0, false),
            (60.0, 60.0, false),
            (-40.0, 80.0, false),
            (0.0, -60.0, true),
            (30.0, -60.0, false),
        ] {
            let goal = Point::new(x, y);
            let mut drive = drive_loop();

            let outcome = run(
                &mut DriveToGoal::new(goal, 3.0, 12.0, 2.0, reverse),
                &mut drive,
                &mut Trace::new(),
            );

            assert_eq!(outcome.completion, Completion::Finished, "goal {}", goal);
            assert!(is_within_bounds(&goal, &drive.robot().point(), 3.0));
        }
    }

    #[test]
    fn test_timeout_stops_robot() {
        let mut drive = drive_loop();
        let mut cmd = DriveDistance::new(1000.0, 1.0, 12.0);
        cmd.timeout_s = Some(1.0);

        let outcome = run(&mut cmd, &mut drive, &mut Trace::new());

        assert_eq!(outcome.completion, Completion::TimedOut);
        assert_eq!(outcome.iterations, 200);
        assert_eq!(drive.robot().linear_vel(), 0.0);
    }
}
