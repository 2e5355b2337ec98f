//! Simple timed and setup commands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use super::Command;
use crate::{drive_loop::DriveLoop, geom::Point};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Slack given to timed commands beyond their own duration before they count as timed out.
///
/// Units: seconds
const TIMED_SLACK_S: f64 = 1.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Apply fixed voltages to each side for a set time.
#[derive(Debug, Clone)]
pub struct TimedVoltage {
    /// Units: volts
    pub left: f64,

    /// Units: volts
    pub right: f64,

    /// Units: seconds
    pub seconds: f64,

    ticks: usize,
}

/// Hold still for a set time.
#[derive(Debug, Clone)]
pub struct Wait {
    /// Units: seconds
    pub seconds: f64,

    ticks: usize,
}

/// Teleport the robot to a pose. Finishes on the first tick.
#[derive(Debug, Clone)]
pub struct SetPose {
    pub point: Point,

    /// Units: degrees
    pub heading_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

fn elapsed(ticks: usize, drive: &DriveLoop) -> f64 {
    ticks as f64 * drive.tick_period()
}

impl TimedVoltage {
    pub fn new(left: f64, right: f64, seconds: f64) -> Self {
        Self {
            left,
            right,
            seconds,
            ticks: 0,
        }
    }
}

impl Command for TimedVoltage {
    fn name(&self) -> &'static str {
        "TimedVoltage"
    }

    fn initialize(&mut self, drive: &mut DriveLoop) {
        self.ticks = 0;
        drive.set_waiting();
    }

    fn execute(&mut self, drive: &mut DriveLoop) {
        drive.robot_mut().apply(self.left, self.right);
        self.ticks += 1;
    }

    fn is_finished(&self, drive: &DriveLoop) -> bool {
        // Half a tick of slack so float error can't add a tick
        elapsed(self.ticks, drive) >= self.seconds - drive.tick_period() / 2.0
    }

    fn timeout_s(&self) -> Option<f64> {
        Some(self.seconds + TIMED_SLACK_S)
    }
}

impl Wait {
    pub fn new(seconds: f64) -> Self {
        Self { seconds, ticks: 0 }
    }
}

impl Command for Wait {
    fn name(&self) -> &'static str {
        "Wait"
    }

    fn initialize(&mut self, drive: &mut DriveLoop) {
        self.ticks = 0;
        drive.set_waiting();
    }

    fn execute(&mut self, drive: &mut DriveLoop) {
        drive.tick();
        self.ticks += 1;
    }

    fn is_finished(&self, drive: &DriveLoop) -> bool {
        elapsed(self.ticks, drive) >= self.seconds - drive.tick_period() / 2.0
    }

    fn timeout_s(&self) -> Option<f64> {
        Some(self.seconds + TIMED_SLACK_S)
    }
}

impl SetPose {
    pub fn new(point: Point, heading_deg: f64) -> Self {
        Self { point, heading_deg }
    }
}

impl Command for SetPose {
    fn name(&self) -> &'static str {
        "SetPose"
    }

    fn initialize(&mut self, drive: &mut DriveLoop) {
        drive.set_waiting();
        drive
            .robot_mut()
            .set_pose(self.point, self.heading_deg.to_radians());
    }

    fn is_finished(&self, _drive: &DriveLoop) -> bool {
        true
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
    fn test_timed_voltage() {
        let mut drive = drive_loop();
        let outcome = run(
            &mut TimedVoltage::new(6.0, 6.0, 1.0),
            &mut drive,
            &mut Trace::new(),
        );

        assert_eq!(outcome.completion, Completion::Finished);
        assert_eq!(outcome.iterations, 200);
        assert!(drive.robot().point().y > 10.0);
        assert_eq!(drive.robot().heading(), 0.0);

        // Stopped once done
        assert_eq!(drive.robot().linear_vel(), 0.0);
    }

    #[test]
    fn test_timed_spin() {
        let mut drive = drive_loop();
        run(
            &mut TimedVoltage::new(-4.0, 4.0, 0.5),
            &mut drive,
            &mut Trace::new(),
        );

        // Right side faster turns towards +x
        assert!(drive.robot().heading() > 0.0);
        assert!(drive.robot().average_pos().abs() < 1e-6);
    }

    #[test]
    fn test_wait() {
        let mut drive = drive_loop();
        let outcome = run(&mut Wait::new(0.5), &mut drive, &mut Trace::new());

        assert_eq!(outcome.completion, Completion::Finished);
        assert_eq!(outcome.iterations, 100);
        assert_eq!(drive.robot().point(), Point::zeros());
    }

    #[test]
    fn test_set_pose() {
        let mut drive = drive_loop();
        let mut trace = Trace::new();
        let outcome = run(
            &mut SetPose::new(Point::new(24.0, -12.0), 90.0),
            &mut drive,
            &mut trace,
        );

        assert_eq!(outcome.iterations, 1);
        assert_eq!(drive.robot().point(), Point::new(24.0, -12.0));
        assert!((drive.robot().heading() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(trace.poses[0].point, Point::new(24.0, -12.0));
    }
}
