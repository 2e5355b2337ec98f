//! Profile and path following commands

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::rc::Rc;

use super::Command;
use crate::{
    drive_loop::DriveLoop, geom::Point, profile::DriveProfile, pursuit::PursuitPath,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Follow a profile on feed-forward alone.
#[derive(Debug, Clone)]
pub struct DriveOpenLoopProfile {
    pub profile: Rc<dyn DriveProfile>,
    pub timeout_s: Option<f64>,
}

/// Follow a straight line profile with the distance-velocity regulator.
#[derive(Debug, Clone)]
pub struct DriveClosedLoopProfile {
    pub profile: Rc<dyn DriveProfile>,

    /// Units: inches
    pub tolerance: f64,

    pub timeout_s: Option<f64>,
}

/// Follow waypoints with pure pursuit.
#[derive(Debug, Clone)]
pub struct FollowPurePursuit {
    pub waypoints: Vec<Point>,
    pub timeout_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

/// True once the active profile has run past its end.
fn profile_done(drive: &DriveLoop) -> bool {
    match (drive.profile_elapsed(), drive.mode().profile()) {
        (Some(elapsed), Some(profile)) => elapsed > profile.total_time(),
        _ => true,
    }
}

impl DriveOpenLoopProfile {
    pub fn new(profile: Rc<dyn DriveProfile>) -> Self {
        Self {
            profile,
            timeout_s: None,
        }
    }
}

impl Command for DriveOpenLoopProfile {
    fn name(&self) -> &'static str {
        "DriveOpenLoopProfile"
    }

    fn initialize(&mut self, drive: &mut DriveLoop) {
        drive.set_open_loop_profile(Rc::clone(&self.profile));
    }

    fn is_finished(&self, drive: &DriveLoop) -> bool {
        profile_done(drive)
    }

    fn timeout_s(&self) -> Option<f64> {
        self.timeout_s
    }
}

impl DriveClosedLoopProfile {
    pub fn new(profile: Rc<dyn DriveProfile>, tolerance: f64) -> Self {
        Self {
            profile,
            tolerance,
            timeout_s: None,
        }
    }
}

impl Command for DriveClosedLoopProfile {
    fn name(&self) -> &'static str {
        "DriveClosedLoopProfile"
    }

    fn initialize(&mut self, drive: &mut DriveLoop) {
        drive.set_closed_loop_profile(Rc::clone(&self.profile), self.tolerance);
    }

    fn is_finished(&self, drive: &DriveLoop) -> bool {
        drive.drive_pid().at_target() && profile_done(drive)
    }

    fn timeout_s(&self) -> Option<f64> {
        self.timeout_s
    }
}

impl FollowPurePursuit {
    pub fn new(waypoints: Vec<Point>) -> Self {
        Self {
            waypoints,
            timeout_s: None,
        }
    }

    pub fn from_path(path: &PursuitPath) -> Self {
        Self::new(path.points().to_vec())
    }
}

impl Command for FollowPurePursuit {
    fn name(&self) -> &'static str {
        "FollowPurePursuit"
    }

    fn initialize(&mut self, drive: &mut DriveLoop) {
        drive.set_pure_pursuit(self.waypoints.clone());
    }

    fn is_finished(&self, drive: &DriveLoop) -> bool {
        drive.pursuit().is_arrived()
    }

    fn timeout_s(&self) -> Option<f64> {
        self.timeout_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{run, Completion, Trace};
    use crate::geom::dist;
    use crate::params::SimParams;
    use crate::profile::{BezierCurve, BezierLimits, TrapezoidalProfile};

    fn drive_loop() -> DriveLoop {
        DriveLoop::new(&SimParams::default())
    }

    fn trapezoid(dist: f64, acc_dist: f64, vel: f64) -> Rc<dyn DriveProfile> {
        Rc::new(TrapezoidalProfile::new(dist, acc_dist, vel, 0.005).unwrap())
    }

    #[test]
    fn test_open_loop_profile() {
        let mut drive = drive_loop();
        let profile = trapezoid(100.0, 24.0, 8.0);
        let total_time = profile.total_time();

        let outcome = run(
            &mut DriveOpenLoopProfile::new(profile),
            &mut drive,
            &mut Trace::new(),
        );

        // Runs for exactly the profile's duration, landing near the end without feedback
        assert_eq!(outcome.completion, Completion::Finished);
        assert!((outcome.iterations as f64 * 0.005 - total_time).abs() < 0.01);
        assert!((drive.robot().average_pos() - 100.0).abs() < 10.0);
    }

    #[test]
    fn test_closed_loop_profile() {
        for &(dist, acc_dist, vel) in &[(100.0, 24.0, 8.0), (60.0, 20.0, 6.0)] {
            let mut drive = drive_loop();
            let mut trace = Trace::new();

            let outcome = run(
                &mut DriveClosedLoopProfile::new(trapezoid(dist, acc_dist, vel), 1.0),
                &mut drive,
                &mut trace,
            );

            assert_eq!(outcome.completion, Completion::Finished);
            assert!((drive.robot().average_pos() - dist).abs() < 3.0);
            assert!(trace.telemetry.iter().all(|t| t.pid_output.is_some()));
        }
    }

    #[test]
    fn test_bezier_profile_open_loop() {
        let curve = BezierCurve::from_pairs(&[
            [0.0, 0.0],
            [0.0, 20.0],
            [0.0, 40.0],
            [0.0, 60.0],
            [0.0, 80.0],
            [0.0, 100.0],
        ])
        .unwrap();
        let profile = crate::profile::BezierProfile::new(
            curve,
            BezierLimits::new(30.0, 8.0, 100.0, 100.0),
        )
        .unwrap();

        let mut drive = drive_loop();
        let outcome = run(
            &mut DriveOpenLoopProfile::new(Rc::new(profile)),
            &mut drive,
            &mut Trace::new(),
        );

        assert_eq!(outcome.completion, Completion::Finished);
        assert!(drive.robot().average_pos() > 50.0);
        assert!(drive.robot().heading().abs() < 1e-9);
    }

    #[test]
    fn test_pure_pursuit_arrives() {
        for waypoints in vec![
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 75.0),
                Point::new(0.0, 150.0),
            ],
            vec![
                Point::new(0.0, 0.0),
                Point::new(75.0, 0.0),
                Point::new(150.0, 0.0),
            ],
            vec![
                Point::new(0.0, 0.0),
                Point::new(53.0, 53.0),
                Point::new(106.0, 106.0),
            ],
        ] {
            let last = *waypoints.last().unwrap();
            let mut drive = drive_loop();
            let mut trace = Trace::new();

            let outcome = run(
                &mut FollowPurePursuit::new(waypoints),
                &mut drive,
                &mut trace,
            );

            assert_eq!(outcome.completion, Completion::Finished, "to {}", last);
            assert!(drive.pursuit().is_arrived());
            assert!(dist(&drive.robot().point(), &last) <= 3.0);
            assert!(trace.telemetry.iter().all(|t| t.lookahead_in == Some(18.0)));
        }
    }
}
