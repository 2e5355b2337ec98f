//! # Command harness
//!
//! Runs a command against the drive loop at a fixed tick until it finishes or its iteration cap
//! is reached, recording a trace of every tick.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use serde::Serialize;

// Internal
use crate::{drive_loop::DriveLoop, geom::Pose, telem::Telemetry};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Timeout applied to commands that do not set their own.
///
/// Units: seconds
pub const DEFAULT_TIMEOUT_S: f64 = 10.0;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A unit of scripted driving.
///
/// The harness calls `initialize` once, then `execute` followed by `is_finished` every tick. On
/// completion it calls `end`; if the iteration cap is hit first it calls `timed_out` instead.
pub trait Command {
    fn name(&self) -> &'static str;

    /// Put the drive loop into the mode this command needs.
    fn initialize(&mut self, drive: &mut DriveLoop);

    /// Run one tick.
    fn execute(&mut self, drive: &mut DriveLoop) {
        drive.tick();
    }

    fn is_finished(&self, drive: &DriveLoop) -> bool;

    /// Called once the command has finished.
    fn end(&mut self, drive: &mut DriveLoop) {
        drive.set_waiting();
    }

    /// Called instead of `end` when the command runs out of time.
    fn timed_out(&mut self, drive: &mut DriveLoop) {
        drive.set_waiting();
    }

    /// Units: seconds
    fn timeout_s(&self) -> Option<f64> {
        None
    }
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Poses and telemetry recorded once per tick.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Trace {
    pub poses: Vec<Pose>,
    pub telemetry: Vec<Telemetry>,
}

/// How a command stopped and how long it ran for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOutcome {
    pub name: String,
    pub completion: Completion,
    pub iterations: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Completion {
    Finished,
    TimedOut,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the drive loop's current state, tagged with the running command's name.
    pub fn record(&mut self, drive: &DriveLoop, command: &str) {
        let mut telem = drive.telemetry();
        telem.command = Some(command.to_string());

        self.poses.push(drive.robot().pose());
        self.telemetry.push(telem);
    }

    /// Append another trace to this one.
    pub fn append(&mut self, other: &mut Trace) {
        self.poses.append(&mut other.poses);
        self.telemetry.append(&mut other.telemetry);
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

impl CommandOutcome {
    pub fn is_finished(&self) -> bool {
        self.completion == Completion::Finished
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Run a command to completion or timeout.
///
/// The iteration cap is the command's timeout (or `DEFAULT_TIMEOUT_S`) divided by the tick
/// period.
pub fn run(cmd: &mut dyn Command, drive: &mut DriveLoop, trace: &mut Trace) -> CommandOutcome {
    let timeout_s = cmd.timeout_s().unwrap_or(DEFAULT_TIMEOUT_S);
    let max_iterations = (timeout_s / drive.tick_period()).round() as usize;

    info!("Starting {} (timeout {:.2} s)", cmd.name(), timeout_s);
    cmd.initialize(drive);

    let mut iterations = 0;
    let completion = loop {
        cmd.execute(drive);
        iterations += 1;
        trace.record(drive, cmd.name());

        if cmd.is_finished(drive) {
            cmd.end(drive);
            break Completion::Finished;
        }

        if iterations >= max_iterations {
            cmd.timed_out(drive);
            break Completion::TimedOut;
        }
    };

    match completion {
        Completion::Finished => info!(
            "{} finished after {} iterations at ({:.2}, {:.2})",
            cmd.name(),
            iterations,
            drive.robot().point().x,
            drive.robot().point().y
        ),
        Completion::TimedOut => warn!("{} timed out after {} iterations", cmd.name(), iterations),
    }

    CommandOutcome {
        name: cmd.name().to_string(),
        completion,
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SimParams;

    /// Finishes after a set number of ticks and records which callbacks ran.
    struct Counter {
        finish_after: usize,
        ticks: usize,
        ended: bool,
        timed_out: bool,
    }

    impl Counter {
        fn new(finish_after: usize) -> Self {
            Self {
                finish_after,
                ticks: 0,
                ended: false,
                timed_out: false,
            }
        }
    }

    impl Command for Counter {
        fn name(&self) -> &'static str {
            "Counter"
        }

        fn initialize(&mut self, _drive: &mut DriveLoop) {}

        fn execute(&mut self, drive: &mut DriveLoop) {
            self.ticks += 1;
            drive.tick();
        }

        fn is_finished(&self, _drive: &DriveLoop) -> bool {
            self.ticks >= self.finish_after
        }

        fn end(&mut self, _drive: &mut DriveLoop) {
            self.ended = true;
        }

        fn timed_out(&mut self, _drive: &mut DriveLoop) {
            self.timed_out = true;
        }

        fn timeout_s(&self) -> Option<f64> {
            Some(0.5)
        }
    }

    #[test]
    fn test_finishes() {
        let mut drive = DriveLoop::new(&SimParams::default());
        let mut trace = Trace::new();
        let mut cmd = Counter::new(10);

        let outcome = run(&mut cmd, &mut drive, &mut trace);

        assert_eq!(outcome.completion, Completion::Finished);
        assert_eq!(outcome.iterations, 10);
        assert!(cmd.ended && !cmd.timed_out);
        assert_eq!(trace.len(), 10);
        assert_eq!(trace.telemetry[0].command.as_deref(), Some("Counter"));
    }

    #[test]
    fn test_times_out() {
        let mut drive = DriveLoop::new(&SimParams::default());
        let mut trace = Trace::new();
        let mut cmd = Counter::new(1000);

        let outcome = run(&mut cmd, &mut drive, &mut trace);

        // 0.5 s at 200 Hz
        assert_eq!(outcome.completion, Completion::TimedOut);
        assert_eq!(outcome.iterations, 100);
        assert!(cmd.timed_out && !cmd.ended);
        assert!(!outcome.is_finished());
    }
}
