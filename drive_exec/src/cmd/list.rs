//! Sequential command list

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::info;

use super::{run, Command, CommandOutcome, Trace};
use crate::drive_loop::DriveLoop;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Commands run one after the other, each to completion or timeout.
#[derive(Default)]
pub struct CommandList {
    commands: Vec<Box<dyn Command>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CommandList {
    pub fn new(commands: Vec<Box<dyn Command>>) -> Self {
        Self { commands }
    }

    pub fn push<C: Command + 'static>(&mut self, cmd: C) {
        self.commands.push(Box::new(cmd));
    }

    /// Run every command in order, recording all of them into one trace.
    ///
    /// A command that times out does not stop the list.
    pub fn run_all(&mut self, drive: &mut DriveLoop, trace: &mut Trace) -> Vec<CommandOutcome> {
        let outcomes: Vec<CommandOutcome> = self
            .commands
            .iter_mut()
            .map(|cmd| run(cmd.as_mut(), drive, trace))
            .collect();

        info!(
            "Command list done: {} of {} finished",
            outcomes.iter().filter(|o| o.is_finished()).count(),
            outcomes.len()
        );

        outcomes
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Names of the commands in run order.
    pub fn names(&self) -> Vec<&'static str> {
        self.commands.iter().map(|c| c.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{DriveDistance, SetPose, TurnAngle, Wait};
    use crate::geom::Point;
    use crate::params::SimParams;

    #[test]
    fn test_runs_in_order() {
        let mut drive = DriveLoop::new(&SimParams::default());
        let mut trace = Trace::new();

        let mut list = CommandList::default();
        list.push(SetPose::new(Point::new(10.0, 10.0), 0.0));
        list.push(DriveDistance::new(48.0, 1.0, 12.0));
        list.push(TurnAngle::new(90.0, 1.0, 12.0, true));
        list.push(Wait::new(0.25));

        assert_eq!(
            list.names(),
            vec!["SetPose", "DriveDistance", "TurnAngle", "Wait"]
        );

        let outcomes = list.run_all(&mut drive, &mut trace);

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes.iter().all(|o| o.is_finished()));

        // One trace covering every tick of every command
        let total: usize = outcomes.iter().map(|o| o.iterations).sum();
        assert_eq!(trace.len(), total);
        assert_eq!(trace.telemetry[0].command.as_deref(), Some("SetPose"));
        assert_eq!(
            trace.telemetry.last().and_then(|t| t.command.as_deref()),
            Some("Wait")
        );

        // Drove up from the set pose, then turned to face +x
        let p = drive.robot().point();
        assert!((p.y - 58.0).abs() < 1.5);
        assert!((p.x - 10.0).abs() < 1e-6);
        assert!((drive.robot().heading().to_degrees() - 90.0).abs() < 1.0);
    }
}
