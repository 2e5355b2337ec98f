//! # Telemetry
//!
//! One fixed-shape record per tick. Channels that only make sense in some drive modes are
//! optional and left empty otherwise.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;
use std::path::Path;

// Internal
use crate::geom::Point;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Snapshot of the plant and controller state after one tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Telemetry {
    /// Simulated time since the plant was last reset.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Label of the active drive mode.
    pub mode: String,

    /// Name of the command being run, if any.
    pub command: Option<String>,

    /// Units: inches
    pub average_pos_in: f64,

    /// Units: feet/second
    pub linear_vel_fps: f64,

    /// Units: radians/second
    pub angular_vel_rads: f64,

    /// Units: radians
    pub heading_rad: f64,

    /// Heading folded into (-360, 360).
    ///
    /// Units: degrees
    pub yaw_deg: f64,

    /// Units: inches
    pub x_in: f64,

    /// Units: inches
    pub y_in: f64,

    /// Units: inches
    pub left_pos_in: f64,

    /// Units: inches
    pub right_pos_in: f64,

    /// Units: feet/second
    pub left_vel_fps: f64,

    /// Units: feet/second
    pub right_vel_fps: f64,

    /// Units: inches/second^2
    pub left_acc_in_s2: f64,

    /// Units: inches/second^2
    pub right_acc_in_s2: f64,

    /// Units: inches/second^2
    pub linear_acc_in_s2: f64,

    /// Units: radians/second^2
    pub angular_acc_rads2: f64,

    /// Voltage applied to the left side after clamping.
    ///
    /// Units: volts
    pub left_voltage: f64,

    /// Voltage applied to the right side after clamping.
    ///
    /// Units: volts
    pub right_voltage: f64,

    /// Units: inches
    pub goal_x_in: Option<f64>,

    /// Units: inches
    pub goal_y_in: Option<f64>,

    /// Units: inches
    pub lookahead_in: Option<f64>,

    /// Output of the drive PID before it is split between the sides.
    ///
    /// Units: volts
    pub pid_output: Option<f64>,
}

/// Archive of telemetry records, one CSV row per tick.
pub struct TelemArchive {
    arch: Archiver,
    pending: Vec<Telemetry>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Telemetry {
    /// Position of the robot.
    pub fn point(&self) -> Point {
        Point::new(self.x_in, self.y_in)
    }

    /// Goal point, if the active mode has one.
    pub fn goal_point(&self) -> Option<Point> {
        match (self.goal_x_in, self.goal_y_in) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        }
    }

    /// Set or clear the goal point channels.
    pub fn set_goal_point(&mut self, goal: Option<Point>) {
        self.goal_x_in = goal.map(|g| g.x);
        self.goal_y_in = goal.map(|g| g.y);
    }
}

impl TelemArchive {
    /// Open a telemetry archive under the session's archive directory.
    pub fn new<P: AsRef<Path>>(session: &Session, path: P) -> Result<Self, ArchiveError> {
        Ok(Self {
            arch: Archiver::from_path(session, path)?,
            pending: Vec::new(),
        })
    }

    /// Open a telemetry archive at an explicit file path.
    pub fn from_file_path<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        Ok(Self {
            arch: Archiver::from_file_path(path)?,
            pending: Vec::new(),
        })
    }

    /// Queue records to be written on the next call to `write`.
    pub fn extend<I: IntoIterator<Item = Telemetry>>(&mut self, records: I) {
        self.pending.extend(records);
    }
}

impl Archived for TelemArchive {
    fn write(&mut self) -> Result<(), ArchiveError> {
        for record in self.pending.drain(..) {
            self.arch.serialise(record)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_point_channels() {
        let mut t = Telemetry::default();
        assert_eq!(t.goal_point(), None);

        t.set_goal_point(Some(Point::new(3.0, -2.0)));
        assert_eq!(t.goal_point(), Some(Point::new(3.0, -2.0)));

        t.set_goal_point(None);
        assert_eq!(t.goal_x_in, None);
    }

    #[test]
    fn test_archive_writes_rows() {
        let path = std::env::temp_dir().join("drive_lib_telem_archive_test.csv");

        let mut arch = TelemArchive::from_file_path(&path).unwrap();
        let mut t = Telemetry::default();
        t.mode = "Waiting".into();
        arch.extend(vec![t.clone(), t]);
        arch.write().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("time_s,mode,command"));
        assert_eq!(lines.count(), 2);

        std::fs::remove_file(path).ok();
    }
}
