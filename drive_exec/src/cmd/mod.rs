//! # Commands module
//!
//! Scripted units of driving and the harness that runs them against the drive loop. Each command
//! puts the drive loop into a mode, decides when it is done, and leaves the robot stopped.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod basic;
mod drive;
mod follow;
mod harness;
mod list;
mod routine;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use basic::*;
pub use drive::*;
pub use follow::*;
pub use harness::*;
pub use list::*;
pub use routine::*;
