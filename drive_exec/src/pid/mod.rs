//! # PID module
//!
//! Discrete PID regulators used by the drive loop, one for the drive axis and one for the turn
//! axis.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod controller;
mod params;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use controller::*;
pub use params::*;
