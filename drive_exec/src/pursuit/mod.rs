//! # Pursuit module
//!
//! Waypoint paths and the pure pursuit tracker that follows them.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod controller;
mod params;
mod path;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use controller::*;
pub use params::*;
pub use path::*;
