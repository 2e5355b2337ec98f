//! # Drive library.
//!
//! Motion control core for a simulated differential drive robot. Exposed as a library so the
//! executable, benchmarks and tests can share it.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Commands - scripted units of driving and the harness that runs them
pub mod cmd;

/// Drive loop - per tick mode dispatch between the controllers and the plant
pub mod drive_loop;

/// Geometry - points, poses and field positioning helpers
pub mod geom;

/// Simulation parameters
pub mod params;

/// PID regulators
pub mod pid;

/// Plant - the simulated motors, gearboxes and chassis
pub mod plant;

/// Motion profiles - trapezoidal, jerk limited and Bezier
pub mod profile;

/// Pure pursuit - waypoint paths and the tracker that follows them
pub mod pursuit;

/// Telemetry records and their archive
pub mod telem;
