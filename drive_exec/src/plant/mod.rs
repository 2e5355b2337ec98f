//! # Plant module
//!
//! The simulated physical robot. Per-wheel voltages go in, a new pose and wheel state come out
//! each tick.
//!
//! The model is a linear DC motor (torque falls with speed through back EMF) driving each side
//! through a gearbox, with the two sides coupled through the chassis mass and moment of inertia.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod gearbox;
mod motor;
mod params;
mod robot;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use gearbox::*;
pub use motor::*;
pub use params::*;
pub use robot::*;
