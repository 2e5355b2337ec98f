//! # Drive loop
//!
//! The integration point of the control core. The loop owns the plant, the drive and turn
//! regulators, the pure pursuit tracker and the profile feed-forward. Each call to `tick` runs the
//! active mode's control law against the plant's current state and applies the resulting wheel
//! voltages.
//!
//! Modes only change through the `set_*` entry points. Each entry resets the regulators that mode
//! uses so no integral or derivative history carries over from the previous goal. The loop never
//! decides on its own that a mode is complete; callers check the exit conditions they care about
//! (see `cmd`).

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod feed_forward;
mod mode;
mod state;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use feed_forward::*;
pub use mode::*;
pub use state::*;
