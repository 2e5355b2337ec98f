//! Host platform utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::env;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Environment variable holding the root directory of the software tree.
pub const SIM_ROOT_ENV_VAR: &str = "DRIVE_SIM_ROOT";

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Get the software root directory from the `DRIVE_SIM_ROOT` environment variable.
pub fn get_sim_root() -> Result<PathBuf, env::VarError> {
    env::var(SIM_ROOT_ENV_VAR).map(PathBuf::from)
}
