//! Parameters structure for the plant

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Physical description of the simulated robot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    // ---- CHASSIS ----
    /// Diameter of the drive wheels.
    ///
    /// Units: inches
    pub wheel_diameter_in: f64,

    /// Total mass of the robot.
    ///
    /// Units: pounds
    pub mass_lb: f64,

    /// Length of the chassis along the direction of travel.
    ///
    /// Units: inches
    pub length_in: f64,

    /// Width of the chassis, wheel to wheel.
    ///
    /// Units: inches
    pub width_in: f64,

    // ---- DRIVETRAIN ----
    /// The motor model fitted to both gearboxes.
    pub motor: MotorKind,

    /// Number of motors driving each side.
    pub motors_per_side: u32,

    /// Reduction between the motor shaft and the wheel.
    pub gear_ratio: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Motors with known datasheet constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotorKind {
    Neo,
    Cim,
    MiniCim,
    Pro775,
    Falcon500,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl MotorKind {
    /// Datasheet constants as `[free speed rpm, free current A, stall torque Nm, stall current A]`.
    pub fn constants(&self) -> [f64; 4] {
        match self {
            MotorKind::Neo => [5880.0, 1.3, 3.36, 166.0],
            MotorKind::Cim => [5330.0, 2.7, 2.41, 131.0],
            MotorKind::MiniCim => [5840.0, 3.0, 1.41, 89.0],
            MotorKind::Pro775 => [18730.0, 0.7, 0.71, 134.0],
            MotorKind::Falcon500 => [6380.0, 1.5, 4.69, 257.0],
        }
    }
}

impl Default for Params {
    fn default() -> Self {
        Self {
            wheel_diameter_in: 4.0,
            mass_lb: 153.0,
            length_in: 30.0,
            width_in: 30.0,
            motor: MotorKind::Neo,
            motors_per_side: 2,
            gear_ratio: 8.5521,
        }
    }
}
