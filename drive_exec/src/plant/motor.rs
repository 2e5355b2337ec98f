//! DC motor model

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::PI;

use super::MotorKind;
use util::maths::MAX_VOLTAGE;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Voltage lost to friction before the motor turns.
///
/// Units: volts
pub const V_INTERCEPT: f64 = 0.206;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Datasheet constants of a brushed DC motor and the electrical constants derived from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motor {
    /// Units: rpm
    pub free_speed_rpm: f64,

    /// Units: amps
    pub free_current_a: f64,

    /// Units: newton meters
    pub stall_torque_nm: f64,

    /// Units: amps
    pub stall_current_a: f64,

    /// Winding resistance.
    ///
    /// Units: ohms
    pub k_resistance: f64,

    /// Speed produced per volt of back EMF.
    ///
    /// Units: radians/second/volt
    pub k_voltage: f64,

    /// Torque produced per amp.
    ///
    /// Units: newton meters/amp
    pub k_torque: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Motor {
    /// Build a motor from its datasheet constants.
    pub fn new(
        free_speed_rpm: f64,
        free_current_a: f64,
        stall_torque_nm: f64,
        stall_current_a: f64,
    ) -> Self {
        let k_resistance = MAX_VOLTAGE / stall_current_a;
        let free_speed_rads = free_speed_rpm * PI / 30.0;

        Self {
            free_speed_rpm,
            free_current_a,
            stall_torque_nm,
            stall_current_a,
            k_resistance,
            k_voltage: free_speed_rads
                / (MAX_VOLTAGE - k_resistance * free_current_a + V_INTERCEPT),
            k_torque: stall_torque_nm / stall_current_a,
        }
    }
}

impl From<MotorKind> for Motor {
    fn from(kind: MotorKind) -> Self {
        let [rpm, free_a, stall_nm, stall_a] = kind.constants();
        Motor::new(rpm, free_a, stall_nm, stall_a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neo_constants() {
        let m = Motor::from(MotorKind::Neo);

        assert!((m.k_resistance - 12.0 / 166.0).abs() < 1e-12);
        assert!((m.k_torque - 3.36 / 166.0).abs() < 1e-12);

        // Free speed is reached at full voltage once the friction intercept is accounted for
        let free_rads = 5880.0 * PI / 30.0;
        let back_emf = MAX_VOLTAGE - m.k_resistance * m.free_current_a + V_INTERCEPT;
        assert!((m.k_voltage * back_emf - free_rads).abs() < 1e-9);
    }
}
