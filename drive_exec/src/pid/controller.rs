//! # PID controller
//!
//! The controller is tick based: the derivative term is the change in error since the previous
//! call, not a rate, so gains are only meaningful for the tick period they were tuned at.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::PidGains;
use util::maths::{regulated_clamp, MAX_VOLTAGE};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    gains: PidGains,

    /// Top speed of the robot, used to turn speed limits into voltage limits.
    ///
    /// Units: feet/second
    max_speed_fps: f64,

    /// Units: seconds
    dt: f64,

    /// The integral accumulation
    error_sum: f64,

    /// Previous error
    prev_error: Option<f64>,

    /// Previous measurement, used by the distance-velocity variant
    prev_measurement: Option<f64>,

    /// Whether the last computed error was inside the tolerance
    at_target: bool,

    /// Position the distance-velocity variant measures displacement from.
    ///
    /// Units: inches
    init_pos: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains.
    pub fn new(gains: PidGains, max_speed_fps: f64, dt: f64) -> Self {
        Self {
            gains,
            max_speed_fps,
            dt,
            error_sum: 0.0,
            prev_error: None,
            prev_measurement: None,
            at_target: false,
            init_pos: 0.0,
        }
    }

    /// Get the output of the controller.
    ///
    /// Sets `at_target` when `|setpoint - measurement| <= tolerance`.
    pub fn compute(&mut self, setpoint: f64, measurement: f64, tolerance: f64) -> f64 {
        let error = setpoint - measurement;
        self.at_target = error.abs() <= tolerance;

        self.error_sum += error;

        // No derivative until there is a previous error to difference against
        let d_out = match self.prev_error {
            Some(e) => self.gains.k_d * (error - e),
            None => 0.0,
        };
        self.prev_error = Some(error);

        self.gains.k_p * error + self.gains.k_i * self.error_sum + d_out
    }

    /// Get the output of the controller with its magnitude held between the voltages matching
    /// `min_speed` and `top_speed`.
    ///
    /// Units: speeds in feet/second, output in volts
    pub fn compute_regulated(
        &mut self,
        setpoint: f64,
        measurement: f64,
        tolerance: f64,
        top_speed: f64,
        min_speed: f64,
    ) -> f64 {
        let out = self.compute(setpoint, measurement, tolerance);

        let top_limit = MAX_VOLTAGE * top_speed.abs() / self.max_speed_fps;
        let bottom_limit = MAX_VOLTAGE * min_speed.abs() / self.max_speed_fps;

        regulated_clamp(out, bottom_limit, top_limit)
    }

    /// Distance-velocity variant used when following a profile.
    ///
    /// The proportional term acts on position error, the derivative term on the difference
    /// between the goal velocity and the velocity measured over the last tick. The controller is
    /// at target once the displacement from `init_pos` reaches the commanded displacement, less
    /// the tolerance.
    ///
    /// Units: positions in inches, `goal_vel` in feet/second
    pub fn compute_dv(
        &mut self,
        setpoint: f64,
        measurement: f64,
        goal_vel: f64,
        tolerance: f64,
    ) -> f64 {
        let error = setpoint - measurement;

        self.at_target =
            (measurement - self.init_pos).abs() >= (setpoint - self.init_pos).abs() - tolerance;

        let p_out = self.gains.k_p * error;

        let d_out = match self.prev_measurement {
            Some(m) => {
                let measured_vel = (measurement - m) / (self.dt * 12.0);
                self.gains.k_d * (goal_vel - measured_vel)
            }
            None => 0.0,
        };

        self.prev_error = Some(error);
        self.prev_measurement = Some(measurement);

        p_out + d_out
    }

    /// Clear the accumulated state so the next call starts fresh.
    pub fn reset(&mut self) {
        self.error_sum = 0.0;
        self.prev_error = None;
        self.prev_measurement = None;
        self.at_target = false;
    }

    /// Whether the error was within tolerance on the last call.
    pub fn at_target(&self) -> bool {
        self.at_target
    }

    pub fn set_init_pos(&mut self, init_pos: f64) {
        self.init_pos = init_pos;
    }

    pub fn init_pos(&self) -> f64 {
        self.init_pos
    }

    pub fn gains(&self) -> PidGains {
        self.gains
    }

    /// Swap the gains, clearing the accumulated state.
    pub fn set_gains(&mut self, gains: PidGains) {
        self.gains = gains;
        self.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(gains: PidGains) -> PidController {
        PidController::new(gains, 12.0, 0.005)
    }

    #[test]
    fn test_at_target_round_trip() {
        let mut c = pid(PidGains::DRIVE_PROFILE);
        assert!(!c.at_target());

        c.compute(10.0, 0.0, 1.0);
        assert!(!c.at_target());

        c.compute(10.0, 9.5, 1.0);
        assert!(c.at_target());

        c.reset();
        assert!(!c.at_target());

        c.compute(10.0, 9.0, 1.0);
        assert!(c.at_target());
    }

    #[test]
    fn test_terms() {
        let mut c = pid(PidGains::new(2.0, 0.5, 1.0));

        // First call: P and I only
        assert_eq!(c.compute(4.0, 0.0, 0.1), 2.0 * 4.0 + 0.5 * 4.0);

        // Second call: error fell by 1
        assert_eq!(c.compute(4.0, 1.0, 0.1), 2.0 * 3.0 + 0.5 * 7.0 - 1.0);

        // Reset drops the integral and the derivative history
        c.reset();
        assert_eq!(c.compute(4.0, 2.0, 0.1), 2.0 * 2.0 + 0.5 * 2.0);
    }

    #[test]
    fn test_regulated_bounds() {
        let mut c = pid(PidGains::new(1.0, 0.0, 0.0));

        // Half top speed caps the output at 6 V
        assert_eq!(c.compute_regulated(100.0, 0.0, 1.0, 6.0, 0.0), 6.0);
        assert_eq!(c.compute_regulated(-100.0, 0.0, 1.0, 6.0, 0.0), -6.0);

        // A 1 ft/s floor lifts small outputs to 1 V
        assert_eq!(c.compute_regulated(0.5, 0.0, 0.1, 12.0, 1.0), 1.0);
        assert_eq!(c.compute_regulated(-0.5, 0.0, 0.1, 12.0, 1.0), -1.0);

        // In between the output is untouched
        assert_eq!(c.compute_regulated(3.0, 0.0, 0.1, 12.0, 1.0), 3.0);
    }

    #[test]
    fn test_dv_at_target() {
        let mut c = pid(PidGains::new(1.0, 0.0, 0.0));
        c.set_init_pos(50.0);

        c.compute_dv(150.0, 60.0, 0.0, 1.0);
        assert!(!c.at_target());

        c.compute_dv(150.0, 149.5, 0.0, 1.0);
        assert!(c.at_target());
    }

    #[test]
    fn test_dv_derivative_uses_velocity_error() {
        let mut c = pid(PidGains::new(0.0, 0.0, 1.0));

        // No history yet
        assert_eq!(c.compute_dv(10.0, 0.0, 5.0, 0.1), 0.0);

        // Moved 0.3 in over one 5 ms tick: 5 ft/s, matching the goal
        let out = c.compute_dv(10.0, 0.3, 5.0, 0.1);
        assert!(out.abs() < 1e-9);

        // Stalled while the goal asks for 5 ft/s
        let out = c.compute_dv(10.0, 0.3, 5.0, 0.1);
        assert!((out - 5.0).abs() < 1e-9);
    }
}
