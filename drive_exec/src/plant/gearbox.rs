//! Gearbox model
//!
//! A gearbox couples one or more identical motors to a wheel through a fixed reduction and
//! integrates the wheel's angular state.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::f64::consts::PI;

use super::Motor;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A gearbox and its wheel-side kinematic state.
#[derive(Debug, Clone)]
pub struct Gearbox {
    motor: Motor,
    gear_ratio: f64,
    num_motors: u32,

    /// Torque per volt applied.
    c_v: f64,

    /// Torque per rad/s of wheel speed, negative (back EMF damping).
    c_omega: f64,

    /// Units: radians
    pos_rad: f64,

    /// Units: radians/second
    vel_rads: f64,

    /// Units: radians/second^2
    acc_rads2: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Gearbox {
    pub fn new(gear_ratio: f64, motor: Motor, num_motors: u32) -> Self {
        let n = num_motors as f64;
        let c_v = gear_ratio * motor.k_torque * n / motor.k_resistance;
        let c_omega = -(gear_ratio * gear_ratio) * motor.k_torque * n
            / (motor.k_resistance * motor.k_voltage);

        Self {
            motor,
            gear_ratio,
            num_motors,
            c_v,
            c_omega,
            pos_rad: 0.0,
            vel_rads: 0.0,
            acc_rads2: 0.0,
        }
    }

    /// Gear ratio which gives the requested top speed.
    ///
    /// Units: `wheel_dia_in` inches, `top_speed_fps` feet/second
    pub fn ratio_from_top_speed(motor: &Motor, wheel_dia_in: f64, top_speed_fps: f64) -> f64 {
        PI * motor.free_speed_rpm * wheel_dia_in / (720.0 * top_speed_fps)
    }

    /// Wheel torque produced at the given voltage and the current wheel speed.
    ///
    /// Units: newton meters
    pub fn calc_torque(&self, voltage: f64) -> f64 {
        self.c_v * voltage + self.c_omega * self.vel_rads
    }

    /// Advance the wheel by one tick under constant acceleration.
    ///
    /// Velocity is updated first and then used for the position step (semi-implicit Euler).
    pub fn update(&mut self, acc_rads2: f64, dt: f64) {
        self.acc_rads2 = acc_rads2;
        self.vel_rads += acc_rads2 * dt;
        self.pos_rad += self.vel_rads * dt + 0.5 * acc_rads2 * dt * dt;
    }

    /// Zero the kinematic state.
    pub fn reset(&mut self) {
        self.pos_rad = 0.0;
        self.vel_rads = 0.0;
        self.acc_rads2 = 0.0;
    }

    /// Stop the wheel without losing its position.
    pub fn zero_vel(&mut self) {
        self.vel_rads = 0.0;
        self.acc_rads2 = 0.0;
    }

    pub fn pos_rad(&self) -> f64 {
        self.pos_rad
    }

    pub fn vel_rads(&self) -> f64 {
        self.vel_rads
    }

    pub fn acc_rads2(&self) -> f64 {
        self.acc_rads2
    }

    pub fn motor(&self) -> &Motor {
        &self.motor
    }

    pub fn gear_ratio(&self) -> f64 {
        self.gear_ratio
    }

    pub fn num_motors(&self) -> u32 {
        self.num_motors
    }
}
