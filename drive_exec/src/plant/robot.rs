//! Differential drive chassis dynamics

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;

// Internal
use super::{Gearbox, Motor, Params};
use crate::geom::{translate, Point, Pose, Rgb};
use crate::telem::Telemetry;
use util::maths::{clamp, INCHES_TO_METERS, LBS_TO_KG, MAX_VOLTAGE};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The simulated robot: two gearboxes driving a rigid chassis.
///
/// Distances exposed by the getters are in inches and linear speeds in feet/second; the dynamics
/// are integrated in SI units.
#[derive(Debug, Clone)]
pub struct Robot {
    // ---- CONSTANTS ----
    /// Units: meters
    wheel_radius_m: f64,

    /// Units: kilograms
    mass_kg: f64,

    /// Units: meters
    width_m: f64,

    /// Units: kilogram meters^2
    moi: f64,

    /// Distance from the centre to each side.
    ///
    /// Units: meters
    pivot_m: f64,

    /// Coupling of a side's force onto the opposite side's acceleration.
    f_m: f64,

    /// Coupling of a side's force onto its own acceleration.
    f_p: f64,

    /// Units: feet/second
    max_lin_speed_fps: f64,

    /// Units: radians/second
    max_ang_speed_rads: f64,

    /// Tick period.
    ///
    /// Units: seconds
    dt: f64,

    left: Gearbox,
    right: Gearbox,

    // ---- STATE ----
    /// Units: inches
    point: Point,

    /// Units: radians
    heading_rad: f64,

    /// Mean of the two wheel travels.
    ///
    /// Units: inches
    average_pos_in: f64,

    /// Units: feet/second
    linear_vel_fps: f64,

    /// Units: radians/second
    angular_vel_rads: f64,

    color: Rgb,

    /// Clamped voltages applied on the last tick, (left, right).
    last_voltages: (f64, f64),

    /// Units: seconds
    sim_time_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Robot {
    /// Build a robot from its physical parameters, integrating with the given tick period.
    pub fn new(params: &Params, dt: f64) -> Self {
        let motor = Motor::from(params.motor);
        let gearbox = Gearbox::new(params.gear_ratio, motor, params.motors_per_side);
        Self::with_gearbox(params, gearbox, dt)
    }

    /// Build a robot whose two sides are copies of `gearbox`.
    pub fn with_gearbox(params: &Params, gearbox: Gearbox, dt: f64) -> Self {
        let wheel_radius_m = params.wheel_diameter_in / 2.0 * INCHES_TO_METERS;
        let mass_kg = params.mass_lb * LBS_TO_KG;
        let length_m = params.length_in * INCHES_TO_METERS;
        let width_m = params.width_in * INCHES_TO_METERS;

        let moi = mass_kg * (length_m.powi(2) + width_m.powi(2)) / 12.0;
        let pivot_m = width_m / 2.0;

        let f_m = 1.0 / mass_kg - pivot_m.powi(2) / moi;
        let f_p = 1.0 / mass_kg + pivot_m.powi(2) / moi;

        // Wheel surface speed at motor free speed, in ft/s
        let max_lin_speed_fps = std::f64::consts::PI * gearbox.motor().free_speed_rpm
            * wheel_radius_m
            / (360.0 * gearbox.gear_ratio() * INCHES_TO_METERS);
        let max_ang_speed_rads = max_lin_speed_fps * 12.0 * INCHES_TO_METERS / pivot_m;

        Self {
            wheel_radius_m,
            mass_kg,
            width_m,
            moi,
            pivot_m,
            f_m,
            f_p,
            max_lin_speed_fps,
            max_ang_speed_rads,
            dt,
            left: gearbox.clone(),
            right: gearbox,
            point: Point::zeros(),
            heading_rad: 0.0,
            average_pos_in: 0.0,
            linear_vel_fps: 0.0,
            angular_vel_rads: 0.0,
            color: Rgb::YELLOW,
            last_voltages: (0.0, 0.0),
            sim_time_s: 0.0,
        }
    }

    /// Apply a voltage to each side for one tick.
    ///
    /// Voltages outside +/-12 V are clamped before use.
    pub fn apply(&mut self, left_voltage: f64, right_voltage: f64) {
        let left_voltage = clamp(left_voltage, -MAX_VOLTAGE, MAX_VOLTAGE);
        let right_voltage = clamp(right_voltage, -MAX_VOLTAGE, MAX_VOLTAGE);
        self.last_voltages = (left_voltage, right_voltage);

        // Force each wheel exerts on the ground
        let left_force = self.left.calc_torque(left_voltage) / self.wheel_radius_m;
        let right_force = self.right.calc_torque(right_voltage) / self.wheel_radius_m;

        let left_acc = (self.f_p * left_force + self.f_m * right_force) / self.wheel_radius_m;
        let right_acc = (self.f_m * left_force + self.f_p * right_force) / self.wheel_radius_m;

        self.left.update(left_acc, self.dt);
        self.right.update(right_acc, self.dt);

        self.update_speeds();
        self.update_pose();
        self.update_color();

        self.sim_time_s += self.dt;

        trace!(
            "apply({:.3}, {:.3}) -> pos ({:.3}, {:.3}) hdg {:.4} v {:.3}",
            left_voltage,
            right_voltage,
            self.point.x,
            self.point.y,
            self.heading_rad,
            self.linear_vel_fps
        );
    }

    fn update_speeds(&mut self) {
        let (l_vel, r_vel) = (self.left.vel_rads(), self.right.vel_rads());

        self.angular_vel_rads = self.wheel_radius_m / (2.0 * self.pivot_m) * (r_vel - l_vel);
        self.linear_vel_fps = self.wheel_radius_m / INCHES_TO_METERS / 12.0 * (r_vel + l_vel) / 2.0;
    }

    fn update_pose(&mut self) {
        let new_pos_in = (self.left.pos_rad() + self.right.pos_rad()) / 2.0
            * self.wheel_radius_m
            / INCHES_TO_METERS;

        self.point = translate(&self.point, new_pos_in - self.average_pos_in, self.heading_rad);
        self.average_pos_in = new_pos_in;
        self.heading_rad += self.angular_vel_rads * self.dt;
    }

    fn update_color(&mut self) {
        let modifier = (self.linear_vel_fps.abs() / self.max_lin_speed_fps).min(1.0);
        let val = 127 + (128.0 * modifier) as u8;

        self.color = if self.linear_vel_fps > 0.0 {
            Rgb(0, val, 0)
        } else if self.linear_vel_fps < 0.0 {
            Rgb(val, 0, 0)
        } else {
            Rgb::YELLOW
        };
    }

    /// Zero the pose and all kinematic state.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
        self.point = Point::zeros();
        self.heading_rad = 0.0;
        self.average_pos_in = 0.0;
        self.linear_vel_fps = 0.0;
        self.angular_vel_rads = 0.0;
        self.color = Rgb::YELLOW;
        self.last_voltages = (0.0, 0.0);
        self.sim_time_s = 0.0;
    }

    /// Stop the robot where it is.
    pub fn set_to_wait(&mut self) {
        self.left.zero_vel();
        self.right.zero_vel();
        self.linear_vel_fps = 0.0;
        self.angular_vel_rads = 0.0;
        self.last_voltages = (0.0, 0.0);
        self.color = Rgb::YELLOW;
    }

    /// Place the robot at a new position and heading without touching its wheel state.
    pub fn set_pose(&mut self, point: Point, heading_rad: f64) {
        self.point = point;
        self.heading_rad = heading_rad;
    }

    /// True if the linear speed is below `percent` (0 to 1) of the top speed.
    pub fn is_slower_than_percent(&self, percent: f64) -> bool {
        self.linear_vel_fps.abs() < percent * self.max_lin_speed_fps
    }

    /// True if the linear speed is below `vel_fps`.
    pub fn is_slower_than_vel(&self, vel_fps: f64) -> bool {
        self.is_slower_than_percent(vel_fps.abs() / self.max_lin_speed_fps)
    }

    /// Snapshot of the plant's channels. Controller channels are left empty.
    pub fn telemetry(&self) -> Telemetry {
        let to_in = self.wheel_radius_m / INCHES_TO_METERS;
        let (left_voltage, right_voltage) = self.last_voltages;

        Telemetry {
            time_s: self.sim_time_s,
            average_pos_in: self.average_pos_in,
            linear_vel_fps: self.linear_vel_fps,
            angular_vel_rads: self.angular_vel_rads,
            heading_rad: self.heading_rad,
            yaw_deg: self.yaw_deg(),
            x_in: self.point.x,
            y_in: self.point.y,
            left_pos_in: self.left.pos_rad() * to_in,
            right_pos_in: self.right.pos_rad() * to_in,
            left_vel_fps: self.left.vel_rads() * to_in / 12.0,
            right_vel_fps: self.right.vel_rads() * to_in / 12.0,
            left_acc_in_s2: self.left.acc_rads2() * to_in,
            right_acc_in_s2: self.right.acc_rads2() * to_in,
            linear_acc_in_s2: (self.left.acc_rads2() + self.right.acc_rads2()) / 2.0 * to_in,
            angular_acc_rads2: self.wheel_radius_m / (2.0 * self.pivot_m)
                * (self.right.acc_rads2() - self.left.acc_rads2()),
            left_voltage,
            right_voltage,
            ..Default::default()
        }
    }

    // ---- GETTERS ----

    pub fn pose(&self) -> Pose {
        Pose::with_color(self.point, self.heading_rad, self.color)
    }

    pub fn point(&self) -> Point {
        self.point
    }

    /// Units: radians
    pub fn heading(&self) -> f64 {
        self.heading_rad
    }

    /// Heading in degrees, folded into (-360, 360) keeping its sign.
    pub fn yaw_deg(&self) -> f64 {
        self.heading_rad.to_degrees() % 360.0
    }

    /// Units: inches
    pub fn average_pos(&self) -> f64 {
        self.average_pos_in
    }

    /// Units: feet/second
    pub fn linear_vel(&self) -> f64 {
        self.linear_vel_fps
    }

    /// Units: radians/second
    pub fn angular_vel(&self) -> f64 {
        self.angular_vel_rads
    }

    /// Units: feet/second
    pub fn max_lin_speed(&self) -> f64 {
        self.max_lin_speed_fps
    }

    /// Units: radians/second
    pub fn max_ang_speed(&self) -> f64 {
        self.max_ang_speed_rads
    }

    /// Wheel to wheel width.
    ///
    /// Units: inches
    pub fn track_width(&self) -> f64 {
        self.width_m / INCHES_TO_METERS
    }

    /// Units: kilograms
    pub fn mass(&self) -> f64 {
        self.mass_kg
    }

    /// Units: kilogram meters^2
    pub fn moment_of_inertia(&self) -> f64 {
        self.moi
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Clamped (left, right) voltages applied on the last tick.
    pub fn last_voltages(&self) -> (f64, f64) {
        self.last_voltages
    }

    /// Units: seconds
    pub fn tick_period(&self) -> f64 {
        self.dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.005;

    fn robot() -> Robot {
        Robot::new(&Params::default(), DT)
    }

    fn run(r: &mut Robot, left: f64, right: f64, seconds: f64) {
        for _ in 0..(seconds / DT).round() as usize {
            r.apply(left, right);
        }
    }

    #[test]
    fn test_max_speeds() {
        let r = robot();
        assert!((r.max_lin_speed() - 12.0).abs() < 0.01);
        assert!((r.max_ang_speed() - 9.6).abs() < 0.01);
        assert!((r.track_width() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_full_voltage_second() {
        let mut r = robot();
        run(&mut r, 12.0, 12.0, 1.0);

        assert!((r.average_pos() - 128.6).abs() < 1.5);
        assert!((r.linear_vel() - 12.0).abs() < 0.2);
        assert!(r.heading().abs() < 1e-12);
        assert!((r.point().y - r.average_pos()).abs() < 1e-9);
        assert!(matches!(r.color(), Rgb(0, g, 0) if g > 250));
    }

    #[test]
    fn test_spin_in_place() {
        let mut r = robot();
        run(&mut r, -12.0, 12.0, 1.0);

        assert!((r.heading().to_degrees() - 510.0).abs() < 5.0);
        assert!(r.average_pos().abs() < 1e-9);
        assert!((r.yaw_deg() - (r.heading().to_degrees() - 360.0)).abs() < 1e-9);
    }

    #[test]
    fn test_voltage_clamped() {
        let mut a = robot();
        let mut b = robot();

        for _ in 0..200 {
            a.apply(40.0, -100.0);
            b.apply(12.0, -12.0);

            let (l, r) = a.last_voltages();
            assert!(l <= 12.0 && l >= -12.0);
            assert!(r <= 12.0 && r >= -12.0);
        }

        assert_eq!(a.point(), b.point());
        assert_eq!(a.heading(), b.heading());
    }

    #[test]
    fn test_half_voltage_two_seconds() {
        let mut r = robot();
        run(&mut r, 6.0, 6.0, 2.0);
        assert!((r.average_pos() - 135.0).abs() < 2.0);
    }

    #[test]
    fn test_reset_and_wait() {
        let mut r = robot();
        run(&mut r, 12.0, 6.0, 0.5);

        r.set_to_wait();
        assert_eq!(r.linear_vel(), 0.0);
        assert!(r.is_slower_than_percent(0.01));
        assert_eq!(r.color(), Rgb::YELLOW);

        r.reset();
        assert_eq!(r.point(), Point::zeros());
        assert_eq!(r.average_pos(), 0.0);
        assert_eq!(r.telemetry().time_s, 0.0);
    }

    #[test]
    fn test_telemetry_channels() {
        let mut r = robot();
        run(&mut r, 12.0, 12.0, 0.1);
        let t = r.telemetry();

        assert!((t.left_pos_in - r.average_pos()).abs() < 1e-9);
        assert!((t.linear_vel_fps - t.left_vel_fps).abs() < 1e-9);
        assert!(t.linear_acc_in_s2 > 0.0);
        assert_eq!(t.angular_acc_rads2, 0.0);
        assert_eq!((t.left_voltage, t.right_voltage), (12.0, 12.0));
        assert!((t.time_s - 0.1).abs() < 1e-9);
        assert_eq!(t.pid_output, None);
    }
}
