//! # Geometry module
//!
//! Points, poses and the field positioning helpers used by every controller.
//!
//! The field frame has +y pointing "forwards" at zero heading and +x to the right. Headings grow
//! from +y towards +x, so a heading of pi/2 points along +x. All distances are in inches.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod field;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
pub use field::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Tolerance used when comparing two points for equality.
///
/// Units: inches
pub const POINT_EQ_EPS: f64 = 0.001;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point (or vector) in the field plane.
///
/// Units: inches
pub type Point = Vector2<f64>;

/// A display colour for the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Position and heading of the robot at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Position of the robot's centre.
    ///
    /// Units: inches
    pub point: Point,

    /// Heading of the robot, zero along +y and increasing towards +x.
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// Colour the pose should be displayed with.
    pub color: Rgb,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Rgb {
    pub const PURPLE: Rgb = Rgb(128, 0, 128);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);
}

impl Default for Rgb {
    fn default() -> Self {
        Rgb::PURPLE
    }
}

impl Pose {
    /// Create a new pose with the default colour.
    pub fn new(point: Point, heading_rad: f64) -> Self {
        Self {
            point,
            heading_rad,
            color: Rgb::default(),
        }
    }

    /// Create a new pose with the given colour.
    pub fn with_color(point: Point, heading_rad: f64, color: Rgb) -> Self {
        Self {
            point,
            heading_rad,
            color,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Pose::new(Point::zeros(), 0.0)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Move a point `mag` inches along the field heading `angle_rad`.
pub fn translate(p: &Point, mag: f64, angle_rad: f64) -> Point {
    Point::new(p.x + mag * angle_rad.sin(), p.y + mag * angle_rad.cos())
}

/// Build a vector of the given magnitude pointing at the standard (counter-clockwise from +x)
/// angle `angle_rad`.
pub fn from_polar(mag: f64, angle_rad: f64) -> Point {
    Point::new(mag * angle_rad.cos(), mag * angle_rad.sin())
}

/// Standard angle of a vector measured from +x.
///
/// Units: radians
pub fn vec_heading(p: &Point) -> f64 {
    p.y.atan2(p.x)
}

/// Scale a vector to the given magnitude. The zero vector stays zero.
pub fn set_mag(p: &Point, mag: f64) -> Point {
    let n = p.norm();
    if n == 0.0 {
        *p
    } else {
        p * (mag / n)
    }
}

/// Limit the magnitude of a vector to at most `max`.
pub fn limit_mag(p: &Point, max: f64) -> Point {
    if p.norm() > max {
        set_mag(p, max)
    } else {
        *p
    }
}

/// Raise the magnitude of a vector to at least `min`.
pub fn min_mag(p: &Point, min: f64) -> Point {
    if p.norm() < min {
        set_mag(p, min)
    } else {
        *p
    }
}

/// Compare two points component-wise within `POINT_EQ_EPS`.
pub fn points_eq(a: &Point, b: &Point) -> bool {
    (a.x - b.x).abs() <= POINT_EQ_EPS && (a.y - b.y).abs() <= POINT_EQ_EPS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_translate() {
        let p = translate(&Point::new(1.0, 1.0), 2.0, 0.0);
        assert!(points_eq(&p, &Point::new(1.0, 3.0)));

        let p = translate(&Point::zeros(), 3.0, FRAC_PI_2);
        assert!(points_eq(&p, &Point::new(3.0, 0.0)));
    }

    #[test]
    fn test_vector_ops() {
        let v = Point::new(3.0, 4.0);
        assert_eq!(v.norm(), 5.0);
        assert!(points_eq(&set_mag(&v, 10.0), &Point::new(6.0, 8.0)));
        assert!(points_eq(&limit_mag(&v, 1.0), &Point::new(0.6, 0.8)));
        assert!(points_eq(&limit_mag(&v, 8.0), &v));
        assert!(points_eq(&min_mag(&v, 10.0), &Point::new(6.0, 8.0)));
        assert!(points_eq(&from_polar(2.0, FRAC_PI_2), &Point::new(0.0, 2.0)));
        assert_eq!(set_mag(&Point::zeros(), 4.0), Point::zeros());
        assert!((vec_heading(&Point::new(0.0, 1.0)) - FRAC_PI_2).abs() < 1e-12);
        assert_eq!(v.dot(&Point::new(1.0, 1.0)), 7.0);
    }

    #[test]
    fn test_points_eq() {
        assert!(points_eq(&Point::new(1.0, 2.0), &Point::new(1.0005, 1.9995)));
        assert!(!points_eq(&Point::new(1.0, 2.0), &Point::new(1.01, 2.0)));
    }
}
