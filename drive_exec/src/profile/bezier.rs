//! Quintic Bezier curve

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use super::ProfileError;
use crate::geom::{calc_radius, points_from_pairs, Point};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Binomial coefficients for a degree five curve.
const BINOMIALS: [f64; 6] = [1.0, 5.0, 10.0, 10.0, 5.0, 1.0];

/// Parameter step used for finite differences along the curve.
const T_STEP: f64 = 1e-3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A quintic Bezier curve defined by six control points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BezierCurve {
    /// Units: inches
    points: [Point; 6],
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BezierCurve {
    pub fn new(points: [Point; 6]) -> Self {
        Self { points }
    }

    /// Build a curve from plain `[x, y]` pairs.
    pub fn from_pairs(pairs: &[[f64; 2]]) -> Result<Self, ProfileError> {
        let pts = points_from_pairs(pairs);

        if pts.len() != 6 {
            return Err(ProfileError::ControlPoints(pts.len()));
        }

        let mut points = [Point::zeros(); 6];
        points.copy_from_slice(&pts);

        Ok(Self { points })
    }

    /// Point on the curve at parameter `t`, which is clamped to `[0, 1]`.
    pub fn point(&self, t: f64) -> Point {
        let t = t.max(0.0).min(1.0);
        let u = 1.0 - t;

        self.points
            .iter()
            .enumerate()
            .fold(Point::zeros(), |acc, (i, p)| {
                acc + p * (BINOMIALS[i] * u.powi(5 - i as i32) * t.powi(i as i32))
            })
    }

    /// Field heading of the curve's direction of travel at `t`.
    ///
    /// Taken from the chord between two nearby points, stepping backwards at the end of the
    /// curve.
    ///
    /// Units: radians
    pub fn heading(&self, t: f64) -> f64 {
        let t = t.max(0.0).min(1.0);
        let (a, b) = if t + T_STEP <= 1.0 {
            (self.point(t), self.point(t + T_STEP))
        } else {
            (self.point(t - T_STEP), self.point(t))
        };

        (b.x - a.x).atan2(b.y - a.y)
    }

    /// Heading at the start of the curve.
    ///
    /// Units: radians
    pub fn initial_heading(&self) -> f64 {
        self.heading(0.0)
    }

    /// Radius of curvature at `t`, from the circle through three nearby points.
    ///
    /// Units: inches
    pub fn radius(&self, t: f64) -> f64 {
        let t = t.max(T_STEP).min(1.0 - T_STEP);
        calc_radius(
            &self.point(t - T_STEP),
            &self.point(t),
            &self.point(t + T_STEP),
        )
    }

    pub fn control_points(&self) -> &[Point; 6] {
        &self.points
    }

    pub fn start(&self) -> Point {
        self.points[0]
    }

    pub fn end(&self) -> Point {
        self.points[5]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{points_eq, RADIUS_SENTINEL};
    use std::f64::consts::FRAC_PI_2;

    fn curve() -> BezierCurve {
        BezierCurve::from_pairs(&[
            [5.4, 3.7],
            [97.0, 6.0],
            [136.0, 73.2],
            [99.7, 60.2],
            [146.0, 51.0],
            [149.4, 150.4],
        ])
        .unwrap()
    }

    #[test]
    fn test_end_points() {
        let c = curve();

        let start = c.point(0.0);
        assert!((start.x - 5.4).abs() < 0.1 && (start.y - 3.7).abs() < 0.1);
        assert!(points_eq(&c.point(1.0), &Point::new(149.4, 150.4)));

        // Out of range parameters are clamped
        assert_eq!(c.point(-1.0), c.point(0.0));
        assert_eq!(c.point(2.0), c.point(1.0));
    }

    #[test]
    fn test_straight_curve() {
        let c = BezierCurve::from_pairs(&[
            [0.0, 0.0],
            [20.0, 0.0],
            [40.0, 0.0],
            [60.0, 0.0],
            [80.0, 0.0],
            [100.0, 0.0],
        ])
        .unwrap();

        // Evenly spaced control points on a line give a linear parameterisation
        assert!(points_eq(&c.point(0.5), &Point::new(50.0, 0.0)));
        assert!((c.initial_heading() - FRAC_PI_2).abs() < 1e-9);
        assert!((c.heading(1.0) - FRAC_PI_2).abs() < 1e-9);
        assert_eq!(c.radius(0.5), RADIUS_SENTINEL);
    }

    #[test]
    fn test_initial_heading_follows_first_leg() {
        // First leg runs along +x, which is a field heading of +90 degrees
        let c = curve();
        assert!(c.initial_heading() > 1.4 && c.initial_heading() < FRAC_PI_2);
        assert!(c.radius(0.5) < RADIUS_SENTINEL);
    }

    #[test]
    fn test_wrong_point_count() {
        assert!(matches!(
            BezierCurve::from_pairs(&[[0.0, 0.0]; 5]),
            Err(ProfileError::ControlPoints(5))
        ));
    }
}
