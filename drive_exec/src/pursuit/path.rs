//! # Waypoint path
//!
//! Waypoints for the pure pursuit tracker, each annotated with its distance along the path, the
//! local radius of curvature and the fastest speed the robot may pass it at.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::Serialize;

// Internal
use crate::geom::{calc_radius, dist, Point, RADIUS_SENTINEL};
use crate::profile::{arc_length_table, t_at_distance, BezierCurve, BezierLimits, BEZIER_SAMPLES};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An annotated list of waypoints.
#[derive(Debug, Clone, Serialize)]
pub struct PursuitPath {
    points: Vec<Point>,

    /// Cumulative distance from the first waypoint.
    ///
    /// Units: inches
    distances: Vec<f64>,

    /// Units: inches
    radii: Vec<f64>,

    /// Curvature and acceleration limited speed.
    ///
    /// Units: inches/second
    speeds: Vec<f64>,

    /// Units: radians
    initial_heading: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("A path needs at least two waypoints, got {0}")]
    TooFewWaypoints(usize),

    #[error("Waypoint spacing must be positive and finite, got {0}")]
    InvalidSpacing(f64),

    #[error("Path limit {0} must be positive and finite, got {1}")]
    InvalidLimit(&'static str, f64),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PursuitPath {
    /// Generate waypoints every `spacing` inches along a Bezier curve.
    ///
    /// The last waypoint is always the end of the curve, even when it is closer than `spacing` to
    /// the one before.
    pub fn new(
        curve: &BezierCurve,
        limits: BezierLimits,
        spacing: f64,
    ) -> Result<Self, PathError> {
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(PathError::InvalidSpacing(spacing));
        }

        let (ts, dists) = arc_length_table(curve, BEZIER_SAMPLES);
        let length = dists[BEZIER_SAMPLES - 1];

        let num_points = ((length / spacing).ceil() as usize + 1).max(2);
        let points = (0..num_points)
            .map(|i| {
                let d = (i as f64 * spacing).min(length);
                curve.point(t_at_distance(&ts, &dists, d))
            })
            .collect();

        let path = Self::annotate(points, curve.initial_heading(), limits)?;

        debug!(
            "Pursuit path: {} waypoints over {:.2} in",
            path.len(),
            path.length()
        );

        Ok(path)
    }

    /// Annotate an explicit list of waypoints.
    ///
    /// The initial heading is taken from the first leg.
    pub fn from_waypoints(points: Vec<Point>, limits: BezierLimits) -> Result<Self, PathError> {
        if points.len() < 2 {
            return Err(PathError::TooFewWaypoints(points.len()));
        }

        let d = points[1] - points[0];
        let initial_heading = d.x.atan2(d.y);

        Self::annotate(points, initial_heading, limits)
    }

    fn annotate(
        points: Vec<Point>,
        initial_heading: f64,
        limits: BezierLimits,
    ) -> Result<Self, PathError> {
        for &(name, value) in &[
            ("track width", limits.track_width),
            ("velocity", limits.max_vel),
            ("acceleration", limits.max_acc),
            ("deceleration", limits.max_dec),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PathError::InvalidLimit(name, value));
            }
        }

        let n = points.len();

        let mut distances = Vec::with_capacity(n);
        distances.push(0.0);
        for i in 1..n {
            distances.push(distances[i - 1] + dist(&points[i - 1], &points[i]));
        }

        let mut radii = vec![RADIUS_SENTINEL; n];
        for i in 1..n.saturating_sub(1) {
            radii[i] = calc_radius(&points[i - 1], &points[i], &points[i + 1]);
        }

        let max_vel = limits.max_vel * 12.0;
        let half_track = limits.track_width / 2.0;
        let mut speeds: Vec<f64> = radii
            .iter()
            .map(|r| max_vel * r / (r + half_track))
            .collect();

        limit_by_gaps(&mut speeds, &distances, limits.max_acc, limits.max_dec);

        Ok(Self {
            points,
            distances,
            radii,
            speeds,
            initial_heading,
        })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Units: inches
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Units: inches
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Units: inches/second
    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    /// Units: radians
    pub fn initial_heading(&self) -> f64 {
        self.initial_heading
    }

    /// Units: inches
    pub fn length(&self) -> f64 {
        self.distances.last().copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Limit the speeds so that every pair of neighbours is reachable over its own gap.
///
/// Both endpoints are pinned to zero. The forward pass applies `acc` and the backward pass `dec`.
fn limit_by_gaps(speeds: &mut [f64], distances: &[f64], acc: f64, dec: f64) {
    let n = speeds.len();
    if n == 0 {
        return;
    }

    speeds[0] = 0.0;
    for i in 1..n {
        let gap = distances[i] - distances[i - 1];
        speeds[i] = speeds[i].min((speeds[i - 1].powi(2) + 2.0 * acc * gap).sqrt());
    }

    speeds[n - 1] = 0.0;
    for i in (0..n - 1).rev() {
        let gap = distances[i + 1] - distances[i];
        speeds[i] = speeds[i].min((speeds[i + 1].powi(2) + 2.0 * dec * gap).sqrt());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::points_eq;

    fn limits() -> BezierLimits {
        BezierLimits::new(30.0, 12.0, 200.0, 200.0)
    }

    /// Check that every neighbour pair is reachable over its own gap.
    fn assert_gap_limited(path: &PursuitPath, acc: f64, dec: f64) {
        let (s, d) = (path.speeds(), path.distances());
        for i in 1..path.len() {
            let gap = d[i] - d[i - 1];
            assert!(
                s[i] <= (s[i - 1].powi(2) + 2.0 * acc * gap).sqrt() + 1e-9,
                "waypoint {} too fast after a {:.3} in gap",
                i,
                gap
            );
            assert!(
                s[i - 1] <= (s[i].powi(2) + 2.0 * dec * gap).sqrt() + 1e-9,
                "waypoint {} too fast before a {:.3} in gap",
                i - 1,
                gap
            );
        }
    }

    #[test]
    fn test_from_curve() {
        let curve = BezierCurve::from_pairs(&[
            [5.4, 3.7],
            [97.0, 6.0],
            [136.0, 73.2],
            [99.7, 60.2],
            [146.0, 51.0],
            [149.4, 150.4],
        ])
        .unwrap();
        let path = PursuitPath::new(&curve, limits(), 24.0).unwrap();

        assert_eq!(path.len(), 11);
        assert!(points_eq(&path.points()[0], &Point::new(5.4, 3.7)));
        assert!(points_eq(
            &path.points()[path.len() - 1],
            &Point::new(149.4, 150.4)
        ));

        // Every interior gap is one spacing apart along the curve
        for w in path.distances()[..path.len() - 1].windows(2) {
            assert!((w[1] - w[0] - 24.0).abs() < 0.5);
        }

        assert_eq!(path.speeds()[0], 0.0);
        assert_eq!(path.speeds()[path.len() - 1], 0.0);
        assert!(path.speeds().iter().all(|s| s.is_finite() && *s <= 144.0));
        assert!((path.initial_heading() - curve.initial_heading()).abs() < 1e-12);
    }

    #[test]
    fn test_from_waypoints() {
        let path = PursuitPath::from_waypoints(
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 75.0),
                Point::new(0.0, 150.0),
            ],
            limits(),
        )
        .unwrap();

        assert_eq!(path.distances(), &[0.0, 75.0, 150.0]);
        assert_eq!(path.radii()[1], RADIUS_SENTINEL);
        assert_eq!(path.initial_heading(), 0.0);
        assert!(path.speeds()[1] > 0.0);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            PursuitPath::from_waypoints(vec![Point::zeros()], limits()),
            Err(PathError::TooFewWaypoints(1))
        ));

        let curve = BezierCurve::from_pairs(&[[0.0, 0.0]; 6]).unwrap();
        assert!(matches!(
            PursuitPath::new(&curve, limits(), 0.0),
            Err(PathError::InvalidSpacing(_))
        ));
    }

    #[test]
    fn test_uneven_waypoints_limited_per_gap() {
        let limits = BezierLimits::new(30.0, 200.0, 200.0, 150.0);
        let path = PursuitPath::from_waypoints(
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 100.0),
                Point::new(0.0, 110.0),
            ],
            limits,
        )
        .unwrap();

        assert_gap_limited(&path, 200.0, 150.0);

        // Only 10 in remain to stop from the middle waypoint
        let stop = (2.0 * 150.0 * 10.0_f64).sqrt();
        assert!((path.speeds()[1] - stop).abs() < 1e-9);
    }

    #[test]
    fn test_short_last_gap_limited() {
        let curve = BezierCurve::from_pairs(&[
            [0.0, 0.0],
            [0.0, 40.0],
            [20.0, 60.0],
            [60.0, 60.0],
            [80.0, 80.0],
            [80.0, 130.0],
        ])
        .unwrap();
        let limits = BezierLimits::new(30.0, 200.0, 300.0, 300.0);
        let path = PursuitPath::new(&curve, limits, 24.0).unwrap();

        let n = path.len();
        let last_gap = path.distances()[n - 1] - path.distances()[n - 2];
        assert!(last_gap > 0.0 && last_gap < 24.0 - 1e-6);

        assert_gap_limited(&path, 300.0, 300.0);
        assert!(path.speeds()[n - 2] <= (2.0 * 300.0 * last_gap).sqrt() + 1e-9);
    }

    #[test]
    fn test_curve_path_limited_per_gap() {
        let curve = BezierCurve::from_pairs(&[
            [5.4, 3.7],
            [97.0, 6.0],
            [136.0, 73.2],
            [99.7, 60.2],
            [146.0, 51.0],
            [149.4, 150.4],
        ])
        .unwrap();
        let path = PursuitPath::new(&curve, limits(), 24.0).unwrap();

        assert_gap_limited(&path, 200.0, 200.0);
    }
}
