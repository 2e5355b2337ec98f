//! # Bezier profile
//!
//! A profile following a quintic Bezier curve under curvature, acceleration and deceleration
//! limits.
//!
//! Construction:
//! 1. Sample the curve at evenly spaced parameter values and accumulate chord lengths, giving a
//!    parameter to distance table and the total arc length.
//! 2. Resample at evenly spaced distances by interpolating that table, so consecutive samples are
//!    a fixed step apart along the curve.
//! 3. Take the radius of curvature from each resampled point and its neighbours.
//! 4. Limit the centre velocity so the outer wheel never exceeds the maximum speed.
//! 5. Apply the acceleration limit forwards from a standing start and the deceleration limit
//!    backwards from a standing finish.
//! 6. Split the centre velocity between the wheels by the sign of the heading change and
//!    integrate each wheel's position over the time spent on each step.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use super::{check_positive, BezierCurve, DriveProfile, ProfileError, TrajSample};
use crate::geom::{angle_wrap, calc_radius, dist, Point, Pose, RADIUS_SENTINEL};
use util::maths::{find_sandwiched, interpolate};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of samples taken along the curve, both in parameter and in distance.
pub const BEZIER_SAMPLES: usize = 500;

/// Tolerance used when looking values up in the distance and time tables.
const LOOKUP_EPS: f64 = 1e-3;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Kinematic limits a Bezier profile is planned under.
#[derive(Debug, Clone, Copy)]
pub struct BezierLimits {
    /// Wheel to wheel width of the robot.
    ///
    /// Units: inches
    pub track_width: f64,

    /// Units: feet/second
    pub max_vel: f64,

    /// Units: inches/second^2
    pub max_acc: f64,

    /// Units: inches/second^2
    pub max_dec: f64,
}

/// A profile along a Bezier curve, parameterised by arc length.
#[derive(Debug, Clone)]
pub struct BezierProfile {
    curve: BezierCurve,
    limits: BezierLimits,

    /// Units: inches
    length: f64,

    /// Distance between consecutive samples.
    ///
    /// Units: inches
    step: f64,

    /// Resampled points, evenly spaced along the curve.
    points: Vec<Point>,

    /// Units: inches
    radii: Vec<f64>,

    /// Units: radians
    headings: Vec<f64>,

    /// Centre velocity.
    ///
    /// Units: inches/second
    velocities: Vec<f64>,

    /// Elapsed time at each sample.
    ///
    /// Units: seconds
    times: Vec<f64>,

    left: Vec<TrajSample>,
    right: Vec<TrajSample>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BezierLimits {
    pub fn new(track_width: f64, max_vel: f64, max_acc: f64, max_dec: f64) -> Self {
        Self {
            track_width,
            max_vel,
            max_acc,
            max_dec,
        }
    }
}

impl BezierProfile {
    /// Plan a profile along `curve` under the given limits.
    pub fn new(curve: BezierCurve, limits: BezierLimits) -> Result<Self, ProfileError> {
        check_positive("track width", limits.track_width)?;
        check_positive("velocity", limits.max_vel)?;
        check_positive("acceleration", limits.max_acc)?;
        check_positive("deceleration", limits.max_dec)?;

        let n = BEZIER_SAMPLES;
        let (ts, dists) = arc_length_table(&curve, n);
        let length = dists[n - 1];
        let step = length / (n - 1) as f64;

        let points: Vec<Point> = (0..n)
            .map(|i| curve.point(t_at_distance(&ts, &dists, i as f64 * step)))
            .collect();

        // Ends have no neighbour on one side
        let mut radii = vec![RADIUS_SENTINEL; n];
        for i in 1..n - 1 {
            radii[i] = calc_radius(&points[i - 1], &points[i], &points[i + 1]);
        }

        let max_vel = limits.max_vel * 12.0;
        let half_track = limits.track_width / 2.0;
        let mut velocities: Vec<f64> = radii
            .iter()
            .map(|r| max_vel * r / (r + half_track))
            .collect();
        limit_accelerations(&mut velocities, step, limits.max_acc, limits.max_dec);

        let mut headings = Vec::with_capacity(n);
        headings.push(chord_heading(&points[0], &points[1]));
        for i in 1..n {
            headings.push(chord_heading(&points[i - 1], &points[i]));
        }

        // Per wheel velocities from the offset wheel radii
        let (left_vel, right_vel): (Vec<f64>, Vec<f64>) = (0..n)
            .map(|i| {
                let r = radii[i];
                let dh = if i == 0 {
                    0.0
                } else {
                    angle_wrap(headings[i] - headings[i - 1])
                };

                let (left_r, right_r) = if dh > 0.0 {
                    (r - half_track, r + half_track)
                } else if dh < 0.0 {
                    (r + half_track, r - half_track)
                } else {
                    (r, r)
                };

                (velocities[i] * left_r / r, velocities[i] * right_r / r)
            })
            .unzip();

        let mut times = vec![0.0; n];
        let mut left = vec![TrajSample::default(); n];
        let mut right = vec![TrajSample::default(); n];
        left[0].vel = left_vel[0] / 12.0;
        right[0].vel = right_vel[0] / 12.0;

        for i in 1..n {
            // A stationary sample takes no time to cross
            let dt = if velocities[i] == 0.0 {
                0.0
            } else {
                step / velocities[i]
            };
            times[i] = times[i - 1] + dt;

            left[i] = integrate(&left[i - 1], left_vel[i - 1], left_vel[i], dt);
            right[i] = integrate(&right[i - 1], right_vel[i - 1], right_vel[i], dt);
        }

        debug!(
            "Bezier profile: {:.2} in over {:.3} s, {} samples, tightest radius {:.2} in",
            length,
            times[n - 1],
            n,
            radii.iter().cloned().fold(RADIUS_SENTINEL, f64::min)
        );

        Ok(Self {
            curve,
            limits,
            length,
            step,
            points,
            radii,
            headings,
            velocities,
            times,
            left,
            right,
        })
    }

    /// Index of the sample in effect at `time_s`.
    fn index_at(&self, time_s: f64) -> usize {
        find_sandwiched(&self.times, time_s, LOOKUP_EPS)
            .map(|(lo, _)| lo)
            .unwrap_or(0)
    }

    /// Units: radians
    pub fn heading(&self, time_s: f64) -> f64 {
        self.headings[self.index_at(time_s)]
    }

    pub fn pose(&self, time_s: f64) -> Pose {
        let i = self.index_at(time_s);
        Pose::new(self.points[i], self.headings[i])
    }

    /// Units: feet/second
    pub fn center_velocity(&self, time_s: f64) -> f64 {
        self.velocities[self.index_at(time_s)] / 12.0
    }

    /// Rate of turn implied by the wheel velocities, positive when the heading grows.
    ///
    /// Units: radians/second
    pub fn omega(&self, time_s: f64) -> f64 {
        let i = self.index_at(time_s);
        (self.right[i].vel - self.left[i].vel) * 12.0 / self.limits.track_width
    }

    /// Radius of curvature at the sample in effect at `time_s`.
    ///
    /// Units: inches
    pub fn radius(&self, time_s: f64) -> f64 {
        self.radii[self.index_at(time_s)]
    }

    pub fn start_point(&self) -> Point {
        self.curve.start()
    }

    /// Units: radians
    pub fn initial_heading(&self) -> f64 {
        self.curve.initial_heading()
    }

    /// Arc length of the curve.
    ///
    /// Units: inches
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Units: inches
    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn curve(&self) -> &BezierCurve {
        &self.curve
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }
}

impl DriveProfile for BezierProfile {
    fn left_sample(&self, time_s: f64) -> TrajSample {
        self.left[self.index_at(time_s)]
    }

    fn right_sample(&self, time_s: f64) -> TrajSample {
        self.right[self.index_at(time_s)]
    }

    fn total_time(&self) -> f64 {
        self.times.last().copied().unwrap_or(0.0)
    }

    fn total_distance(&self) -> f64 {
        self.length
    }

    fn len(&self) -> usize {
        self.points.len()
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Sample the curve at `n` evenly spaced parameter values, returning the parameters and the
/// cumulative chord length at each.
pub(crate) fn arc_length_table(curve: &BezierCurve, n: usize) -> (Vec<f64>, Vec<f64>) {
    let ts: Vec<f64> = (0..n).map(|i| i as f64 / (n - 1) as f64).collect();
    let pts: Vec<Point> = ts.iter().map(|&t| curve.point(t)).collect();

    let mut dists = Vec::with_capacity(n);
    dists.push(0.0);
    for i in 1..n {
        dists.push(dists[i - 1] + dist(&pts[i - 1], &pts[i]));
    }

    (ts, dists)
}

/// Parameter at which the curve has covered `distance`, interpolated from the chord table.
pub(crate) fn t_at_distance(ts: &[f64], dists: &[f64], distance: f64) -> f64 {
    match find_sandwiched(dists, distance, LOOKUP_EPS) {
        Some((lo, hi)) if lo == hi => ts[lo],
        Some((lo, hi)) => interpolate(distance, ts[lo], dists[lo], ts[hi], dists[hi]),
        None => 0.0,
    }
}

/// Apply the acceleration limit forwards and the deceleration limit backwards, starting and
/// finishing at rest.
///
/// After this every speed satisfies `v[i] <= sqrt(v[j]^2 + 2 a step)` for both neighbours `j`.
pub(crate) fn limit_accelerations(vels: &mut [f64], step: f64, max_acc: f64, max_dec: f64) {
    let n = vels.len();
    if n == 0 {
        return;
    }

    vels[0] = 0.0;
    for i in 1..n {
        vels[i] = vels[i].min((vels[i - 1].powi(2) + 2.0 * max_acc * step).sqrt());
    }

    vels[n - 1] = 0.0;
    for i in (0..n - 1).rev() {
        vels[i] = vels[i].min((vels[i + 1].powi(2) + 2.0 * max_dec * step).sqrt());
    }
}

/// Field heading of the chord from `a` to `b`.
fn chord_heading(a: &Point, b: &Point) -> f64 {
    (b.x - a.x).atan2(b.y - a.y)
}

/// Advance a wheel sample over `dt` seconds to the velocity `vel` (inches/second).
fn integrate(prev: &TrajSample, prev_vel: f64, vel: f64, dt: f64) -> TrajSample {
    let acc = if dt == 0.0 { 0.0 } else { (vel - prev_vel) / dt };
    TrajSample::new(prev.pos + vel * dt, vel / 12.0, acc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> BezierLimits {
        BezierLimits::new(30.0, 12.0, 200.0, 200.0)
    }

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

    fn all_finite(p: &BezierProfile) -> bool {
        p.left
            .iter()
            .chain(p.right.iter())
            .all(|s| s.pos.is_finite() && s.vel.is_finite() && s.acc.is_finite())
            && p.times.iter().all(|t| t.is_finite())
    }

    #[test]
    fn test_curved_profile() {
        let p = BezierProfile::new(curve(), limits()).unwrap();

        assert!((p.length() - 229.07).abs() < 0.5);
        assert!((p.total_time() - 2.31).abs() < 0.1);
        assert_eq!(p.len(), BEZIER_SAMPLES);
        assert!(all_finite(&p));

        // Starts and finishes at rest
        assert_eq!(p.left_sample(0.0).vel, 0.0);
        assert_eq!(p.center_velocity(p.total_time() + 1.0), 0.0);

        // No wheel ever exceeds the limit
        assert!(p
            .left
            .iter()
            .chain(p.right.iter())
            .all(|s| s.vel <= 12.0 + 1e-9));

        // Resampled points are evenly spaced
        for w in p.points().windows(2) {
            assert!((dist(&w[0], &w[1]) - p.step()).abs() < 0.05);
        }

        assert_eq!(p.start_point(), Point::new(5.4, 3.7));
    }

    #[test]
    fn test_velocities_respect_acceleration() {
        let p = BezierProfile::new(curve(), limits()).unwrap();
        let step = p.step();

        for w in p.velocities.windows(2) {
            assert!(w[1] <= (w[0].powi(2) + 2.0 * 200.0 * step).sqrt() + 1e-9);
            assert!(w[0] <= (w[1].powi(2) + 2.0 * 200.0 * step).sqrt() + 1e-9);
        }
    }

    #[test]
    fn test_straight_profile() {
        let c = BezierCurve::from_pairs(&[
            [0.0, 0.0],
            [0.0, 20.0],
            [0.0, 40.0],
            [0.0, 60.0],
            [0.0, 80.0],
            [0.0, 100.0],
        ])
        .unwrap();
        let p = BezierProfile::new(c, limits()).unwrap();

        assert!((p.length() - 100.0).abs() < 1e-6);
        assert!(p.initial_heading().abs() < 1e-9);

        // Both wheels travel the same distance in a straight line
        let t = p.total_time();
        assert!((p.left_sample(t).pos - p.right_sample(t).pos).abs() < 1e-6);
        assert!((p.left_sample(t).pos - 100.0).abs() < 1.0);
        assert!(p.omega(t / 2.0).abs() < 1e-9);
        assert!(p.heading(t / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_curve() {
        let c = BezierCurve::from_pairs(&[[10.0, 10.0]; 6]).unwrap();
        let p = BezierProfile::new(c, limits()).unwrap();

        assert_eq!(p.length(), 0.0);
        assert_eq!(p.total_time(), 0.0);
        assert!(all_finite(&p));
        assert_eq!(p.pose(0.0).point, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_rejects_bad_limits() {
        assert!(BezierProfile::new(curve(), BezierLimits::new(0.0, 12.0, 200.0, 200.0)).is_err());
        assert!(BezierProfile::new(curve(), BezierLimits::new(30.0, 12.0, -1.0, 200.0)).is_err());
    }
}
