//! Field positioning helpers
//!
//! Distances, bearings and intersection tests in the field frame.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::f64::consts::PI;

// Internal
use super::{set_mag, vec_heading, Point};
use util::maths::fuzzy_eq;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Radius reported for straight (or degenerate) sections of a path.
///
/// Units: inches
pub const RADIUS_SENTINEL: f64 = 1e5;

/// Triangle areas below this are treated as collinear.
///
/// Units: square inches
const DEGENERATE_AREA: f64 = 1e-9;

/// Tolerance used by `point_on_segment`.
///
/// Units: inches
pub const ON_SEGMENT_EPS: f64 = 0.001;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Euclidean distance between two points.
pub fn dist(a: &Point, b: &Point) -> f64 {
    (b - a).norm()
}

/// Squared distance between two points.
pub fn dist_sq(a: &Point, b: &Point) -> f64 {
    (b - a).norm_squared()
}

/// Field yaw (degrees, zero along +y, positive towards +x) the robot must face at `current` to
/// look directly at `goal`.
///
/// The result lies in `(-180, 180]`.
pub fn goal_yaw(current: &Point, goal: &Point) -> f64 {
    let dx = goal.x - current.x;
    let dy = goal.y - current.y;

    if dy == 0.0 {
        if dx > 0.0 {
            90.0
        } else {
            -90.0
        }
    } else if dx == 0.0 {
        if dy > 0.0 {
            0.0
        } else {
            180.0
        }
    } else if dy < 0.0 && dx > 0.0 {
        90.0 - (dy / dx).atan().to_degrees()
    } else if dy < 0.0 && dx < 0.0 {
        -90.0 - (dy / dx).atan().to_degrees()
    } else {
        dx.atan2(dy).to_degrees()
    }
}

/// Difference between the standard headings of two position vectors.
///
/// Units: radians
pub fn angle_between(a: &Point, b: &Point) -> f64 {
    vec_heading(b) - vec_heading(a)
}

/// True if `current` is inside the axis-aligned square of half-width `range` centred on `target`.
pub fn is_within_bounds(target: &Point, current: &Point, range: f64) -> bool {
    (target.x - current.x).abs() < range && (target.y - current.y).abs() < range
}

/// Radius of the circle passing through three points.
///
/// Uses `abc / 4K` where `K` is the triangle area from Heron's formula, arranged in Kahan's
/// cancellation-free form. Collinear or coincident points give `RADIUS_SENTINEL`, as does any
/// radius larger than it.
pub fn calc_radius(p1: &Point, p2: &Point, p3: &Point) -> f64 {
    let mut sides = [dist(p1, p2), dist(p2, p3), dist(p1, p3)];
    sides.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let [a, b, c] = sides;

    let prod = (a + (b + c)) * (c - (a - b)) * (c + (a - b)) * (a + (b - c));
    let area = 0.25 * prod.max(0.0).sqrt();

    if fuzzy_eq(area, 0.0, DEGENERATE_AREA) {
        return RADIUS_SENTINEL;
    }

    (a * b * c / (4.0 * area)).min(RADIUS_SENTINEL)
}

/// Wrap an angle into `[-pi, pi)`.
pub fn angle_wrap(ang_rad: f64) -> f64 {
    ang_rad - 2.0 * PI * ((ang_rad + PI) / (2.0 * PI)).floor()
}

/// Wrap an angle into `[-180, 180)`.
pub fn angle_wrap_deg(ang_deg: f64) -> f64 {
    ang_deg - 360.0 * ((ang_deg + 180.0) / 360.0).floor()
}

/// Project `p` onto the infinite line through `a` and `b`.
pub fn normal_point(p: &Point, a: &Point, b: &Point) -> Point {
    let ap = p - a;
    let ab = b - a;

    if ab.norm() == 0.0 {
        return *a;
    }

    a + set_mag(&ab, ap.dot(&ab.normalize()))
}

/// True if `p` lies on the segment `a`-`b` within `eps`.
pub fn point_on_segment(p: &Point, a: &Point, b: &Point, eps: f64) -> bool {
    fuzzy_eq(dist(a, b), dist(p, a) + dist(p, b), eps)
}

/// Intersections between the segment from `start` to `end` and the circle of radius `r` centred
/// on `centre`.
///
/// Solves the quadratic in the segment's parameter and keeps the roots that fall inside the
/// segment. A tangent segment yields a single point.
pub fn line_circle_intersect(start: &Point, end: &Point, centre: &Point, r: f64) -> Vec<Point> {
    let d = end - start;
    let f = start - centre;

    let a = d.dot(&d);
    let b = 2.0 * f.dot(&d);
    let c = f.dot(&f) - r * r;

    let disc = b * b - 4.0 * a * c;

    // Zero length segments have no direction to intersect along
    if disc < 0.0 || a == 0.0 {
        return Vec::new();
    }

    let root = disc.sqrt();
    let mut ts = vec![(-b - root) / (2.0 * a)];
    if root > 0.0 {
        ts.push((-b + root) / (2.0 * a));
    }

    ts.into_iter()
        .map(|t| start + d * t)
        .filter(|p| point_on_segment(p, start, end, ON_SEGMENT_EPS))
        .collect()
}

/// Swap the x and y coordinates of every control point.
pub fn flip_curve(curve: &[[f64; 2]]) -> Vec<[f64; 2]> {
    curve.iter().map(|[x, y]| [*y, *x]).collect()
}

/// Convert plain `[x, y]` pairs into points.
pub fn points_from_pairs(pairs: &[[f64; 2]]) -> Vec<Point> {
    pairs.iter().map(|[x, y]| Point::new(*x, *y)).collect()
}
