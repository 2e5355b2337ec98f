//! Utility maths functions
//!
//! Generic numeric helpers shared by the plant, the controllers and the trajectory planners.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;
use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Conversion factor from inches to meters.
pub const INCHES_TO_METERS: f64 = 0.0254;

/// Conversion factor from pounds to kilograms.
pub const LBS_TO_KG: f64 = 0.453592;

/// Largest voltage magnitude that can be applied to a motor.
///
/// Units: volts
pub const MAX_VOLTAGE: f64 = 12.0;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised by maths helpers when called with inconsistent inputs.
#[derive(Debug, Error, PartialEq)]
pub enum MathsError {
    #[error("Input lengths do not match ({0} vs {1})")]
    LengthMismatch(usize, usize),

    #[error("At least two samples are needed, found {0}")]
    NotEnoughSamples(usize),
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Clamp `value` into `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: Float,
{
    if value > max {
        max
    } else if value < min {
        min
    } else {
        value
    }
}

/// Clamp the magnitude of `value` between a floor and a ceiling while keeping its sign.
///
/// Only the magnitudes of `low` and `high` are used. A value inside `[-low, low]` is pushed out to
/// the floor, a value beyond `high` is pulled back to the ceiling.
pub fn regulated_clamp<T>(value: T, low: T, high: T) -> T
where
    T: Float,
{
    let low = low.abs();
    let high = high.abs();

    if value.abs() > high {
        high.copysign(value)
    } else if value >= -low && value <= low {
        low.copysign(value)
    } else {
        value
    }
}

/// Returns true if `a` and `b` differ by no more than `eps`.
pub fn fuzzy_eq<T>(a: T, b: T, eps: T) -> bool
where
    T: Float,
{
    (a - b).abs() <= eps
}

/// Return whichever of `a` and `b` has the smaller magnitude.
pub fn min_mag<T>(a: T, b: T) -> T
where
    T: Float,
{
    if a.abs() < b.abs() {
        a
    } else {
        b
    }
}

/// Find the `x` for which the line through `(x1, y1)` and `(x2, y2)` reaches `y`.
///
/// A flat line has no unique answer, in which case `x1` is returned.
pub fn interpolate<T>(y: T, x1: T, y1: T, x2: T, y2: T) -> T
where
    T: Float,
{
    if y2 - y1 == T::zero() {
        x1
    } else {
        (y - y1) * (x2 - x1) / (y2 - y1) + x1
    }
}

/// Find the indices of the two elements of an ascending list which sandwich `value`.
///
/// A fuzzy match with an element returns that element's index twice. Values outside the list are
/// clamped to the first or last index. `None` is returned for an empty list.
pub fn find_sandwiched<T>(list: &[T], value: T, eps: T) -> Option<(usize, usize)>
where
    T: Float,
{
    let first = *list.first()?;

    if fuzzy_eq(first, value, eps) {
        return Some((0, 0));
    }

    for i in 1..list.len() {
        if fuzzy_eq(list[i], value, eps) {
            return Some((i, i));
        }

        if list[i - 1] < value && value < list[i] {
            return Some((i - 1, i));
        }
    }

    let k = if value < first { 0 } else { list.len() - 1 };
    Some((k, k))
}

/// Least squares slope of `ys` against `xs`.
///
/// Computed as the Pearson correlation coefficient scaled by the ratio of the sample standard
/// deviations.
pub fn regressed_slope(xs: &[f64], ys: &[f64]) -> Result<f64, MathsError> {
    if xs.len() != ys.len() {
        return Err(MathsError::LengthMismatch(xs.len(), ys.len()));
    }
    if xs.len() < 2 {
        return Err(MathsError::NotEnoughSamples(xs.len()));
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;

    for (x, y) in xs.iter().zip(ys.iter()) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return Ok(0.0);
    }

    let r = sxy / (sxx * syy).sqrt();
    let sx = (sxx / (n - 1.0)).sqrt();
    let sy = (syy / (n - 1.0)).sqrt();

    Ok(r * sy / sx)
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_regulated_clamp() {
        assert_eq!(regulated_clamp(-1.2, 0.2, 1.0), -1.0);
        assert_eq!(regulated_clamp(-0.1, 0.2, 1.0), -0.2);
        assert_eq!(regulated_clamp(-0.6, 0.2, 1.0), -0.6);
        assert_eq!(regulated_clamp(1.5, -0.2, -1.0), 1.0);
        assert_eq!(regulated_clamp(0.05, 0.2, 1.0), 0.2);

        // A zero floor leaves zero untouched
        assert_eq!(regulated_clamp(0.0, 0.0, 12.0), 0.0);
    }

    #[test]
    fn test_clamp_is_idempotent() {
        for v in [-30.0, -12.0, -3.5, 0.0, 7.0, 12.0, 1e9].iter() {
            let once = clamp(*v, -12.0, 12.0);
            assert_eq!(clamp(once, -12.0, 12.0), once);
            assert!(once <= 12.0 && once >= -12.0);
        }
    }

    #[test]
    fn test_interpolate() {
        let t = interpolate(212.0, 1.1555, 200.0, 1.1898, 220.0);
        assert!((t - 1.17608).abs() < 1e-5);

        // Flat segment falls back to the first x
        assert_eq!(interpolate(3.0, 0.5, 2.0, 0.7, 2.0), 0.5);
    }

    #[test]
    fn test_find_sandwiched() {
        let list = [0.0, 2.0, 5.0, 9.0];

        assert_eq!(find_sandwiched(&list, 1.0, 1e-3), Some((0, 1)));
        assert_eq!(find_sandwiched(&list, 5.0, 1e-3), Some((2, 2)));
        assert_eq!(find_sandwiched(&list, 0.0, 1e-3), Some((0, 0)));
        assert_eq!(find_sandwiched(&list, -4.0, 1e-3), Some((0, 0)));
        assert_eq!(find_sandwiched(&list, 20.0, 1e-3), Some((3, 3)));
        assert_eq!(find_sandwiched::<f64>(&[], 1.0, 1e-3), None);

        // Interpolating inside the sandwich gives the fractional parameter
        let ts = [0.0, 0.1, 0.2, 0.3];
        let (lo, hi) = find_sandwiched(&list, 3.5, 1e-3).unwrap();
        let t = interpolate(3.5, ts[lo], list[lo], ts[hi], list[hi]);
        assert!((t - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_min_mag() {
        assert_eq!(min_mag(-1.0, 2.0), -1.0);
        assert_eq!(min_mag(3.0, -2.5), -2.5);
    }

    #[test]
    fn test_regressed_slope() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [2.5, 4.5, 6.5, 8.5];
        assert!((regressed_slope(&xs, &ys).unwrap() - 2.0).abs() < 1e-9);

        assert_eq!(
            regressed_slope(&xs, &ys[..3]),
            Err(MathsError::LengthMismatch(4, 3))
        );
        assert_eq!(
            regressed_slope(&[1.0], &[1.0]),
            Err(MathsError::NotEnoughSamples(1))
        );
    }

    #[test]
    fn test_rem_euclid() {
        assert_eq!(rem_euclid(-1.0, 4.0), 3.0);
        assert_eq!(rem_euclid(5.0, 4.0), 1.0);
    }
}
