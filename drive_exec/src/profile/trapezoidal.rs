//! Trapezoidal (accelerate, cruise, decelerate) profile

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use super::{check_positive, DriveProfile, ProfileError, TickTable, TrajSample};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A straight line profile with symmetric acceleration and deceleration.
///
/// Both wheels follow the same table.
#[derive(Debug, Clone)]
pub struct TrapezoidalProfile {
    table: TickTable,

    /// Units: inches
    total_dist: f64,

    /// Units: inches
    acc_dist: f64,

    /// Units: inches/second
    max_vel: f64,

    /// Units: inches/second^2
    acc: f64,

    /// Units: seconds
    acc_time: f64,

    /// Units: seconds
    cruise_time: f64,

    /// Units: seconds
    total_time: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TrapezoidalProfile {
    /// Build a profile covering `total_dist` inches which spends `acc_dist` inches reaching
    /// `max_vel_fps`.
    ///
    /// An acceleration distance longer than half the total is shortened to half, giving a
    /// triangular profile that never cruises.
    pub fn new(
        total_dist: f64,
        acc_dist: f64,
        max_vel_fps: f64,
        dt: f64,
    ) -> Result<Self, ProfileError> {
        let total_dist = check_positive("distance", total_dist)?;
        let acc_dist = check_positive("acceleration distance", acc_dist)?.min(total_dist / 2.0);
        let max_vel = check_positive("velocity", max_vel_fps)? * 12.0;
        let dt = check_positive("tick period", dt)?;

        let acc = max_vel * max_vel / (2.0 * acc_dist);
        let acc_time = 2.0 * acc_dist / max_vel;
        let cruise_time = (total_dist - 2.0 * acc_dist) / max_vel;
        let total_time = 2.0 * acc_time + cruise_time;

        let mut profile = Self {
            table: TickTable::new(Vec::new(), dt),
            total_dist,
            acc_dist,
            max_vel,
            acc,
            acc_time,
            cruise_time,
            total_time,
        };

        let num_samples = (total_time / dt).ceil() as usize + 1;
        let samples = (0..num_samples)
            .map(|i| profile.evaluate(i as f64 * dt))
            .collect();
        profile.table = TickTable::new(samples, dt);

        debug!(
            "Trapezoidal profile: {:.2} in, {:.3} s, peak {:.2} in/s, {} samples",
            total_dist, total_time, max_vel, num_samples
        );

        Ok(profile)
    }

    /// Closed-form sample at time `t`, clamped to the profile's duration.
    fn evaluate(&self, t: f64) -> TrajSample {
        let t = t.max(0.0).min(self.total_time);
        let decel_start = self.acc_time + self.cruise_time;

        let (pos, vel, acc) = if t < self.acc_time {
            (0.5 * self.acc * t * t, self.acc * t, self.acc)
        } else if t < decel_start {
            (
                self.acc_dist + self.max_vel * (t - self.acc_time),
                self.max_vel,
                0.0,
            )
        } else {
            let td = t - decel_start;
            (
                self.acc_dist + self.max_vel * self.cruise_time + self.max_vel * td
                    - 0.5 * self.acc * td * td,
                (self.max_vel - self.acc * td).max(0.0),
                -self.acc,
            )
        };

        TrajSample::new(pos, vel / 12.0, acc)
    }

    /// Units: inches/second^2
    pub fn acceleration(&self) -> f64 {
        self.acc
    }

    /// Units: feet/second
    pub fn max_velocity(&self) -> f64 {
        self.max_vel / 12.0
    }
}

impl DriveProfile for TrapezoidalProfile {
    fn left_sample(&self, time_s: f64) -> TrajSample {
        self.table.at(time_s)
    }

    fn right_sample(&self, time_s: f64) -> TrajSample {
        self.table.at(time_s)
    }

    fn total_time(&self) -> f64 {
        self.total_time
    }

    fn total_distance(&self) -> f64 {
        self.total_dist
    }

    fn len(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 0.005;

    #[test]
    fn test_ends_at_total_distance() {
        for &(dist, acc_dist, vel) in &[
            (100.0, 24.0, 12.0),
            (200.0, 10.0, 5.0),
            (50.0, 20.0, 8.0),
            (10.0, 4.9, 3.0),
        ] {
            let p = TrapezoidalProfile::new(dist, acc_dist, vel, DT).unwrap();
            let end = p.left_sample(p.total_time());

            assert!((end.pos - dist).abs() < 1.0, "{} -> {}", dist, end.pos);
            assert!(end.vel >= 0.0);
            assert_eq!(p.right_sample(p.total_time()), end);
        }
    }

    #[test]
    fn test_phases() {
        let p = TrapezoidalProfile::new(100.0, 24.0, 12.0, DT).unwrap();

        // 144 in/s reached over 24 in: a = 432 in/s^2, t_acc = 1/3 s
        assert!((p.acceleration() - 432.0).abs() < 1e-9);
        assert!((p.total_time() - (2.0 / 3.0 + 52.0 / 144.0)).abs() < 1e-9);

        let start = p.left_sample(0.0);
        assert_eq!(start.pos, 0.0);
        assert_eq!(start.vel, 0.0);
        assert_eq!(start.acc, 432.0);

        let cruise = p.left_sample(0.5);
        assert!((cruise.vel - 12.0).abs() < 1e-9);
        assert_eq!(cruise.acc, 0.0);

        let braking = p.left_sample(p.total_time() - 0.1);
        assert_eq!(braking.acc, -432.0);
        assert!(braking.vel > 0.0 && braking.vel < 12.0);

        // Position never goes backwards
        let samples = p.table.samples();
        assert!(samples.windows(2).all(|w| w[1].pos >= w[0].pos));
    }

    #[test]
    fn test_triangular_when_acc_dist_too_long() {
        let p = TrapezoidalProfile::new(40.0, 30.0, 10.0, DT).unwrap();

        assert!((p.total_distance() - 40.0).abs() < 1e-12);
        assert!((p.left_sample(p.total_time()).pos - 40.0).abs() < 1.0);
        assert!(p.table.samples().iter().all(|s| s.acc != 0.0));
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(TrapezoidalProfile::new(0.0, 10.0, 12.0, DT).is_err());
        assert!(TrapezoidalProfile::new(100.0, -1.0, 12.0, DT).is_err());
        assert!(TrapezoidalProfile::new(100.0, 10.0, 0.0, DT).is_err());
        assert!(TrapezoidalProfile::new(100.0, 10.0, 12.0, 0.0).is_err());
    }
}
