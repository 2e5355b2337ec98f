//! Jerk limited (S-curve) profile

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

/// A straight line profile whose acceleration ramps linearly instead of stepping.
///
/// The acceleration phase is split into a rising and a falling half, likewise the deceleration
/// phase, giving five segments with the cruise in the middle.
#[derive(Debug, Clone)]
pub struct JerkProfile {
    table: TickTable,

    /// Units: inches
    total_dist: f64,

    /// Units: seconds
    total_time: f64,

    /// Units: inches/second^3
    jerk: f64,
}

/// Segment boundary times and the constants needed to evaluate velocity.
struct Segments {
    /// Units: inches/second
    max_vel: f64,

    /// Units: inches/second^3
    jerk: f64,

    /// End of increasing acceleration.
    t1: f64,

    /// End of decreasing acceleration.
    t2: f64,

    /// End of cruise.
    t3: f64,

    /// End of increasing deceleration.
    t4: f64,

    /// End of the profile.
    total: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl JerkProfile {
    /// Build a profile covering `total_dist` inches which spends `acc_dist` inches reaching
    /// `max_vel_fps`.
    ///
    /// As with the trapezoidal profile an over-long acceleration distance is shortened to half
    /// the total.
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

        let acc_time = 2.0 * acc_dist / max_vel;
        let cruise_time = (total_dist - 2.0 * acc_dist) / max_vel;
        let total_time = 2.0 * acc_time + cruise_time;

        let seg = Segments {
            max_vel,
            jerk: 4.0 * max_vel / (acc_time * acc_time),
            t1: acc_time / 2.0,
            t2: acc_time,
            t3: total_time - acc_time,
            t4: total_time - acc_time / 2.0,
            total: total_time,
        };

        // Position is integrated from the closed-form velocity, acceleration is its finite
        // difference.
        let num_samples = (total_time / dt).ceil() as usize + 1;
        let mut samples = Vec::with_capacity(num_samples);
        let mut pos = 0.0;
        let mut prev_vel = 0.0;

        for i in 0..num_samples {
            let vel = seg.velocity(i as f64 * dt);
            let acc = (vel - prev_vel) / dt;
            pos += vel * dt;
            prev_vel = vel;

            samples.push(TrajSample::new(pos, vel / 12.0, acc));
        }

        debug!(
            "Jerk profile: {:.2} in, {:.3} s, jerk {:.1} in/s^3, {} samples",
            total_dist, total_time, seg.jerk, num_samples
        );

        Ok(Self {
            table: TickTable::new(samples, dt),
            total_dist,
            total_time,
            jerk: seg.jerk,
        })
    }

    /// Units: inches/second^3
    pub fn jerk(&self) -> f64 {
        self.jerk
    }
}

impl Segments {
    /// Velocity at time `t`, each segment being a quadratic in the time elapsed within it.
    ///
    /// Units: inches/second
    fn velocity(&self, t: f64) -> f64 {
        let j = self.jerk;

        let vel = if t < self.t1 {
            0.5 * j * t * t
        } else if t < self.t2 {
            -0.5 * j * (t - self.t2).powi(2) + j * self.t1 * self.t1
        } else if t < self.t3 {
            self.max_vel
        } else if t < self.t4 {
            self.max_vel - 0.5 * j * (t - self.t3).powi(2)
        } else if t < self.total {
            0.5 * j * (t - self.total).powi(2)
        } else {
            0.0
        };

        vel.max(0.0).min(self.max_vel)
    }
}

impl DriveProfile for JerkProfile {
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
        for &(dist, acc_dist, vel) in &[(100.0, 24.0, 12.0), (200.0, 10.0, 5.0)] {
            let p = JerkProfile::new(dist, acc_dist, vel, DT).unwrap();
            let end = p.left_sample(p.total_time());

            assert!((end.pos - dist).abs() < 1.0, "{} -> {}", dist, end.pos);
            assert!(end.vel.abs() < 0.01);
        }
    }

    #[test]
    fn test_velocity_is_smooth() {
        let p = JerkProfile::new(100.0, 24.0, 12.0, DT).unwrap();
        let samples = p.table.samples();

        // Peak velocity is reached but never exceeded
        let peak = samples.iter().map(|s| s.vel).fold(0.0, f64::max);
        assert!((peak - 12.0).abs() < 1e-9);

        // Acceleration changes by at most one jerk step per tick
        let max_jump = p.jerk() * DT * 1.01;
        assert!(samples
            .windows(2)
            .skip(1)
            .all(|w| (w[1].acc - w[0].acc).abs() <= max_jump));

        // Peak acceleration is twice the trapezoidal average (linear ramp up and down)
        let peak_acc = samples.iter().map(|s| s.acc).fold(0.0, f64::max);
        assert!((peak_acc - 864.0).abs() < 10.0);
    }

    #[test]
    fn test_rejects_bad_inputs() {
        assert!(JerkProfile::new(-5.0, 1.0, 1.0, DT).is_err());
        assert!(JerkProfile::new(5.0, 1.0, f64::NAN, DT).is_err());
    }
}
