//! Trapezoidal velocity integration
//!
//! Integrates gravity-free acceleration into a 3-axis velocity and keeps the
//! running sums needed for mean acceleration and mean velocity magnitude.

use crate::sensor::{magnitude, Axes};

/// Magnitudes produced by one integration step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegratorStep {
    /// |a| of the motion acceleration (m/s²)
    pub accel_magnitude: f64,
    /// |v| after the step (m/s)
    pub velocity_magnitude: f64,
}

/// Integrator state for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VelocityIntegrator {
    prev_accel: Option<Axes>,
    velocity: Axes,
    sum_accel: f64,
    sum_velocity: f64,
    samples: u64,
}

impl VelocityIntegrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Integrate one motion-acceleration sample over `dt_s` seconds.
    ///
    /// The first sample of a run only seeds the previous value; it adds
    /// nothing to the velocity.
    pub fn step(&mut self, accel: Axes, dt_s: f64) -> IntegratorStep {
        if let Some(prev) = self.prev_accel {
            for axis in 0..3 {
                self.velocity[axis] += (prev[axis] + accel[axis]) * dt_s / 2.0;
            }
        }
        self.prev_accel = Some(accel);

        let step = IntegratorStep {
            accel_magnitude: magnitude(&accel),
            velocity_magnitude: magnitude(&self.velocity),
        };
        self.sum_accel += step.accel_magnitude;
        self.sum_velocity += step.velocity_magnitude;
        self.samples += 1;
        step
    }

    pub fn velocity(&self) -> Axes {
        self.velocity
    }

    pub fn sample_count(&self) -> u64 {
        self.samples
    }

    /// `(mean |a|, mean |v|)`, or `None` before the first sample.
    pub fn means(&self) -> Option<(f64, f64)> {
        if self.samples == 0 {
            return None;
        }
        let n = self.samples as f64;
        Some((self.sum_accel / n, self.sum_velocity / n))
    }
}
