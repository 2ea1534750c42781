//! Gravity removal
//!
//! First-order IIR high-pass built from a low-pass gravity tracker that is
//! subtracted from the input. The smoothing factor is recomputed from the
//! measured interval on every sample, so the cutoff stays put when the loop
//! runs early or late.

use crate::sensor::Axes;

/// Per-axis gravity tracker
#[derive(Debug, Clone, PartialEq)]
pub struct GravityFilter {
    tau_ms: f64,
    gravity: Axes,
}

impl GravityFilter {
    /// Create a filter seeded with an initial gravity estimate (m/s²).
    pub fn new(tau_ms: f64, seed: Axes) -> Self {
        Self {
            tau_ms,
            gravity: seed,
        }
    }

    /// Smoothing factor for an interval of `dt_ms`.
    #[inline]
    pub fn alpha(&self, dt_ms: f64) -> f64 {
        self.tau_ms / (self.tau_ms + dt_ms)
    }

    /// Current gravity estimate
    pub fn gravity(&self) -> Axes {
        self.gravity
    }

    /// Update the gravity estimate with `accel` and return the motion part.
    ///
    /// `dt_ms` must be the actual time since the previous sample.
    pub fn apply(&mut self, accel: Axes, dt_ms: f64) -> Axes {
        let alpha = self.alpha(dt_ms);
        let mut motion = [0.0; 3];
        for axis in 0..3 {
            self.gravity[axis] = alpha * self.gravity[axis] + (1.0 - alpha) * accel[axis];
            motion[axis] = accel[axis] - self.gravity[axis];
        }
        motion
    }
}
