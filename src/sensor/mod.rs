//! Hardware seams for the sampling loop.
//!
//! The core never talks to a device directly. It reads accelerometer counts
//! through [`Accelerometer`] and time through [`Clock`], so the same loop runs
//! on real hardware and against the simulated devices in `crate::testing`.

pub mod clock;

pub use clock::{ticks_diff, Clock, SystemClock};

use serde::{Deserialize, Serialize};

use crate::error::SensorError;

/// Three-axis vector in physical units (m/s² or m/s).
pub type Axes = [f64; 3];

/// One accelerometer reading in device-native counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawAccel {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl RawAccel {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn as_array(&self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    /// Convert counts to m/s² with the given LSB scale.
    pub fn to_physical(&self, scale: f64) -> Axes {
        [
            self.x as f64 * scale,
            self.y as f64 * scale,
            self.z as f64 * scale,
        ]
    }
}

/// Source of raw 3-axis readings.
///
/// One synchronous call per sample. Errors end the current run.
pub trait Accelerometer {
    fn read_raw(&mut self) -> Result<RawAccel, SensorError>;
}

impl<A: Accelerometer + ?Sized> Accelerometer for &mut A {
    fn read_raw(&mut self) -> Result<RawAccel, SensorError> {
        (**self).read_raw()
    }
}

/// Euclidean norm of a 3-vector.
#[inline]
pub fn magnitude(v: &Axes) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_physical_uses_scale() {
        let raw = RawAccel::new(0, 0, -1024);
        let physical = raw.to_physical(0.009_806_65);
        assert_eq!(physical[0], 0.0);
        assert!((physical[2] + 10.042_009_6).abs() < 1e-6);
    }

    #[test]
    fn test_magnitude() {
        assert!((magnitude(&[3.0, 4.0, 0.0]) - 5.0).abs() < 1e-12);
        assert_eq!(magnitude(&[0.0; 3]), 0.0);
    }
}
