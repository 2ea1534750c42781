// CalibrationOffsets - per-axis resting values for one run
//
// The raw offsets are the arithmetic mean of each axis over the calibration
// readings, in device counts. The gravity seed is the same mean converted to
// m/s² and is the starting point of the gravity-removal filter.

use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;
use crate::sensor::{Axes, RawAccel};

/// Offsets measured while the device is held still
///
/// Created once per run and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationOffsets {
    /// Mean raw reading per axis (counts)
    pub raw: Axes,
    /// Initial gravity estimate per axis (m/s²)
    pub gravity: Axes,
}

impl CalibrationOffsets {
    /// Build offsets from per-axis raw means
    ///
    /// # Arguments
    /// * `raw` - Mean raw reading per axis
    /// * `scale` - m/s² per raw count
    ///
    /// # Returns
    /// * `Err(CalibrationError::InvalidOffsets)` if any mean is not finite
    pub fn from_raw_means(raw: Axes, scale: f64) -> Result<Self, CalibrationError> {
        if let Some(axis) = raw.iter().position(|v| !v.is_finite()) {
            return Err(CalibrationError::InvalidOffsets {
                reason: format!("axis {} mean is {}", axis, raw[axis]),
            });
        }

        Ok(Self {
            raw,
            gravity: [raw[0] * scale, raw[1] * scale, raw[2] * scale],
        })
    }

    /// Offsets of a device with no gravity component on any axis
    pub fn zero() -> Self {
        Self {
            raw: [0.0; 3],
            gravity: [0.0; 3],
        }
    }

    /// Reading with the resting offsets removed, in m/s²
    pub fn corrected(&self, reading: RawAccel, scale: f64) -> Axes {
        let raw = reading.as_array();
        [
            (raw[0] as f64 - self.raw[0]) * scale,
            (raw[1] as f64 - self.raw[1]) * scale,
            (raw[2] as f64 - self.raw[2]) * scale,
        ]
    }
}
