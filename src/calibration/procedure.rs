// CalibrationProcedure - resting sample collection
//
// Collects a fixed number of raw readings while the device is still and
// averages them per axis. `run_calibration` drives the procedure from an
// accelerometer at the nominal sample interval, so it takes about
// N / sample_hz seconds of wall-clock time.

use tracing::info;

use crate::calibration::offsets::CalibrationOffsets;
use crate::error::{log_calibration_error, log_sensor_error, CalibrationError, RunError};
use crate::sensor::{Accelerometer, Clock, RawAccel};

/// Progress information for the calibration step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationProgress {
    /// Readings accumulated so far
    pub samples_collected: usize,
    /// Readings required before finalizing
    pub samples_needed: usize,
}

impl CalibrationProgress {
    pub fn is_complete(&self) -> bool {
        self.samples_collected >= self.samples_needed
    }
}

/// CalibrationProcedure accumulates per-axis sums of raw readings
#[derive(Debug, Clone)]
pub struct CalibrationProcedure {
    sums: [i64; 3],
    collected: usize,
    samples_needed: usize,
}

impl CalibrationProcedure {
    /// Create a new calibration procedure
    ///
    /// # Arguments
    /// * `samples_needed` - Number of readings to average
    pub fn new(samples_needed: usize) -> Self {
        Self {
            sums: [0; 3],
            collected: 0,
            samples_needed,
        }
    }

    /// Add one raw reading
    ///
    /// Readings beyond `samples_needed` are ignored so the mean is always over
    /// exactly N values.
    pub fn add_sample(&mut self, reading: RawAccel) {
        if self.collected >= self.samples_needed {
            return;
        }
        for (sum, value) in self.sums.iter_mut().zip(reading.as_array()) {
            *sum += value as i64;
        }
        self.collected += 1;
    }

    pub fn get_progress(&self) -> CalibrationProgress {
        CalibrationProgress {
            samples_collected: self.collected,
            samples_needed: self.samples_needed,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.get_progress().is_complete()
    }

    /// Finalize calibration and create CalibrationOffsets
    ///
    /// # Arguments
    /// * `scale` - m/s² per raw count
    ///
    /// # Returns
    /// * `Err(CalibrationError::InsufficientSamples)` if fewer than
    ///   `samples_needed` readings were added, or none were required
    pub fn finalize(&self, scale: f64) -> Result<CalibrationOffsets, CalibrationError> {
        if self.collected == 0 || !self.is_complete() {
            return Err(CalibrationError::InsufficientSamples {
                required: self.samples_needed.max(1),
                collected: self.collected,
            });
        }

        let n = self.collected as f64;
        CalibrationOffsets::from_raw_means(
            [
                self.sums[0] as f64 / n,
                self.sums[1] as f64 / n,
                self.sums[2] as f64 / n,
            ],
            scale,
        )
    }

    /// Reset the calibration procedure
    pub fn reset(&mut self) {
        self.sums = [0; 3];
        self.collected = 0;
    }
}

/// Read `samples_needed` values at `interval_ms` spacing and average them.
///
/// Sensor failures abort calibration and are returned as [`RunError::Sensor`].
pub fn run_calibration<A, C>(
    sensor: &mut A,
    clock: &C,
    samples_needed: usize,
    interval_ms: u32,
    scale: f64,
) -> Result<CalibrationOffsets, RunError>
where
    A: Accelerometer + ?Sized,
    C: Clock + ?Sized,
{
    let mut procedure = CalibrationProcedure::new(samples_needed);
    while !procedure.is_complete() {
        let reading = sensor.read_raw().map_err(|err| {
            log_sensor_error(&err, "run_calibration");
            err
        })?;
        procedure.add_sample(reading);
        clock.sleep_ms(interval_ms);
    }

    let offsets = procedure.finalize(scale).map_err(|err| {
        log_calibration_error(&err, "run_calibration");
        err
    })?;
    info!(
        raw_x = offsets.raw[0],
        raw_y = offsets.raw[1],
        raw_z = offsets.raw[2],
        "[Calibration] Offsets computed from {} samples",
        samples_needed
    );
    Ok(offsets)
}
