// Analysis module - per-sample motion pipeline and end-of-run summary
//
// Each processed sample flows through:
// - GravityFilter: remove the quasi-static gravity component
// - VelocityIntegrator: trapezoidal integration to a velocity vector
// - DecimatedBuffer: keep every D-th (t, |v|) pair for fitting
//
// At the end of the run the pipeline is consumed to produce a RunSummary
// (means plus the exponential fit). A pipeline is built from fresh
// CalibrationOffsets for every run and never reused.

use serde::{Deserialize, Serialize};

use crate::calibration::CalibrationOffsets;
use crate::config::{AppConfig, FitConfig};
use crate::error::RunError;
use crate::sensor::{Axes, RawAccel};

pub mod decimation;
pub mod fit;
pub mod gravity;
pub mod integrator;

#[cfg(test)]
mod tests;

use decimation::DecimatedBuffer;
pub use decimation::VelocitySample;
pub use fit::{fit_exponential, FitResult};
use gravity::GravityFilter;
use integrator::VelocityIntegrator;

/// Constants the pipeline needs, extracted from [`AppConfig`]
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// m/s² per raw count
    pub scale: f64,
    /// Gravity tracker time constant
    pub tau_ms: f64,
    pub fit: FitConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            scale: config.sampling.scale,
            tau_ms: config.filter.tau_ms,
            fit: config.fit.clone(),
        }
    }
}

/// What one processed sample produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleOutcome {
    /// Gravity-free acceleration (m/s²)
    pub motion: Axes,
    pub accel_magnitude: f64,
    pub velocity_magnitude: f64,
    /// Whether the sample went into the fit buffer
    pub buffered: bool,
}

/// Result of one completed run; the telemetry payload is derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub duration_secs: u32,
    pub sample_count: u64,
    /// Mean |a| over the run (m/s²)
    pub mean_accel: f64,
    /// Mean |v| over the run (m/s)
    pub mean_velocity: f64,
    pub fit: FitResult,
    /// Number of points the fit was computed from
    pub buffered_points: usize,
    pub calibration: CalibrationOffsets,
}

/// Filter, integrator and fit buffer for a single run
#[derive(Debug, Clone)]
pub struct MotionPipeline {
    config: PipelineConfig,
    calibration: CalibrationOffsets,
    filter: GravityFilter,
    integrator: VelocityIntegrator,
    buffer: DecimatedBuffer,
}

impl MotionPipeline {
    /// Fresh pipeline seeded from this run's calibration.
    pub fn new(calibration: CalibrationOffsets, config: PipelineConfig) -> Self {
        Self {
            filter: GravityFilter::new(config.tau_ms, calibration.gravity),
            integrator: VelocityIntegrator::new(),
            buffer: DecimatedBuffer::new(config.fit.decimation),
            calibration,
            config,
        }
    }

    /// Process one reading.
    ///
    /// # Arguments
    /// * `raw` - Accelerometer counts
    /// * `dt_ms` - Measured time since the previous sample
    /// * `elapsed_ms` - Time since measuring started
    pub fn process(&mut self, raw: RawAccel, dt_ms: u32, elapsed_ms: u32) -> SampleOutcome {
        let accel = raw.to_physical(self.config.scale);
        let motion = self.filter.apply(accel, dt_ms as f64);
        let step = self.integrator.step(motion, dt_ms as f64 / 1000.0);
        let buffered = self
            .buffer
            .push(elapsed_ms as f64 / 1000.0, step.velocity_magnitude);

        SampleOutcome {
            motion,
            accel_magnitude: step.accel_magnitude,
            velocity_magnitude: step.velocity_magnitude,
            buffered,
        }
    }

    pub fn sample_count(&self) -> u64 {
        self.integrator.sample_count()
    }

    pub fn gravity_estimate(&self) -> Axes {
        self.filter.gravity()
    }

    pub fn velocity(&self) -> Axes {
        self.integrator.velocity()
    }

    pub fn buffered(&self) -> &[VelocitySample] {
        self.buffer.as_slice()
    }

    pub fn calibration(&self) -> &CalibrationOffsets {
        &self.calibration
    }

    /// Consume the pipeline: means, then the fit over the decimated trace.
    ///
    /// # Returns
    /// * `Err(RunError::NoSamples)` if nothing was processed
    pub fn finish(self, duration_secs: u32) -> Result<RunSummary, RunError> {
        let (mean_accel, mean_velocity) = self.integrator.means().ok_or(RunError::NoSamples)?;
        let fit = fit_exponential(self.buffer.as_slice(), &self.config.fit);

        Ok(RunSummary {
            duration_secs,
            sample_count: self.integrator.sample_count(),
            mean_accel,
            mean_velocity,
            fit,
            buffered_points: self.buffer.len(),
            calibration: self.calibration,
        })
    }
}
