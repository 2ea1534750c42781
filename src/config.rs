//! Configuration management for the measurement pipeline
//!
//! This module provides runtime configuration loading from JSON files so the
//! sampling rate, filter time constant, fit decimation and session timings can
//! be tuned without recompiling. Every section has defaults matching the
//! firmware constants.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub fit: FitConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Accelerometer sampling parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Nominal sample rate in Hz
    pub sample_hz: u32,
    /// Milliseconds subtracted from each sleep to absorb processing time
    pub loop_overhead_ms: u32,
    /// m/s² per raw LSB (±2g over 1024 LSB)
    pub scale: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_hz: 100,
            loop_overhead_ms: 1,
            scale: 0.009_806_65,
        }
    }
}

impl SamplingConfig {
    /// Nominal interval between samples in whole milliseconds
    pub fn interval_ms(&self) -> u32 {
        1000 / self.sample_hz.max(1)
    }

    /// Sleep at the end of each loop iteration
    pub fn sleep_ms(&self) -> u32 {
        self.interval_ms().saturating_sub(self.loop_overhead_ms)
    }
}

/// Gravity-removal filter parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Time constant of the gravity tracker in milliseconds
    pub tau_ms: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { tau_ms: 400.0 }
    }
}

/// Calibration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Number of raw readings averaged into the offsets
    pub samples: usize,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self { samples: 100 }
    }
}

/// Exponential fit parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    /// Keep one velocity sample out of every `decimation`
    pub decimation: usize,
    /// Peak velocities at or below this are treated as zero
    pub vmax_epsilon: f64,
    /// Substitute peak velocity when the observed one is ~zero
    pub vmax_floor: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            decimation: 10,
            vmax_epsilon: 1e-9,
            vmax_floor: 0.001,
        }
    }
}

/// Session timing and menu parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Selectable run durations in seconds
    pub durations_secs: Vec<u32>,
    /// Countdown length before measuring starts
    pub countdown_secs: u32,
    /// Poll period of the duration menu
    pub menu_poll_ms: u32,
    /// How long each result page stays on screen
    pub result_page_ms: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            durations_secs: vec![5, 10, 20, 30, 40],
            countdown_secs: 8,
            menu_poll_ms: 50,
            result_page_ms: 400,
        }
    }
}

/// Telemetry broadcast parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Radio group; receivers only hear senders on the same group
    pub group: u8,
    /// UDP port of group 0; group `n` broadcasts on `base_port + n`
    pub base_port: u16,
    /// Broadcast destination address
    pub broadcast_addr: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            group: 1,
            base_port: 47_000,
            broadcast_addr: "255.255.255.255".to_string(),
        }
    }
}

impl TelemetryConfig {
    pub fn port(&self) -> u16 {
        self.base_port.saturating_add(self.group as u16)
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or defaults if the file is missing or the
    /// JSON is invalid (a warning is logged in both cases).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Check values that would make the pipeline divide by zero or spin.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling.sample_hz == 0 || self.sampling.sample_hz > 1000 {
            return Err(ConfigError::InvalidValue {
                field: "sampling.sample_hz",
                reason: format!("must be in 1..=1000 (got {})", self.sampling.sample_hz),
            });
        }
        if !(self.sampling.scale.is_finite() && self.sampling.scale > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "sampling.scale",
                reason: format!("must be positive (got {})", self.sampling.scale),
            });
        }
        if !(self.filter.tau_ms.is_finite() && self.filter.tau_ms > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "filter.tau_ms",
                reason: format!("must be positive (got {})", self.filter.tau_ms),
            });
        }
        if self.calibration.samples == 0 {
            return Err(ConfigError::InvalidValue {
                field: "calibration.samples",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.fit.decimation == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fit.decimation",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.fit.vmax_floor <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "fit.vmax_floor",
                reason: format!("must be positive (got {})", self.fit.vmax_floor),
            });
        }
        if self.session.durations_secs.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "session.durations_secs",
                reason: "at least one duration is required".to_string(),
            });
        }
        if let Some(zero) = self.session.durations_secs.iter().find(|d| **d == 0) {
            return Err(ConfigError::InvalidValue {
                field: "session.durations_secs",
                reason: format!("durations must be positive (got {})", zero),
            });
        }
        Ok(())
    }
}
