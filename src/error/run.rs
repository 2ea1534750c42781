// Measurement run error types and constants

use crate::error::{CalibrationError, ErrorCode, SensorError};
use log::error;
use std::fmt;

/// Run error code constants
///
/// Error code range: 3001-3004
pub struct RunErrorCodes {}

impl RunErrorCodes {
    /// The run ended without processing a single sample
    pub const NO_SAMPLES: i32 = 3001;

    /// A sensor read failed mid-run
    pub const SENSOR: i32 = 3002;

    /// Calibration could not produce offsets
    pub const CALIBRATION: i32 = 3003;

    /// Selected duration is not usable
    pub const INVALID_DURATION: i32 = 3004;
}

/// Log a run error with structured context
pub fn log_run_error(err: &RunError, context: &str) {
    error!(
        "Run error in {}: code={}, component=MotionSession, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors that end a measurement run without a result
///
/// None of these are retried: the session discards the run and returns to
/// duration selection.
#[derive(Debug, Clone, PartialEq)]
pub enum RunError {
    /// sample_count was zero when the run ended
    NoSamples,

    /// Accelerometer failure during calibration or measuring
    Sensor(SensorError),

    /// Calibration failed
    Calibration(CalibrationError),

    /// Duration of zero seconds
    InvalidDuration { secs: u32 },
}

impl ErrorCode for RunError {
    fn code(&self) -> i32 {
        match self {
            RunError::NoSamples => RunErrorCodes::NO_SAMPLES,
            RunError::Sensor(_) => RunErrorCodes::SENSOR,
            RunError::Calibration(_) => RunErrorCodes::CALIBRATION,
            RunError::InvalidDuration { .. } => RunErrorCodes::INVALID_DURATION,
        }
    }

    fn message(&self) -> String {
        match self {
            RunError::NoSamples => "Run ended with no samples; nothing to report".to_string(),
            RunError::Sensor(err) => format!("Sensor failure: {}", err.message()),
            RunError::Calibration(err) => format!("Calibration failure: {}", err.message()),
            RunError::InvalidDuration { secs } => {
                format!("Run duration must be positive (got {} s)", secs)
            }
        }
    }
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RunError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RunError::Sensor(err) => Some(err),
            RunError::Calibration(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SensorError> for RunError {
    fn from(err: SensorError) -> Self {
        RunError::Sensor(err)
    }
}

impl From<CalibrationError> for RunError {
    fn from(err: CalibrationError) -> Self {
        RunError::Calibration(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_run_error_codes() {
        assert_eq!(RunError::NoSamples.code(), 3001);
        assert_eq!(RunError::Sensor(SensorError::Disconnected).code(), 3002);
        assert_eq!(
            RunError::InvalidDuration { secs: 0 }.code(),
            RunErrorCodes::INVALID_DURATION
        );
    }

    #[test]
    fn test_wrapped_errors_expose_source() {
        let err = RunError::from(SensorError::Disconnected);
        assert!(err.source().is_some());
        assert!(err.message().contains("disconnected"));

        assert!(RunError::NoSamples.source().is_none());
    }
}
