// Sensor error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Sensor error code constants
///
/// Error code range: 1001-1002
pub struct SensorErrorCodes {}

impl SensorErrorCodes {
    /// The accelerometer returned an error for a read
    pub const READ_FAILED: i32 = 1001;

    /// The accelerometer stopped responding
    pub const DISCONNECTED: i32 = 1002;
}

/// Log a sensor error with structured context
pub fn log_sensor_error(err: &SensorError, context: &str) {
    error!(
        "Sensor error in {}: code={}, component=Accelerometer, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Accelerometer read errors
///
/// A read failure aborts the run it happens in; there is no retry.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorError {
    /// A single read failed
    ReadFailed { details: String },

    /// The device is gone
    Disconnected,
}

impl ErrorCode for SensorError {
    fn code(&self) -> i32 {
        match self {
            SensorError::ReadFailed { .. } => SensorErrorCodes::READ_FAILED,
            SensorError::Disconnected => SensorErrorCodes::DISCONNECTED,
        }
    }

    fn message(&self) -> String {
        match self {
            SensorError::ReadFailed { details } => format!("Accelerometer read failed: {}", details),
            SensorError::Disconnected => "Accelerometer disconnected".to_string(),
        }
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SensorError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SensorError {}

impl From<std::io::Error> for SensorError {
    fn from(err: std::io::Error) -> Self {
        SensorError::ReadFailed {
            details: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_error_codes() {
        assert_eq!(
            SensorError::ReadFailed {
                details: "bus".to_string()
            }
            .code(),
            SensorErrorCodes::READ_FAILED
        );
        assert_eq!(
            SensorError::Disconnected.code(),
            SensorErrorCodes::DISCONNECTED
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::TimedOut, "i2c timeout");
        let err: SensorError = io_err.into();
        assert!(err.message().contains("i2c timeout"));
    }

    #[test]
    fn test_sensor_error_display() {
        let display = format!("{}", SensorError::Disconnected);
        assert!(display.contains("SensorError"));
        assert!(display.contains("1002"));
    }
}
