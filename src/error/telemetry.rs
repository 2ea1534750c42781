// Telemetry error types and constants

use crate::error::ErrorCode;
use log::warn;
use std::fmt;

/// Telemetry error code constants
///
/// Error code range: 4001-4002
pub struct TelemetryErrorCodes {}

impl TelemetryErrorCodes {
    /// The radio refused the payload
    pub const SEND_FAILED: i32 = 4001;

    /// A received payload could not be decoded
    pub const MALFORMED: i32 = 4002;
}

/// Log a telemetry error with structured context
///
/// Telemetry is fire-and-forget, so failures are warnings rather than errors.
pub fn log_telemetry_error(err: &TelemetryError, context: &str) {
    warn!(
        "Telemetry error in {}: code={}, component=Radio, message={}",
        context,
        err.code(),
        err.message()
    );
}

#[derive(Debug, Clone, PartialEq)]
pub enum TelemetryError {
    /// Broadcast failed; never retried
    SendFailed { reason: String },

    /// Payload did not match `a:..,v:..,vm:..,t:..`
    Malformed { reason: String },
}

impl ErrorCode for TelemetryError {
    fn code(&self) -> i32 {
        match self {
            TelemetryError::SendFailed { .. } => TelemetryErrorCodes::SEND_FAILED,
            TelemetryError::Malformed { .. } => TelemetryErrorCodes::MALFORMED,
        }
    }

    fn message(&self) -> String {
        match self {
            TelemetryError::SendFailed { reason } => format!("Broadcast failed: {}", reason),
            TelemetryError::Malformed { reason } => format!("Malformed payload: {}", reason),
        }
    }
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TelemetryError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for TelemetryError {}

impl From<std::io::Error> for TelemetryError {
    fn from(err: std::io::Error) -> Self {
        TelemetryError::SendFailed {
            reason: err.to_string(),
        }
    }
}
