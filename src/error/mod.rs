// Error types for the motion logger
//
// One error enum per concern, each carrying a numeric code from a disjoint
// range so logs and the CLI exit path can report failures uniformly.

mod calibration;
mod config;
mod run;
mod sensor;
mod telemetry;

pub use calibration::{log_calibration_error, CalibrationError, CalibrationErrorCodes};
pub use config::{ConfigError, ConfigErrorCodes};
pub use run::{log_run_error, RunError, RunErrorCodes};
pub use sensor::{log_sensor_error, SensorError, SensorErrorCodes};
pub use telemetry::{log_telemetry_error, TelemetryError, TelemetryErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
