// Configuration error types and constants

use crate::error::ErrorCode;
use std::fmt;

/// Configuration error code constants
///
/// Error code range: 5001
pub struct ConfigErrorCodes {}

impl ConfigErrorCodes {
    /// A field holds a value the pipeline cannot run with
    pub const INVALID_VALUE: i32 = 5001;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> i32 {
        match self {
            ConfigError::InvalidValue { .. } => ConfigErrorCodes::INVALID_VALUE,
        }
    }

    fn message(&self) -> String {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                format!("Invalid config value for {}: {}", field, reason)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigError (code {}): {}", self.code(), self.message())
    }
}

impl std::error::Error for ConfigError {}
