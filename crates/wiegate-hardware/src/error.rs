//! Error types for hardware operations.
//!
//! Failures at the GPIO boundary: output lines that cannot be driven, edges
//! lost to a full pulse channel, and invalid pin assignments.

use crate::types::OutputLine;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Setting an output level failed.
    #[error("Failed to drive {line} output: {message}")]
    OutputFailed { line: OutputLine, message: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Frame or UID construction failed.
    #[error(transparent)]
    Core(#[from] wiegate_core::Error),

}

impl HardwareError {
    /// Create a new output failure error.
    pub fn output_failed(line: OutputLine, message: impl Into<String>) -> Self {
        Self::OutputFailed {
            line,
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_failed_error() {
        let error = HardwareError::output_failed(OutputLine::Relay, "pin not configured");
        assert_eq!(
            error.to_string(),
            "Failed to drive relay output: pin not configured"
        );
    }

    #[test]
    fn test_core_error_is_transparent() {
        let error = HardwareError::from(wiegate_core::Error::EmptyFrame);
        assert_eq!(
            error.to_string(),
            "Empty frame: at least one bit is required"
        );
    }

    #[test]
    fn test_configuration_error() {
        let error = HardwareError::configuration("D0 and D1 share pin 4");
        assert!(matches!(error, HardwareError::ConfigurationError { .. }));
        assert_eq!(error.to_string(), "Configuration error: D0 and D1 share pin 4");
    }
}
