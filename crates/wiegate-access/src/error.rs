use thiserror::Error;
use wiegate_hardware::HardwareError;
use wiegate_storage::StorageError;

/// Result type alias for access-control operations.
pub type Result<T> = std::result::Result<T, AccessError>;

#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    /// The actuator task has stopped or its queue is full.
    #[error("Actuator unavailable: {0}")]
    ActuationUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
