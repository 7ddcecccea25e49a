use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TvControlError {
    #[error("Invalid device number: {0}. Cannot convert to integer")]
    InvalidDeviceNumber(String),

    #[error("Invalid device number: {0}. Must be 1-4")]
    DeviceOutOfRange(i64),

    #[error("Failed to spawn CEC client: {0}")]
    SpawnFailed(String),

    #[error("CEC client I/O failed: {0}")]
    Io(String),

    #[error("CEC command timed out after {0:?}")]
    Timeout(Duration),

    #[error("CEC command failed with return code {code:?}: {stderr}")]
    CommandFailed { code: Option<i32>, stderr: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}
