//! Controller configuration
//!
//! Client program, command timeouts and the fixed delays used between CEC
//! commands. Loadable from a JSON file; missing fields take their defaults.

use crate::domain::tv::TvControlError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub client_program: String,
    pub client_args: Vec<String>,
    pub command_timeout_ms: u64,
    pub detect_timeout_ms: u64,
    pub ready_max_attempts: u32,
    pub ready_poll_interval_ms: u64,
    pub power_on_settle_ms: u64,
    pub switch_settle_ms: u64,
    pub retry_backoff_ms: u64,
    pub simple_pre_delay_ms: u64,
    pub simple_settle_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            client_program: "cec-client".to_string(),
            client_args: vec!["-s".to_string(), "-d".to_string(), "1".to_string()],
            command_timeout_ms: 10_000,
            detect_timeout_ms: 5_000,
            ready_max_attempts: 10,
            ready_poll_interval_ms: 1_000,
            power_on_settle_ms: 3_000,
            switch_settle_ms: 2_000,
            retry_backoff_ms: 3_000,
            simple_pre_delay_ms: 2_000,
            simple_settle_ms: 3_000,
        }
    }
}

impl ControllerConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, TvControlError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TvControlError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, TvControlError> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| TvControlError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_client_program(mut self, program: impl Into<String>) -> Self {
        self.client_program = program.into();
        self
    }

    pub fn validate(&self) -> Result<(), TvControlError> {
        if self.client_program.trim().is_empty() {
            return Err(TvControlError::Config(
                "client_program must not be empty".to_string(),
            ));
        }
        if self.command_timeout_ms == 0 || self.detect_timeout_ms == 0 {
            return Err(TvControlError::Config(
                "command timeouts must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    pub fn detect_timeout(&self) -> Duration {
        Duration::from_millis(self.detect_timeout_ms)
    }

    pub fn ready_poll_interval(&self) -> Duration {
        Duration::from_millis(self.ready_poll_interval_ms)
    }

    pub fn power_on_settle(&self) -> Duration {
        Duration::from_millis(self.power_on_settle_ms)
    }

    pub fn switch_settle(&self) -> Duration {
        Duration::from_millis(self.switch_settle_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn simple_pre_delay(&self) -> Duration {
        Duration::from_millis(self.simple_pre_delay_ms)
    }

    pub fn simple_settle(&self) -> Duration {
        Duration::from_millis(self.simple_settle_ms)
    }
}
