//! Logging setup
//!
//! Only the binary calls [`init_logging`]. The library itself just emits
//! `tracing` events and never installs a subscriber.

use std::fs;
use tracing::{Level, debug, info};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct DebugConfig {
    pub log_level: Level,
    /// Write JSON logs to a daily rolling file instead of the console
    pub enable_file_logging: bool,
    pub log_directory: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            enable_file_logging: false,
            log_directory: "logs".to_string(),
        }
    }
}

impl DebugConfig {
    pub fn development() -> Self {
        Self {
            log_level: Level::DEBUG,
            ..Self::default()
        }
    }

    pub fn production() -> Self {
        Self {
            log_level: Level::INFO,
            enable_file_logging: true,
            log_directory: "/var/log/cec-tv-control".to_string(),
        }
    }

    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// `RUST_LOG` wins over the configured level
    pub fn env_filter(&self) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(format!("cec_tv_control={}", self.log_level)))
    }
}

pub fn init_logging(
    config: &DebugConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = config.env_filter()?;

    if config.enable_file_logging {
        fs::create_dir_all(&config.log_directory)?;
        let file_appender =
            RollingFileAppender::new(Rotation::DAILY, &config.log_directory, "cec-tv-control.log");

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(file_appender)
            .json()
            .try_init()?;
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init()?;
    }

    info!("Logging initialized");
    debug!("Debug config: {:?}", config);

    Ok(())
}

/// Runs a block and logs how long it took
#[macro_export]
macro_rules! measure_time {
    ($name:expr, $block:block) => {{
        let start = std::time::Instant::now();
        let result = $block;
        let duration = start.elapsed();
        tracing::info!(
            operation = $name,
            duration_ms = duration.as_millis() as u64,
            "Operation finished"
        );
        result
    }};
}
