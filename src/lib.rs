//! # CEC TV Control
//!
//! Controls a television over HDMI-CEC by driving an external `cec-client`
//! process: power on/off, power status and HDMI input switching.
//!
//! Layers follow a Domain-Driven Design split:
//!
//! - **Domain Layer**: CEC commands, ports and the input-switch retry policy
//! - **Application Layer**: `CecController` and its serialized async handle
//! - **Infrastructure Layer**: process runner, delays, dry-run runner

pub mod application;
pub mod config;
pub mod debug;
pub mod domain;
pub mod infrastructure;

pub use application::{CecController, SharedCecController};
pub use config::ControllerConfig;
pub use domain::tv::{
    AdapterId, CecCommand, CecInvocation, ExecutionResult, HdmiPort, PowerStatus, TvControlError,
};
