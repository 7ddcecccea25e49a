//! Domain layer
//!
//! CEC commands, HDMI ports, execution results and the input-switch retry
//! policy, plus the ports the controller drives.

pub mod tv;
