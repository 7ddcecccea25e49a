//! Application layer
//!
//! The TV controller and its serialized async handle.

pub mod cec_controller;
pub mod shared_controller;

pub use cec_controller::CecController;
pub use shared_controller::SharedCecController;
