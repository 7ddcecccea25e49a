//! Infrastructure layer
//!
//! Implementations of the domain ports that touch the outside world.

pub mod cec;
