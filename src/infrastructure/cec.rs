//! Adapters for the CEC ports: the real `cec-client` process runner,
//! a tokio-timer delay and a dry-run runner.

pub mod cec_client_runner;
pub mod dry_run_runner;
pub mod tokio_delay;

pub use cec_client_runner::CecClientRunner;
pub use dry_run_runner::DryRunRunner;
pub use tokio_delay::TokioDelay;
