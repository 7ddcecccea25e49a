use super::{CecInvocation, ExecutionResult};
use async_trait::async_trait;
use std::time::Duration;

/// Runs CEC invocations against the external adapter client.
///
/// Implementations never fail outward: spawn errors, timeouts and non-zero
/// exits all come back as an unsuccessful [`ExecutionResult`].
#[async_trait]
pub trait CecCommandRunner: Send + Sync {
    async fn execute(&self, invocation: &CecInvocation, timeout: Duration) -> ExecutionResult;
}

/// Pause between commands (settle time, backoff, poll interval)
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}
