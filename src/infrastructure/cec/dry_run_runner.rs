use crate::domain::tv::{CecCommand, CecCommandRunner, CecInvocation, ExecutionResult};
use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

/// Logs every invocation and reports success without touching the bus.
/// Power queries answer `power status: on`.
pub struct DryRunRunner;

impl Default for DryRunRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl DryRunRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CecCommandRunner for DryRunRunner {
    async fn execute(&self, invocation: &CecInvocation, timeout: Duration) -> ExecutionResult {
        info!("Dry run ({:?} timeout): {}", timeout, invocation);

        let output = invocation
            .commands()
            .iter()
            .map(|command| match command {
                CecCommand::PowerStatus => "power status: on\n".to_string(),
                other => format!("{}\n", other),
            })
            .collect::<String>();

        ExecutionResult::succeeded(output)
    }
}
