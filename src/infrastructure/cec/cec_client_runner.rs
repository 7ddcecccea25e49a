use crate::config::ControllerConfig;
use crate::domain::tv::{
    CecCommand, CecCommandRunner, CecInvocation, ExecutionResult, TvControlError,
};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, error};

/// Runs each command through a fresh `cec-client -s` process, feeding the
/// command line on stdin.
pub struct CecClientRunner {
    program: String,
    args: Vec<String>,
}

impl CecClientRunner {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.client_program.clone(), config.client_args.clone())
    }

    /// Runs the chain under one shared deadline. Stdout of every step is
    /// concatenated; the first failing step ends the chain.
    pub async fn run(
        &self,
        invocation: &CecInvocation,
        timeout: Duration,
    ) -> Result<String, TvControlError> {
        let deadline = Instant::now() + timeout;
        let mut stdout = String::new();

        for command in invocation.commands() {
            if Instant::now() >= deadline {
                return Err(TvControlError::Timeout(timeout));
            }
            stdout.push_str(&self.run_command(command, deadline, timeout).await?);
        }

        Ok(stdout)
    }

    async fn run_command(
        &self,
        command: &CecCommand,
        deadline: Instant,
        timeout: Duration,
    ) -> Result<String, TvControlError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| TvControlError::SpawnFailed(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            let line = format!("{}\n", command);
            // The client may exit without reading its input
            if let Err(e) = stdin.write_all(line.as_bytes()).await {
                if e.kind() != ErrorKind::BrokenPipe {
                    let _ = child.kill().await;
                    return Err(TvControlError::Io(format!("Failed to write command: {}", e)));
                }
            }
        }

        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();
        let outcome = timeout_at(deadline, async {
            let (status, stdout, stderr) = tokio::join!(
                child.wait(),
                read_pipe(&mut stdout_pipe),
                read_pipe(&mut stderr_pipe)
            );
            status.map(|status| (status, stdout, stderr))
        })
        .await;

        match outcome {
            Err(_) => {
                // kill() also reaps the child
                let _ = child.kill().await;
                Err(TvControlError::Timeout(timeout))
            }
            Ok(Err(e)) => {
                let _ = child.kill().await;
                Err(TvControlError::Io(format!("Failed to wait for CEC client: {}", e)))
            }
            Ok(Ok((status, stdout, _))) if status.success() => Ok(stdout),
            Ok(Ok((status, stdout, stderr))) => {
                let stderr = if stderr.trim().is_empty() { stdout } else { stderr };
                Err(TvControlError::CommandFailed {
                    code: status.code(),
                    stderr,
                })
            }
        }
    }
}

#[async_trait]
impl CecCommandRunner for CecClientRunner {
    async fn execute(&self, invocation: &CecInvocation, timeout: Duration) -> ExecutionResult {
        debug!(
            "Executing CEC command: {}",
            invocation.to_shell_line(&self.program, &self.args)
        );

        match self.run(invocation, timeout).await {
            Ok(stdout) => {
                debug!("CEC command successful. Output: {}", stdout);
                ExecutionResult::succeeded(stdout)
            }
            Err(e) => {
                match &e {
                    TvControlError::Timeout(after) => {
                        error!("CEC command timed out after {:?}", after)
                    }
                    TvControlError::CommandFailed { code, stderr } => error!(
                        "CEC command failed with return code {:?}. Error: {}",
                        code, stderr
                    ),
                    other => error!("CEC command execution failed: {}", other),
                }
                ExecutionResult::from(Err::<String, _>(e))
            }
        }
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: &mut Option<R>) -> String {
    let mut buf = Vec::new();
    if let Some(pipe) = pipe.as_mut() {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    String::from_utf8_lossy(&buf).into_owned()
}
