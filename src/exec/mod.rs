use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time;
use tokio_util::sync::CancellationToken;

/// Deadline applied when the caller does not supply one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Defines all possible errors for subprocess execution.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("failed to spawn: {command}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("i/o error while running: {command}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("command timed out: {command}")]
    TimedOut { command: String },

    #[error("command cancelled: {command}")]
    Cancelled { command: String },

    #[error("command failed: {command} (stderr: {stderr})")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Runs system commands with bounded deadlines.
///
/// The lease manager talks to the operating system exclusively through this
/// trait, which keeps every subprocess interaction mockable in tests.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs a command under [`DEFAULT_TIMEOUT`].
    async fn run(&self, program: &str, args: &[&str]) -> Result<String, ExecError> {
        self.run_with_timeout(DEFAULT_TIMEOUT, program, args).await
    }

    /// Runs a command, failing with [`ExecError::TimedOut`] once `timeout` elapses.
    async fn run_with_timeout(
        &self,
        timeout: Duration,
        program: &str,
        args: &[&str],
    ) -> Result<String, ExecError>;

    /// Runs a command that can additionally be aborted through `cancel`.
    ///
    /// A fired token yields [`ExecError::Cancelled`], an elapsed deadline
    /// [`ExecError::TimedOut`], so callers can tell the two apart.
    async fn run_cancellable(
        &self,
        cancel: &CancellationToken,
        timeout: Duration,
        program: &str,
        args: &[&str],
    ) -> Result<String, ExecError>;

    /// Runs a command with `input` piped to its stdin, under [`DEFAULT_TIMEOUT`].
    async fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        input: &str,
    ) -> Result<String, ExecError>;

    /// Reports whether `program` resolves to an executable on PATH.
    fn has_command(&self, program: &str) -> bool;
}

/// [`CommandRunner`] backed by real processes via `tokio::process`.
///
/// Captures stdout and stderr, trims both, and kills the child if the
/// surrounding future is dropped, so an abandoned call cannot leak a process.
#[derive(Debug, Default, Clone)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn command_line(program: &str, args: &[&str]) -> String {
        if args.is_empty() {
            program.to_string()
        } else {
            format!("{} {}", program, args.join(" "))
        }
    }

    async fn spawn_and_wait(
        &self,
        timeout: Duration,
        program: &str,
        args: &[&str],
        input: Option<&str>,
    ) -> Result<String, ExecError> {
        let command = Self::command_line(program, args);
        tracing::debug!("Executing: {} (deadline {:?})", command, timeout);

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| ExecError::Spawn {
            command: command.clone(),
            source,
        })?;

        if let Some(input) = input {
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(input.as_bytes())
                    .await
                    .map_err(|source| ExecError::Io {
                        command: command.clone(),
                        source,
                    })?;
                // dropping the handle closes the pipe so the child sees EOF
            }
        }

        let output = match time::timeout(timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| ExecError::Io {
                command: command.clone(),
                source,
            })?,
            // the dropped future takes the child down with it
            Err(_) => return Err(ExecError::TimedOut { command }),
        };

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

        if output.status.success() {
            Ok(stdout)
        } else {
            Err(ExecError::Failed {
                command,
                code: output.status.code(),
                stderr,
            })
        }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run_with_timeout(
        &self,
        timeout: Duration,
        program: &str,
        args: &[&str],
    ) -> Result<String, ExecError> {
        self.spawn_and_wait(timeout, program, args, None).await
    }

    async fn run_cancellable(
        &self,
        cancel: &CancellationToken,
        timeout: Duration,
        program: &str,
        args: &[&str],
    ) -> Result<String, ExecError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(ExecError::Cancelled {
                command: Self::command_line(program, args),
            }),
            result = self.spawn_and_wait(timeout, program, args, None) => result,
        }
    }

    async fn run_with_stdin(
        &self,
        program: &str,
        args: &[&str],
        input: &str,
    ) -> Result<String, ExecError> {
        self.spawn_and_wait(DEFAULT_TIMEOUT, program, args, Some(input))
            .await
    }

    fn has_command(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
