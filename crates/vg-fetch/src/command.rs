//! Builder for executing the external decoder with timeout support.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Command;
use vg_core::{Error, Result};

/// Default command timeout: 5 minutes.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Output captured from a decoder execution.
#[derive(Debug, Clone)]
pub struct DecoderOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing decoder invocations.
///
/// A process that runs to completion yields `Ok(DecoderOutput)` whatever its
/// exit status; the caller owns the non-zero-exit policy and keeps the raw
/// streams for its logs. Only spawn failure and timeout are `Err`.
///
/// # Example
///
/// ```no_run
/// use vg_fetch::DecoderCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> vg_core::Result<()> {
/// let output = DecoderCommand::new(PathBuf::from("yt-dlp"))
///     .arg("--version")
///     .run()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DecoderCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl DecoderCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, s: impl Into<String>) -> Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Name of the program, for error messages and logs.
    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - [`Error::ConversionFailed`] if spawning the process fails.
    /// - [`Error::Timeout`] if the process exceeds the budget; the child is
    ///   killed via `kill_on_drop` when the wait future is dropped.
    pub async fn run(&self) -> Result<DecoderOutput> {
        let program_name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| Error::ConversionFailed {
            tool: program_name.clone(),
            message: format!("failed to spawn: {e}"),
        })?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(DecoderOutput {
                status: output.status,
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            }),
            Ok(Err(e)) => Err(Error::ConversionFailed {
                tool: program_name,
                message: format!("I/O error waiting for process: {e}"),
            }),
            Err(_elapsed) => Err(Error::Timeout {
                tool: program_name,
                seconds: self.timeout.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_echo() {
        // `echo` should be universally available.
        let output = DecoderCommand::new(PathBuf::from("echo"))
            .arg("hello")
            .run()
            .await;

        match output {
            Ok(out) => {
                assert!(out.status.success());
                assert!(out.stdout.trim().contains("hello"));
            }
            Err(_) => {
                // On some minimal environments echo may not exist; skip.
            }
        }
    }

    #[tokio::test]
    async fn run_nonexistent_tool() {
        let result = DecoderCommand::new(PathBuf::from("nonexistent_tool_xyz_12345"))
            .run()
            .await;
        assert!(matches!(result, Err(Error::ConversionFailed { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_ok_with_failed_status() {
        let output = DecoderCommand::new(PathBuf::from("sh"))
            .args(["-c", "echo oops >&2; exit 3"])
            .run()
            .await
            .unwrap();
        assert!(!output.status.success());
        assert!(output.stderr.contains("oops"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn timeout_kills_and_errors() {
        let result = DecoderCommand::new(PathBuf::from("sleep"))
            .arg("5")
            .timeout(Duration::from_millis(100))
            .run()
            .await;
        assert!(matches!(result, Err(Error::Timeout { .. })));
    }
}
