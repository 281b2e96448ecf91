//! Timed execution of external commands.

use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::process::errors::ProcessError;
use crate::process::types::{CommandOutput, Invocation};

/// Windows `CREATE_NO_WINDOW` process creation flag.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Runs external commands with a hard timeout.
///
/// The child is spawned with `kill_on_drop`, so when the timeout fires the
/// pending wait is dropped and the process is killed rather than left
/// running in the background.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run the invocation to completion and capture its output.
    ///
    /// A non-zero exit status is not an error here; callers inspect
    /// [`CommandOutput::exit_code`] because scripting hosts often print a
    /// usable result line before failing.
    pub async fn run(&self, invocation: &Invocation) -> Result<CommandOutput, ProcessError> {
        let program = invocation.program().to_string();
        let timeout_ms = invocation.timeout().as_millis() as u64;

        debug!(
            event = "core.process.run_started",
            program = %program,
            arg_count = invocation.arg_list().len(),
            timeout_ms = timeout_ms
        );

        let mut command = Command::new(&program);
        command
            .args(invocation.arg_list())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(windows)]
        if invocation.is_hidden_window() {
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ProcessError::ExecutableNotFound {
                    program: program.clone(),
                }
            } else {
                ProcessError::SpawnFailed {
                    program: program.clone(),
                    message: e.to_string(),
                }
            }
        })?;

        let output = match tokio::time::timeout(invocation.timeout(), child.wait_with_output())
            .await
        {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ProcessError::SystemError {
                    message: format!("waiting for '{}' failed: {}", program, e),
                });
            }
            Err(_) => {
                warn!(
                    event = "core.process.run_timed_out",
                    program = %program,
                    timeout_ms = timeout_ms
                );
                return Err(ProcessError::Timeout {
                    program,
                    timeout_ms,
                });
            }
        };

        let result = CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        debug!(
            event = "core.process.run_completed",
            program = %program,
            exit_code = ?result.exit_code,
            stdout_len = result.stdout.len(),
            stderr_len = result.stderr.len()
        );

        Ok(result)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_run_captures_stdout_and_stderr() {
        let invocation = Invocation::new("sh", Duration::from_secs(5))
            .args(["-c", "echo out; echo err 1>&2"]);

        let output = ProcessRunner::new().run(&invocation).await.unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_reported_not_raised() {
        let invocation =
            Invocation::new("sh", Duration::from_secs(5)).args(["-c", "echo partial; exit 3"]);

        let output = ProcessRunner::new().run(&invocation).await.unwrap();
        assert_eq!(output.exit_code, Some(3));
        assert_eq!(output.stdout.trim(), "partial");
    }

    #[tokio::test]
    async fn test_timeout_kills_and_returns_promptly() {
        let invocation = Invocation::new("sleep", Duration::from_millis(100)).arg("5");

        let started = Instant::now();
        let result = ProcessRunner::new().run(&invocation).await;
        assert!(matches!(
            result,
            Err(ProcessError::Timeout {
                timeout_ms: 100,
                ..
            })
        ));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_missing_executable() {
        let invocation = Invocation::new(
            "memora-definitely-not-a-real-binary-12345",
            Duration::from_secs(1),
        );

        let result = ProcessRunner::new().run(&invocation).await;
        assert!(matches!(
            result,
            Err(ProcessError::ExecutableNotFound { .. })
        ));
    }
}
