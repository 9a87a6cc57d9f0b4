//! Tokio-backed command runner with bounded capture and a deadline

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::errors::DeployerError;
use crate::gateway::command::{CommandOutput, CommandRunner, CommandSpec};

/// Per-stream capture limit
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Deadline applied to every command unless configured otherwise
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(600);

const READ_CHUNK_BYTES: usize = 8 * 1024;

/// Process runner options
#[derive(Debug, Clone)]
pub struct ProcessRunnerOptions {
    /// Working directory for commands that do not set one
    pub default_cwd: PathBuf,

    /// Maximum bytes captured from stdout and from stderr
    pub max_output_bytes: usize,

    /// Wall-clock deadline, `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for ProcessRunnerOptions {
    fn default() -> Self {
        Self {
            default_cwd: PathBuf::from("."),
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            timeout: Some(DEFAULT_COMMAND_TIMEOUT),
        }
    }
}

/// Spawns real processes, each in its own process group
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    options: ProcessRunnerOptions,
}

impl ProcessRunner {
    pub fn new(options: ProcessRunnerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ProcessRunnerOptions {
        &self.options
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, DeployerError> {
        let command_line = spec.to_string();
        let cwd = spec
            .cwd
            .clone()
            .unwrap_or_else(|| self.options.default_cwd.clone());
        debug!(command = %command_line, cwd = %cwd.display(), "Running command");

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(&cwd)
            .envs(spec.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|e| DeployerError::CommandFailed {
            command: command_line.clone(),
            message: format!("Failed to spawn {}: {}", command_line, e),
            stdout: String::new(),
            stderr: String::new(),
        })?;
        let pid = child.id();

        let (mut stdout, mut stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(stdout), Some(stderr)) => (stdout, stderr),
            _ => {
                kill_process_group(pid);
                return Err(DeployerError::Internal(format!(
                    "Output pipes unavailable for {}",
                    command_line
                )));
            }
        };

        let limit = self.options.max_output_bytes;
        let mut out_buf = Vec::new();
        let mut err_buf = Vec::new();

        let collect = async {
            let (out, err) = tokio::join!(
                read_capped(&mut stdout, &mut out_buf, limit, pid),
                read_capped(&mut stderr, &mut err_buf, limit, pid),
            );
            let status = child.wait().await;
            (out, err, status)
        };

        let finished = match self.options.timeout {
            Some(timeout) => tokio::time::timeout(timeout, collect).await.ok(),
            None => Some(collect.await),
        };

        let Some((out_res, err_res, status)) = finished else {
            kill_process_group(pid);
            let _ = child.start_kill();
            let _ = child.wait().await;
            let timeout = self.options.timeout.unwrap_or_default();
            warn!(command = %command_line, ?timeout, "Command timed out, process group killed");
            return Err(DeployerError::CommandTimedOut {
                command: command_line,
                timeout,
                stdout: lossy(out_buf),
                stderr: lossy(err_buf),
            });
        };

        let overflowed = match (out_res, err_res) {
            (Ok(out), Ok(err)) => out || err,
            (Err(e), _) | (_, Err(e)) => {
                return Err(failure(
                    &command_line,
                    format!("Failed to read output of {}: {}", command_line, e),
                    out_buf,
                    err_buf,
                ));
            }
        };

        if overflowed {
            warn!(command = %command_line, limit, "Command output exceeded capture limit");
            return Err(failure(
                &command_line,
                format!("Output of {} exceeded {} bytes", command_line, limit),
                out_buf,
                err_buf,
            ));
        }

        let status = match status {
            Ok(status) => status,
            Err(e) => {
                return Err(failure(
                    &command_line,
                    format!("Failed to wait for {}: {}", command_line, e),
                    out_buf,
                    err_buf,
                ));
            }
        };

        if !status.success() {
            debug!(command = %command_line, %status, "Command exited unsuccessfully");
            return Err(failure(
                &command_line,
                format!("Command failed: {} ({})", command_line, status),
                out_buf,
                err_buf,
            ));
        }

        Ok(CommandOutput {
            stdout: lossy(out_buf),
            stderr: lossy(err_buf),
        })
    }
}

/// Read until EOF or until `limit` bytes are buffered.
///
/// Returns `true` when the limit was hit; the process group is killed so the
/// sibling stream reaches EOF as well.
async fn read_capped<R>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    limit: usize,
    pid: Option<u32>,
) -> std::io::Result<bool>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = [0u8; READ_CHUNK_BYTES];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(false);
        }
        let room = limit.saturating_sub(buf.len());
        if n > room {
            buf.extend_from_slice(&chunk[..room]);
            kill_process_group(pid);
            return Ok(true);
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Some(pid) = pid.and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        debug!("Failed to kill process group {}: {}", pid, e);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

fn lossy(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

fn failure(command: &str, message: String, stdout: Vec<u8>, stderr: Vec<u8>) -> DeployerError {
    DeployerError::CommandFailed {
        command: command.to_string(),
        message,
        stdout: lossy(stdout),
        stderr: lossy(stderr),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn runner(max_output_bytes: usize, timeout: Option<Duration>) -> ProcessRunner {
        ProcessRunner::new(ProcessRunnerOptions {
            default_cwd: PathBuf::from("/"),
            max_output_bytes,
            timeout,
        })
    }

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").arg("-c").arg(script)
    }

    #[tokio::test]
    async fn test_captures_stdout_and_stderr() {
        let output = runner(DEFAULT_MAX_OUTPUT_BYTES, None)
            .run(&sh("echo hello; echo careful >&2"))
            .await
            .unwrap();

        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stderr, "careful\n");
    }

    #[tokio::test]
    async fn test_runs_in_default_directory() {
        let output = runner(DEFAULT_MAX_OUTPUT_BYTES, None)
            .run(&CommandSpec::new("pwd"))
            .await
            .unwrap();

        assert_eq!(output.stdout.trim(), "/");
    }

    #[tokio::test]
    async fn test_arguments_are_not_shell_interpreted() {
        let spec = sh("printf '%s' \"$1\"").arg("sh").arg("a;b $(whoami)");
        let output = runner(DEFAULT_MAX_OUTPUT_BYTES, None).run(&spec).await.unwrap();

        assert_eq!(output.stdout, "a;b $(whoami)");
    }

    #[tokio::test]
    async fn test_non_zero_exit_keeps_partial_output() {
        let err = runner(DEFAULT_MAX_OUTPUT_BYTES, None)
            .run(&sh("echo partial; echo boom >&2; exit 3"))
            .await
            .unwrap_err();

        match err {
            DeployerError::CommandFailed {
                message,
                stdout,
                stderr,
                ..
            } => {
                assert!(message.starts_with("Command failed: sh -c"));
                assert_eq!(stdout, "partial\n");
                assert_eq!(stderr, "boom\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_a_command_failure() {
        let err = runner(DEFAULT_MAX_OUTPUT_BYTES, None)
            .run(&CommandSpec::new("surely-not-an-installed-program"))
            .await
            .unwrap_err();

        assert!(matches!(err, DeployerError::CommandFailed { .. }));
    }

    #[tokio::test]
    async fn test_output_over_limit_fails() {
        let err = runner(16, Some(Duration::from_secs(10)))
            .run(&sh("while true; do echo 0123456789; done"))
            .await
            .unwrap_err();

        match err {
            DeployerError::CommandFailed {
                message, stdout, ..
            } => {
                assert!(message.contains("exceeded 16 bytes"));
                assert_eq!(stdout.len(), 16);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_hanging_command_times_out() {
        let err = runner(DEFAULT_MAX_OUTPUT_BYTES, Some(Duration::from_millis(300)))
            .run(&sh("echo started; sleep 30"))
            .await
            .unwrap_err();

        match err {
            DeployerError::CommandTimedOut { stdout, timeout, .. } => {
                assert_eq!(stdout, "started\n");
                assert_eq!(timeout, Duration::from_millis(300));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
