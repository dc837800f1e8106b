//! Shell command execution.

use crate::error::{OutpostError, Result};
use crate::runner::interrupt::sigint_received;
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// How often a command with a deadline is polled for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Result of executing a shell command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Execution duration.
    pub duration: Duration,

    /// Whether command succeeded (exit code 0).
    pub success: bool,
}

impl CommandResult {
    /// Create a success result.
    pub fn success(stdout: String, stderr: String, duration: Duration) -> Self {
        Self {
            exit_code: Some(0),
            stdout,
            stderr,
            duration,
            success: true,
        }
    }

    /// Create a failure result.
    pub fn failure(
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
            duration,
            success: false,
        }
    }

    /// Convert a non-zero exit into [`OutpostError::CommandFailed`].
    pub fn into_result(self, command: &str) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(OutpostError::CommandFailed {
                command: command.to_string(),
                code: self.exit_code,
            })
        }
    }
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Working directory.
    pub cwd: Option<PathBuf>,

    /// Environment variables (merged with system env).
    pub env: HashMap<String, String>,

    /// Capture stdout and stderr (if false, both are inherited from the parent).
    pub capture: bool,

    /// Kill the command after this long (None = wait indefinitely).
    pub timeout: Option<Duration>,

    /// Run the command as this account via `sudo -u`.
    pub run_as: Option<String>,
}

impl CommandOptions {
    /// Options that capture output silently.
    pub fn captured() -> Self {
        Self {
            capture: true,
            ..Default::default()
        }
    }

    /// Set the account the command runs as.
    pub fn as_user(mut self, user: Option<&str>) -> Self {
        self.run_as = user.map(str::to_string);
        self
    }

    /// Set the time limit.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Build the process for a command line, honouring `run_as`.
fn build_command(command: &str, options: &CommandOptions) -> Command {
    let mut cmd = match &options.run_as {
        Some(user) => {
            let mut cmd = Command::new("sudo");
            cmd.args(["-u", user, "-H", "sh", "-c", command]);
            cmd
        }
        None => {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command]);
            cmd
        }
    };

    if let Some(cwd) = &options.cwd {
        cmd.current_dir(cwd);
    }

    for (key, value) in &options.env {
        cmd.env(key, value);
    }

    if options.capture {
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
    } else {
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());
    }

    // A timed command leads its own process group so the deadline can take
    // down everything it started, not just the shell.
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        if options.timeout.is_some() {
            cmd.process_group(0);
        }
    }

    cmd
}

/// Kill a timed child together with everything in its process group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        // SAFETY: killpg only sends a signal; the group id is the pid of a
        // child we spawned as group leader and have not reaped yet
        let rc = unsafe { libc::killpg(child.id() as libc::pid_t, libc::SIGKILL) };
        if rc == 0 {
            let _ = child.wait();
            return;
        }
    }

    let _ = child.kill();
    let _ = child.wait();
}

/// Drain a child pipe on its own thread so a full pipe never stalls the child.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).to_string()
    })
}

/// Wait for the child, killing it once the deadline passes.
fn wait_with_deadline(
    child: &mut Child,
    command: &str,
    timeout: Option<Duration>,
) -> Result<std::process::ExitStatus> {
    let spawn_err = |_| OutpostError::CommandFailed {
        command: command.to_string(),
        code: None,
    };

    let Some(timeout) = timeout else {
        return child.wait().map_err(spawn_err);
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait().map_err(spawn_err)? {
            return Ok(status);
        }
        // Its own process group never sees the terminal's Ctrl-C.
        if sigint_received() {
            kill_tree(child);
            return Err(OutpostError::Interrupted);
        }
        if Instant::now() >= deadline {
            kill_tree(child);
            return Err(OutpostError::CommandTimedOut {
                command: command.to_string(),
                seconds: timeout.as_secs(),
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Execute a shell command.
pub fn execute(command: &str, options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();
    tracing::debug!(command, run_as = ?options.run_as, "spawning");

    let mut child = build_command(command, options)
        .spawn()
        .map_err(|_| OutpostError::CommandFailed {
            command: command.to_string(),
            code: None,
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = wait_with_deadline(&mut child, command, options.timeout)?;

    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();
    let duration = start.elapsed();

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if status.signal() == Some(libc::SIGINT) {
            return Err(OutpostError::Interrupted);
        }
    }

    if status.success() {
        Ok(CommandResult::success(stdout, stderr, duration))
    } else {
        Ok(CommandResult::failure(
            status.code(),
            stdout,
            stderr,
            duration,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_successful_command() {
        let result = execute("echo hello", &CommandOptions::captured()).unwrap();

        assert!(result.success);
        assert_eq!(result.exit_code, Some(0));
        assert!(result.stdout.contains("hello"));
    }

    #[test]
    fn execute_failing_command() {
        let result = execute("exit 3", &CommandOptions::captured()).unwrap();

        assert!(!result.success);
        assert_eq!(result.exit_code, Some(3));
    }

    #[test]
    fn execute_captures_stderr() {
        let result = execute("echo oops >&2", &CommandOptions::captured()).unwrap();
        assert!(result.stderr.contains("oops"));
    }

    #[test]
    fn execute_with_env() {
        let mut options = CommandOptions::captured();
        options
            .env
            .insert("MY_VAR".to_string(), "my_value".to_string());

        let result = execute("echo $MY_VAR", &options).unwrap();

        assert!(result.success);
        assert!(result.stdout.contains("my_value"));
    }

    #[test]
    fn execute_with_cwd() {
        let temp = tempfile::TempDir::new().unwrap();
        let options = CommandOptions {
            cwd: Some(temp.path().to_path_buf()),
            capture: true,
            ..Default::default()
        };

        let result = execute("pwd", &options).unwrap();

        assert!(result.success);
        let name = temp.path().file_name().unwrap().to_string_lossy();
        assert!(result.stdout.contains(name.as_ref()));
    }

    #[test]
    fn execute_kills_command_after_timeout() {
        let options = CommandOptions::captured().with_timeout(Some(Duration::from_millis(200)));

        let err = execute("sleep 5", &options).unwrap_err();

        assert!(matches!(err, OutpostError::CommandTimedOut { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_takes_down_background_children() {
        let temp = tempfile::TempDir::new().unwrap();
        let marker = temp.path().join("late");
        let command = format!("sh -c 'sleep 2; touch {}' & wait; true", marker.display());
        let options = CommandOptions::captured().with_timeout(Some(Duration::from_secs(1)));

        let started = Instant::now();
        let err = execute(&command, &options).unwrap_err();
        assert!(matches!(err, OutpostError::CommandTimedOut { seconds: 1, .. }));
        assert!(started.elapsed() < Duration::from_secs(2));

        thread::sleep(Duration::from_secs(3));
        assert!(!marker.exists());
    }

    #[cfg(unix)]
    #[test]
    fn child_killed_by_sigint_is_an_interrupt() {
        let err = execute("kill -INT $$", &CommandOptions::captured()).unwrap_err();
        assert!(matches!(err, OutpostError::Interrupted));
    }

    #[test]
    fn execute_within_timeout_succeeds() {
        let options = CommandOptions::captured().with_timeout(Some(Duration::from_secs(10)));
        let result = execute("echo quick", &options).unwrap();
        assert!(result.success);
    }

    #[test]
    fn into_result_maps_failure() {
        let result = execute("exit 2", &CommandOptions::captured()).unwrap();
        let err = result.into_result("exit 2").unwrap_err();
        assert!(matches!(
            err,
            OutpostError::CommandFailed { code: Some(2), .. }
        ));
    }

    #[test]
    fn as_user_sets_run_as() {
        let options = CommandOptions::captured().as_user(Some("alice"));
        assert_eq!(options.run_as.as_deref(), Some("alice"));
    }
}
