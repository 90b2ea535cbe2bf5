//! Subprocess execution
//!
//! All external processes (PATH searches, version probes, clang-format,
//! CMake) go through [`CommandRunner`], so the tool locator can be driven by
//! canned output in tests.

use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::error::ToolsError;

/// Result of a subprocess execution
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Program that was run
    pub program: String,

    /// Whether the command succeeded (exit code 0)
    pub success: bool,

    /// Process exit code
    pub exit_code: i32,

    /// Captured standard output
    pub stdout: String,

    /// Captured standard error
    pub stderr: String,

    /// Execution duration
    pub duration: Duration,
}

impl CommandResult {
    /// Create a CommandResult from an exit status
    pub fn from_status(
        program: &str,
        status: ExitStatus,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        let exit_code = status.code().unwrap_or(-1);
        Self {
            program: program.to_string(),
            success: status.success(),
            exit_code,
            stdout,
            stderr,
            duration,
        }
    }

    /// Turn a non-zero exit into a `ProcessFailure`
    pub fn check(self) -> Result<Self, ToolsError> {
        if self.success {
            return Ok(self);
        }
        let detail = self.stderr.trim();
        let message = if detail.is_empty() {
            format!("exit code {}", self.exit_code)
        } else {
            format!("exit code {}: {}", self.exit_code, detail)
        };
        Err(ToolsError::process_failure(&self.program, message))
    }
}

/// Process-exec boundary
pub trait CommandRunner: Sync {
    /// Run `program` with `args`, capturing stdout and stderr
    fn output(&self, program: &str, args: &[String]) -> Result<CommandResult, ToolsError>;
}

/// Runs real processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn output(&self, program: &str, args: &[String]) -> Result<CommandResult, ToolsError> {
        run_command(program, args, false)
    }
}

/// Run a command, either capturing its output or inheriting the terminal
pub fn run_command(program: &str, args: &[String], inherit_io: bool) -> Result<CommandResult, ToolsError> {
    let start = Instant::now();

    let mut cmd = Command::new(program);
    cmd.args(args);
    tracing::debug!(program, ?args, "spawning process");

    if inherit_io {
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());

        let status = cmd
            .status()
            .map_err(|e| ToolsError::process_failure(program, format!("failed to execute: {}", e)))?;

        Ok(CommandResult::from_status(
            program,
            status,
            String::new(),
            String::new(),
            start.elapsed(),
        ))
    } else {
        let output = cmd
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ToolsError::process_failure(program, format!("failed to execute: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        Ok(CommandResult::from_status(
            program,
            output.status,
            stdout,
            stderr,
            start.elapsed(),
        ))
    }
}

/// Check if a command exists in PATH (or is a path to an executable)
pub fn command_exists(program: &str) -> bool {
    which::which(program).is_ok()
}

/// Run a command with inherited output and fail on a missing executable or non-zero exit
pub fn run_checked(program: &str, args: &[String]) -> Result<CommandResult, ToolsError> {
    if !command_exists(program) {
        return Err(ToolsError::process_failure(program, "executable not found"));
    }
    let result = run_command(program, args, true)?;
    tracing::debug!(program, exit_code = result.exit_code, elapsed = ?result.duration, "process finished");
    result.check()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_run_command_captures_stdout() {
        let result = run_command("sh", &["-c".to_string(), "echo hello".to_string()], false).unwrap();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_process_failure() {
        let result = run_command(
            "sh",
            &["-c".to_string(), "echo broken >&2; exit 3".to_string()],
            false,
        )
        .unwrap();
        assert!(!result.success);
        let err = result.check().unwrap_err();
        match err {
            ToolsError::ProcessFailure { program, message } => {
                assert_eq!(program, "sh");
                assert!(message.contains("exit code 3"));
                assert!(message.contains("broken"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_executable_is_process_failure() {
        let err = run_command("definitely-not-a-real-tool-4821", &[], false).unwrap_err();
        assert!(matches!(err, ToolsError::ProcessFailure { .. }));

        let err = run_checked("definitely-not-a-real-tool-4821", &[]).unwrap_err();
        assert!(matches!(err, ToolsError::ProcessFailure { .. }));
    }
}
