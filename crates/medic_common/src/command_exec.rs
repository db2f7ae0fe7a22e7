//! Command execution layer.
//!
//! Runs a host command and captures real exit code, stdout, stderr and
//! duration. Results are returned as received; interpretation belongs to the
//! caller.

use serde::{Deserialize, Serialize};
use std::process::Command;
use std::time::Instant;

/// Maximum output length to capture per stream
const MAX_OUTPUT_BYTES: usize = 64 * 1024;

/// Result of a command execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResult {
    /// Full command that was executed
    pub command: String,
    /// Exit code (0 = success, -1 when the process never ran)
    pub exit_code: i32,
    /// Stdout (truncated if too long)
    pub stdout: String,
    /// Stderr (truncated if too long)
    pub stderr: String,
    /// Execution duration
    pub duration_ms: u64,
    /// Classified execution status
    pub status: ExecutionStatus,
}

/// Execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Command ran and exited zero
    Success,
    /// Command ran but returned non-zero exit code
    NonZeroExit,
    /// Command not found on system
    CommandNotFound,
    /// Permission denied
    PermissionDenied,
    /// Other OS error
    OsError,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NonZeroExit => "non-zero exit",
            Self::CommandNotFound => "command not found",
            Self::PermissionDenied => "permission denied",
            Self::OsError => "OS error",
        }
    }
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }

    /// One-line failure summary: stderr when present, status otherwise
    pub fn error_summary(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("{} (exit {})", self.status.as_str(), self.exit_code)
        } else {
            stderr.lines().next().unwrap_or(stderr).to_string()
        }
    }
}

/// Execute a program with arguments and capture the outcome.
///
/// Never panics and never returns Err; a process that could not be spawned
/// comes back as a classified failure result.
pub fn run_command(program: &str, args: &[&str]) -> CommandResult {
    let start = Instant::now();
    let rendered = if args.is_empty() {
        program.to_string()
    } else {
        format!("{} {}", program, args.join(" "))
    };

    let output = Command::new(program).args(args).output();
    let duration_ms = start.elapsed().as_millis() as u64;

    match output {
        Ok(output) => {
            let (stdout, _) = truncate_output(&output.stdout);
            let (stderr, _) = truncate_output(&output.stderr);
            let exit_code = output.status.code().unwrap_or(-1);

            let status = if output.status.success() {
                ExecutionStatus::Success
            } else {
                ExecutionStatus::NonZeroExit
            };

            CommandResult {
                command: rendered,
                exit_code,
                stdout,
                stderr,
                duration_ms,
                status,
            }
        }
        Err(e) => {
            let status = match e.kind() {
                std::io::ErrorKind::NotFound => ExecutionStatus::CommandNotFound,
                std::io::ErrorKind::PermissionDenied => ExecutionStatus::PermissionDenied,
                _ => ExecutionStatus::OsError,
            };

            CommandResult {
                command: rendered,
                exit_code: -1,
                stdout: String::new(),
                stderr: format!("OS error: {}", e),
                duration_ms,
                status,
            }
        }
    }
}

/// Truncate output to max bytes, converting to string
fn truncate_output(bytes: &[u8]) -> (String, bool) {
    let truncated = bytes.len() > MAX_OUTPUT_BYTES;
    let slice = if truncated {
        &bytes[..MAX_OUTPUT_BYTES]
    } else {
        bytes
    };

    (String::from_utf8_lossy(slice).to_string(), truncated)
}
