//! Runs an extracted command in the configured repository.
//!
//! There is no sandbox here: whatever the AI produced runs through `sh -c`
//! with the repository as its working directory. Failures are reported as
//! text, never as errors, so the summary step can explain them.

use crate::pipeline::extract::UntrustedCommand;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Prefix of every synthesized failure report.
pub const EXECUTION_ERROR_MARKER: &str = "An error occurred while executing the command";

/// Where and how commands run.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub working_dir: PathBuf,
    /// Appended to the child's `PATH`.
    pub extra_path: Vec<PathBuf>,
}

impl ExecutorConfig {
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            extra_path: Vec::new(),
        }
    }

    pub fn with_extra_path(mut self, extra_path: Vec<PathBuf>) -> Self {
        self.extra_path = extra_path;
        self
    }
}

/// Result of running a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutcome {
    /// Combined stdout and stderr, or a failure report.
    pub output: String,
    pub success: bool,
    /// `None` when the shell never started or was killed by a signal.
    pub exit_code: Option<i32>,
}

/// Execute a command in the configured working directory.
pub fn execute_command(config: &ExecutorConfig, command: &UntrustedCommand) -> ExecutionOutcome {
    // stderr is folded into stdout inside the shell so both streams keep
    // the order they were written in.
    let script = format!("exec 2>&1\n{}", command.as_str());

    let mut child = Command::new("sh");
    child.arg("-c").arg(script).current_dir(&config.working_dir);

    if !config.extra_path.is_empty() {
        match extended_path(&config.extra_path) {
            Some(path) => {
                child.env("PATH", path);
            }
            None => tracing::warn!("Ignoring extra_path: entries cannot be joined into PATH"),
        }
    }

    match child.output() {
        Ok(output) => outcome_from_output(command, &output),
        Err(e) => {
            tracing::warn!("Failed to start shell in {}: {}", config.working_dir.display(), e);
            ExecutionOutcome {
                output: format!(
                    "{}: failed to start the shell in {}: {}",
                    EXECUTION_ERROR_MARKER,
                    config.working_dir.display(),
                    e
                ),
                success: false,
                exit_code: None,
            }
        }
    }
}

fn outcome_from_output(command: &UntrustedCommand, output: &Output) -> ExecutionOutcome {
    let mut captured = String::from_utf8_lossy(&output.stdout).to_string();
    // Anything written before the redirect took effect.
    if !output.stderr.is_empty() {
        if !captured.is_empty() && !captured.ends_with('\n') {
            captured.push('\n');
        }
        captured.push_str(&String::from_utf8_lossy(&output.stderr));
    }

    if output.status.success() {
        return ExecutionOutcome {
            output: captured,
            success: true,
            exit_code: output.status.code(),
        };
    }

    let detail = match output.status.code() {
        Some(code) => format!(
            "Command '{}' returned non-zero exit status {}.",
            command.as_str(),
            code
        ),
        None => format!("Command '{}' was terminated by a signal.", command.as_str()),
    };
    tracing::warn!("{}", detail);

    let mut report = format!("{}: {}", EXECUTION_ERROR_MARKER, detail);
    if !captured.trim().is_empty() {
        report.push_str("\n\nOutput:\n");
        report.push_str(&captured);
    }

    ExecutionOutcome {
        output: report,
        success: false,
        exit_code: output.status.code(),
    }
}

/// Current `PATH` followed by `extra`.
fn extended_path(extra: &[PathBuf]) -> Option<OsString> {
    let current = std::env::var_os("PATH").unwrap_or_default();
    let paths = std::env::split_paths(&current).chain(extra.iter().cloned());
    std::env::join_paths(paths).ok()
}

/// Convenience for callers that only have a path.
pub fn execute_in(working_dir: &Path, command: &UntrustedCommand) -> ExecutionOutcome {
    execute_command(&ExecutorConfig::new(working_dir), command)
}
