//! Child process execution primitives with consistent error handling.

use std::path::Path;
use std::process::{Child, Command, Output, Stdio};

use serde::Serialize;

use crate::error::{Error, Result};

/// Captured output from a finished child process.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommandOutput {
    pub exit_code: i32,
    pub success: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stdout: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub stderr: String,
}

impl CommandOutput {
    fn from_output(output: Output) -> Self {
        Self {
            exit_code: output.status.code().unwrap_or(-1),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Run a command in `dir` and capture its output. Only a spawn failure is an
/// error; a non-zero exit is reported through [`CommandOutput`] so callers
/// decide what failure means for their task.
pub fn capture_in(dir: &Path, program: &str, args: &[String], context: &str) -> Result<CommandOutput> {
    let output = Command::new(program)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| {
            Error::internal_io(
                format!("Failed to run {}: {}", context, e),
                Some(context.to_string()),
            )
        })?;

    Ok(CommandOutput::from_output(output))
}

/// Run a command in `dir` and return trimmed stdout on success.
///
/// Returns an error with stderr (or stdout fallback) if it fails.
pub fn run_in(dir: &Path, program: &str, args: &[String], context: &str) -> Result<String> {
    let output = capture_in(dir, program, args, context)?;

    if !output.success {
        return Err(Error::internal_io(
            format!("{} failed: {}", context, error_text(&output)),
            Some(context.to_string()),
        ));
    }

    Ok(output.stdout.trim().to_string())
}

/// Spawn a long-running command in `dir` without waiting for it. Used for
/// the local static server backing the cloud test run.
pub fn spawn_in(dir: &Path, program: &str, args: &[String], context: &str) -> Result<Child> {
    Command::new(program)
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| {
            Error::internal_io(
                format!("Failed to spawn {}: {}", context, e),
                Some(context.to_string()),
            )
        })
}

/// Extract error text from command output.
///
/// Prefers stderr, falls back to stdout if stderr is empty.
pub fn error_text(output: &CommandOutput) -> String {
    if !output.stderr.trim().is_empty() {
        output.stderr.trim().to_string()
    } else {
        output.stdout.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn cwd() -> PathBuf {
        std::env::current_dir().unwrap()
    }

    #[test]
    fn run_in_succeeds_with_valid_command() {
        let result = run_in(&cwd(), "echo", &["hello".to_string()], "echo test");
        assert_eq!(result.unwrap(), "hello");
    }

    #[test]
    fn run_in_fails_with_unknown_command() {
        let result = run_in(&cwd(), "nonexistent_command_xyz", &[], "test");
        assert!(result.is_err());
    }

    #[test]
    fn capture_in_reports_exit_code_without_error() {
        let output = capture_in(&cwd(), "false", &[], "false test").unwrap();
        assert!(!output.success);
        assert_ne!(output.exit_code, 0);
    }

    #[test]
    fn error_text_prefers_stderr() {
        let output = CommandOutput {
            exit_code: 1,
            success: false,
            stdout: "stdout content".to_string(),
            stderr: "stderr content".to_string(),
        };
        assert_eq!(error_text(&output), "stderr content");
    }

    #[test]
    fn error_text_falls_back_to_stdout() {
        let output = CommandOutput {
            exit_code: 1,
            success: false,
            stdout: "stdout content".to_string(),
            stderr: String::new(),
        };
        assert_eq!(error_text(&output), "stdout content");
    }
}
