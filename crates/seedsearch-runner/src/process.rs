use crate::error::RunnerError;
use std::time::Duration;

use super::CommandSpec;

// ============================================================================
// ProcessRunner Trait
// ============================================================================

/// Output from a process execution.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    /// Standard output, possibly truncated when `timed_out` is set
    pub stdout: Vec<u8>,
    /// Standard error from the process
    pub stderr: Vec<u8>,
    /// Exit code from the process (None if terminated by signal)
    pub exit_code: Option<i32>,
    /// Whether the deadline expired and the process was killed
    pub timed_out: bool,
}

impl ProcessOutput {
    /// Create a new `ProcessOutput` with the given values.
    #[must_use]
    pub fn new(stdout: Vec<u8>, stderr: Vec<u8>, exit_code: Option<i32>, timed_out: bool) -> Self {
        Self {
            stdout,
            stderr,
            exit_code,
            timed_out,
        }
    }

    /// Get stdout as a UTF-8 string, lossy conversion.
    #[must_use]
    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a UTF-8 string, lossy conversion.
    #[must_use]
    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }

    /// Last `max_chars` characters of stderr, for error reports.
    #[must_use]
    pub fn stderr_tail(&self, max_chars: usize) -> String {
        let stderr = self.stderr_string();
        let count = stderr.chars().count();
        if count <= max_chars {
            return stderr.trim_end().to_string();
        }
        stderr
            .chars()
            .skip(count - max_chars)
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    /// Check if the process exited successfully (exit code 0).
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out
    }
}

/// Trait for process execution under a deadline.
///
/// Implementations MUST use argv-style APIs only and MUST report deadline expiry
/// as `Ok` with [`ProcessOutput::timed_out`] set, keeping whatever stdout was
/// flushed before termination. `Err` is reserved for runs that never started or
/// could not be observed.
///
/// A `timeout` of [`Duration::MAX`] means no deadline.
///
/// # Example
///
/// ```rust
/// use seedsearch_runner::{CommandSpec, ProcessOutput, ProcessRunner, RunnerError};
/// use std::time::Duration;
///
/// struct CannedRunner(&'static str);
///
/// impl ProcessRunner for CannedRunner {
///     fn run(&self, _cmd: &CommandSpec, _timeout: Duration) -> Result<ProcessOutput, RunnerError> {
///         Ok(ProcessOutput::new(self.0.as_bytes().to_vec(), Vec::new(), Some(30), false))
///     }
/// }
///
/// let runner = CannedRunner(r#"{"Result": "SATISFIABLE"}"#);
/// let output = runner.run(&CommandSpec::new("clingo"), Duration::from_secs(5)).unwrap();
/// assert!(output.stdout_string().contains("SATISFIABLE"));
/// ```
pub trait ProcessRunner {
    /// Execute a command with the given deadline.
    fn run(&self, cmd: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunnerError>;
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for &T {
    fn run(&self, cmd: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunnerError> {
        (**self).run(cmd, timeout)
    }
}
