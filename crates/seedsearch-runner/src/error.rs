//! Error types for process execution

use thiserror::Error;

/// Failures that prevent a process from producing any output at all.
///
/// Deadline expiry is not an error: it is reported through
/// [`ProcessOutput::timed_out`](crate::ProcessOutput::timed_out) so that partial
/// output survives.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn '{program}': {reason}")]
    SpawnFailed { program: String, reason: String },

    #[error("Native execution failed: {reason}")]
    NativeExecutionFailed { reason: String },

    #[error("Runner configuration invalid: {reason}")]
    ConfigurationInvalid { reason: String },
}
