use std::fmt;
use thiserror::Error;

pub use seedsearch_runner::RunnerError;

/// Library-level error type with user-friendly reporting.
///
/// Only failures that must stop the caller surface here. Expected search
/// outcomes (unsatisfiable problems, expired deadlines, unreadable solver output)
/// are recorded on the sub-search result instead.
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration errors and unsupported query pairs |
/// | 70 | Solver process failures |
/// | 71 | Worker process failures |
/// | 1 | Other errors |
///
/// # Example
///
/// ```rust
/// use seedsearch_utils::error::{ConfigError, SeedSearchError};
/// use seedsearch_utils::exit_codes::ExitCode;
///
/// let err = SeedSearchError::Config(ConfigError::InvalidValue {
///     key: "solution_limit".to_string(),
///     value: "must be -1, 0 or positive".to_string(),
/// });
/// assert_eq!(err.to_exit_code(), ExitCode::CLI_ARGS);
/// assert!(err.display_for_user().contains("solution_limit"));
/// ```
///
/// Library code returns `SeedSearchError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum SeedSearchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    QueryContract,
    SolverExecution,
    WorkerExecution,
    FileSystem,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::QueryContract => write!(f, "Query Contract"),
            Self::SolverExecution => write!(f, "Solver Execution"),
            Self::WorkerExecution => write!(f, "Worker Execution"),
            Self::FileSystem => write!(f, "File System"),
        }
    }
}

// ============================================================================
// Configuration errors
// ============================================================================

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file: {0}")]
    InvalidFile(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Configuration discovery failed: {reason}")]
    DiscoveryFailed { reason: String },
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile(reason) => {
                format!("Configuration file has invalid format: {reason}")
            }
            Self::MissingRequired(key) => {
                format!("Required configuration '{key}' is missing")
            }
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::DiscoveryFailed { reason } => {
                format!("Failed to discover configuration: {reason}")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile(_) => Some(
                "Configuration files are TOML with [search], [solver], [encoding], [oracle] and [output] sections."
                    .to_string(),
            ),
            Self::MissingRequired(_) => {
                Some("Some values have no usable default for this run.".to_string())
            }
            Self::InvalidValue { key, value: _ } => Some(format!(
                "The '{key}' option has specific format requirements."
            )),
            Self::DiscoveryFailed { reason: _ } => Some(
                "seedsearch looks for .seedsearch/config.toml from the current directory upward."
                    .to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile(_) => vec![
                "Check the TOML syntax of .seedsearch/config.toml".to_string(),
                "Remove unknown keys or sections".to_string(),
            ],
            Self::MissingRequired(key) => vec![
                format!("Set '{key}' in .seedsearch/config.toml"),
                "Pass the value on the command line".to_string(),
            ],
            Self::InvalidValue { key, value: _ } => match key.as_str() {
                "run_mode" => vec!["Use 'target', 'full' or 'fba'".to_string()],
                "strategy" => vec![
                    "Use 'classic', 'filter', 'guess-check', 'guess-check-div' or 'all'"
                        .to_string(),
                ],
                "backend" => vec!["Use 'reasoning' or 'hybrid'".to_string()],
                "solution_limit" => vec![
                    "Use 0 for no limit or -1 to skip enumeration".to_string(),
                ],
                "flux_epsilon" => vec!["Use a small positive number such as 1e-5".to_string()],
                _ => vec![
                    "Check the documentation for valid values for this option".to_string(),
                    "Remove the option to use the default value".to_string(),
                ],
            },
            Self::DiscoveryFailed { reason: _ } => vec![
                "Check read permissions on the directory tree".to_string(),
                "Use --config <path> to specify the configuration file explicitly".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

// ============================================================================
// Query contract errors
// ============================================================================

/// A search mode and search type that have no solver query.
///
/// This is a programming-contract violation and aborts the run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("No solver query for search mode '{mode}' with search type '{search_type}'")]
    Unsupported { mode: String, search_type: String },
}

impl UserFriendlyError for QueryError {
    fn user_message(&self) -> String {
        match self {
            Self::Unsupported { mode, search_type } => {
                format!("'{search_type}' is not available in {mode} mode")
            }
        }
    }

    fn context(&self) -> Option<String> {
        Some("Subset-minimal searches support enumeration and intersection only.".to_string())
    }

    fn suggestions(&self) -> Vec<String> {
        vec!["Disable union for subset-minimal searches".to_string()]
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::QueryContract
    }
}

// ============================================================================
// Solver errors
// ============================================================================

/// Abnormal solver terminations not caused by the deadline.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Solver exited with code {code}: {stderr_tail}")]
    AbnormalExit { code: i32, stderr_tail: String },

    #[error("Solver terminated by signal: {stderr_tail}")]
    Signalled { stderr_tail: String },

    #[error("No objective reaction available for a flux-coupled search")]
    NoObjective,
}

impl UserFriendlyError for SolverError {
    fn user_message(&self) -> String {
        match self {
            Self::AbnormalExit { code, stderr_tail } => {
                format!("The solver failed (exit code {code}): {stderr_tail}")
            }
            Self::Signalled { stderr_tail } => {
                format!("The solver was terminated by a signal: {stderr_tail}")
            }
            Self::NoObjective => {
                "The network has no objective reaction for hybrid solving".to_string()
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::AbnormalExit { .. } | Self::Signalled { .. } => Some(
                "clingo reports 10 (SAT), 20 (UNSAT), 30 (OPTIMUM) and their interrupted variants; other codes are failures."
                    .to_string(),
            ),
            Self::NoObjective => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::AbnormalExit { .. } | Self::Signalled { .. } => vec![
                "Check that the encoding files exist and parse".to_string(),
                "Run the logged solver command by hand to see the full error".to_string(),
            ],
            Self::NoObjective => vec!["Declare an objective reaction in the facts".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::SolverExecution
    }
}

// ============================================================================
// Worker errors
// ============================================================================

/// Failures of the isolated guess-and-validate worker.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Worker could not be launched: {reason}")]
    LaunchFailed { reason: String },

    #[error("Worker exited abnormally ({status}): {stderr_tail}")]
    AbnormalExit { status: String, stderr_tail: String },

    #[error("Worker report unreadable: {reason}")]
    InvalidReport { reason: String },

    #[error("Worker channel closed before a report was sent")]
    Disconnected,
}

impl UserFriendlyError for WorkerError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        Some(
            "Validated searches run in a separate worker; its committed solutions are recovered from the side log."
                .to_string(),
        )
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::LaunchFailed { .. } => {
                vec!["Check that the seedsearch executable is still present".to_string()]
            }
            _ => vec!["Re-run with --verbose to see the worker's log output".to_string()],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::WorkerExecution
    }
}

// ============================================================================
// SeedSearchError reporting
// ============================================================================

impl UserFriendlyError for SeedSearchError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.user_message(),
            Self::Query(err) => err.user_message(),
            Self::Solver(err) => err.user_message(),
            Self::Worker(err) => err.user_message(),
            Self::Runner(err) => format!("Process execution failed: {err}"),
            Self::Io(err) => format!("File operation failed: {err}"),
            Self::Json(err) => format!("JSON processing failed: {err}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(err) => err.context(),
            Self::Query(err) => err.context(),
            Self::Solver(err) => err.context(),
            Self::Worker(err) => err.context(),
            Self::Runner(_) => {
                Some("Solver and oracle commands are executed directly, without a shell.".to_string())
            }
            Self::Io(_) | Self::Json(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(err) => err.suggestions(),
            Self::Query(err) => err.suggestions(),
            Self::Solver(err) => err.suggestions(),
            Self::Worker(err) => err.suggestions(),
            Self::Runner(_) => vec![
                "Check that the configured solver program is on PATH".to_string(),
            ],
            Self::Io(_) => vec!["Check permissions on the output and temp directories".to_string()],
            Self::Json(_) => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Query(_) => ErrorCategory::QueryContract,
            Self::Solver(_) | Self::Runner(_) => ErrorCategory::SolverExecution,
            Self::Worker(_) => ErrorCategory::WorkerExecution,
            Self::Io(_) | Self::Json(_) => ErrorCategory::FileSystem,
        }
    }
}

impl SeedSearchError {
    /// Get a user-friendly error message with context and actionable suggestions.
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error: {}\n", self.user_message()));

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map this error to the appropriate CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> crate::exit_codes::ExitCode {
        use crate::exit_codes::ExitCode;

        match self {
            Self::Config(_) | Self::Query(_) => ExitCode::CLI_ARGS,
            Self::Solver(_) | Self::Runner(_) => ExitCode::SOLVER_FAILURE,
            Self::Worker(_) => ExitCode::WORKER_FAILURE,
            Self::Io(_) | Self::Json(_) => ExitCode::INTERNAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes::ExitCode;

    #[test]
    fn test_query_error_is_cli_args() {
        let err = SeedSearchError::from(QueryError::Unsupported {
            mode: "subset-minimal".to_string(),
            search_type: "union".to_string(),
        });
        assert_eq!(err.to_exit_code(), ExitCode::CLI_ARGS);
        assert_eq!(err.category(), ErrorCategory::QueryContract);
        assert!(err.user_message().contains("union"));
    }

    #[test]
    fn test_solver_error_maps_to_solver_failure() {
        let err = SeedSearchError::from(SolverError::AbnormalExit {
            code: 65,
            stderr_tail: "parsing failed".to_string(),
        });
        assert_eq!(err.to_exit_code(), ExitCode::SOLVER_FAILURE);
        assert!(err.to_string().contains("parsing failed"));
    }

    #[test]
    fn test_worker_error_maps_to_worker_failure() {
        let err = SeedSearchError::from(WorkerError::Disconnected);
        assert_eq!(err.to_exit_code(), ExitCode::WORKER_FAILURE);
    }

    #[test]
    fn test_display_for_user_lists_suggestions() {
        let err = SeedSearchError::from(ConfigError::InvalidValue {
            key: "strategy".to_string(),
            value: "Unknown solve strategy: fast".to_string(),
        });
        let text = err.display_for_user();
        assert!(text.starts_with("Error: Configuration 'strategy'"));
        assert!(text.contains("Suggestions:"));
        assert!(text.contains("guess-check-div"));
    }

    #[test]
    fn test_io_error_has_no_context() {
        let err = SeedSearchError::from(std::io::Error::other("disk full"));
        assert!(err.context().is_none());
        assert_eq!(err.to_exit_code(), ExitCode::INTERNAL);
    }
}
