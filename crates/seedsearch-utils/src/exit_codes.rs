//! Exit code constants for the seedsearch CLI.
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Run completed (including unsatisfiable or timed-out sub-searches) |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments, configuration, or query pair |
//! | 70 | `SOLVER_FAILURE` | Solver process could not be run |
//! | 71 | `WORKER_FAILURE` | Worker process could not be run |

/// Exit codes matching the documented exit code table.
///
/// ```rust
/// use seedsearch_utils::exit_codes::ExitCode;
///
/// assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
/// assert_eq!(ExitCode::from_i32(70), ExitCode::SOLVER_FAILURE);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - the run completed
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments, configuration or query pair
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Solver failure - the solver could not be started or observed
    pub const SOLVER_FAILURE: ExitCode = ExitCode(70);

    /// Worker failure - the isolated worker could not be started or observed
    pub const WORKER_FAILURE: ExitCode = ExitCode(71);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values_are_stable() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::INTERNAL.as_i32(), 1);
        assert_eq!(ExitCode::CLI_ARGS.as_i32(), 2);
        assert_eq!(ExitCode::SOLVER_FAILURE.as_i32(), 70);
        assert_eq!(ExitCode::WORKER_FAILURE.as_i32(), 71);
    }

    #[test]
    fn test_into_i32() {
        let raw: i32 = ExitCode::CLI_ARGS.into();
        assert_eq!(raw, 2);
    }
}
