use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

// ============================================================================
// CommandSpec - argv-only process description
// ============================================================================

/// Specification for a command to execute.
///
/// Arguments are kept as discrete `OsString` elements and handed to
/// `Command::args`, never concatenated into a shell string. Solver flags such as
/// `--opt-mode=enum,3` therefore reach the solver exactly as built.
///
/// # Example
///
/// ```rust
/// use seedsearch_runner::CommandSpec;
/// use std::ffi::OsString;
///
/// let cmd = CommandSpec::new("clingo")
///     .arg("seed-solving.lp")
///     .args(["--outf=2", "--warn=none"])
///     .cwd("/tmp");
///
/// assert_eq!(cmd.program, OsString::from("clingo"));
/// assert_eq!(cmd.args.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    /// The program to execute
    pub program: OsString,
    /// Arguments as discrete elements
    pub args: Vec<OsString>,
    /// Optional working directory
    pub cwd: Option<PathBuf>,
    /// Optional environment overrides
    pub env: Option<HashMap<OsString, OsString>>,
}

impl CommandSpec {
    /// Create a new `CommandSpec` for `program`.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: None,
        }
    }

    /// Build a spec from an argv vector, first element being the program.
    ///
    /// Returns `None` for an empty vector.
    ///
    /// ```rust
    /// use seedsearch_runner::CommandSpec;
    ///
    /// let cmd = CommandSpec::from_argv(["python", "-m", "clingolpx"]).unwrap();
    /// assert_eq!(cmd.args.len(), 2);
    /// assert!(CommandSpec::from_argv(Vec::<String>::new()).is_none());
    /// ```
    #[must_use]
    pub fn from_argv<I, S>(argv: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut iter = argv.into_iter();
        let program = iter.next()?;
        Some(Self::new(program).args(iter))
    }

    /// Add a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory for the command.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set an environment variable for the command.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Render the command line for logs.
    ///
    /// The result is for display only and is never executed.
    #[must_use]
    pub fn display_line(&self) -> String {
        let mut line = self.program.to_string_lossy().into_owned();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }

    /// Convert this `CommandSpec` into a `std::process::Command`.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        if let Some(ref env) = self.env {
            for (key, value) in env {
                cmd.env(key, value);
            }
        }

        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_new() {
        let cmd = CommandSpec::new("clingo");
        assert_eq!(cmd.program, OsString::from("clingo"));
        assert!(cmd.args.is_empty());
        assert!(cmd.cwd.is_none());
        assert!(cmd.env.is_none());
    }

    #[test]
    fn test_command_spec_builder_chain() {
        let cmd = CommandSpec::new("clingo")
            .arg("instance.lp")
            .args(["--outf=2", "--models=0"])
            .cwd("/workspace")
            .env("CLINGO_DEBUG", "1");

        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.args[1], OsString::from("--outf=2"));
        assert_eq!(cmd.cwd, Some(PathBuf::from("/workspace")));
        assert_eq!(cmd.env.as_ref().map(HashMap::len), Some(1));
    }

    #[test]
    fn test_from_argv_splits_program() {
        let cmd = CommandSpec::from_argv(["python", "-m", "clingolpx"]).unwrap();
        assert_eq!(cmd.program, OsString::from("python"));
        assert_eq!(cmd.args, vec![OsString::from("-m"), OsString::from("clingolpx")]);
    }

    #[test]
    fn test_from_argv_empty_is_none() {
        assert!(CommandSpec::from_argv(Vec::<&str>::new()).is_none());
    }

    #[test]
    fn test_display_line_joins_arguments() {
        let cmd = CommandSpec::new("clingo").args(["a.lp", "--opt-mode=enum,2"]);
        assert_eq!(cmd.display_line(), "clingo a.lp --opt-mode=enum,2");
    }

    #[test]
    fn test_constraint_text_kept_as_single_argument() {
        let cmd = CommandSpec::new("clingo").arg(":- seed(\"A\",_), seed(\"B\",_).");
        assert_eq!(cmd.args.len(), 1);
        assert_eq!(cmd.args[0], OsString::from(":- seed(\"A\",_), seed(\"B\",_)."));
    }
}
