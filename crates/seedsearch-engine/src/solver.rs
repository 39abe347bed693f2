//! Solver invocation: argv assembly, deadline, exit status, memory sampling

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use seedsearch_config::Config;
use seedsearch_runner::{CommandSpec, ProcessOutput, ProcessRunner, RunnerError, peak_children_memory_gb};
use seedsearch_utils::error::{SeedSearchError, SolverError};
use seedsearch_utils::types::{SearchMode, SolverBackend};

use crate::decoder::{DecodedRun, decode};
use crate::facts::FactSource;
use crate::query::DecodeMode;
use crate::request::TimeBudget;

/// Exit codes clingo uses for regular answers: 10 SAT, 20 UNSAT, 30 optimum,
/// plus 1 when interrupted (time limit) and 0 when nothing was solved.
const ANSWER_EXIT_CODES: [i32; 8] = [0, 1, 10, 11, 20, 21, 30, 31];

const STDERR_TAIL_CHARS: usize = 2_000;

/// Everything needed to start the solver for one search branch.
///
/// Serializable so an isolated worker can rebuild the same invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverSetup {
    pub backend: SolverBackend,
    /// Program and leading arguments (`clingo`, or e.g. `python -m clingolpx`)
    pub program: Vec<String>,
    pub files: Vec<Utf8PathBuf>,
    /// `name=value` pairs passed as `-c name=value`
    pub constants: Vec<String>,
    pub configuration: Option<String>,
    pub opt_strategy: Option<String>,
    /// Extra time granted past the budget before the solver is killed
    pub grace: Duration,
}

impl SolverSetup {
    /// Setup for `search_mode` on `instance`, using the configured encodings.
    pub fn for_search(
        config: &Config,
        search_mode: SearchMode,
        instance: &Utf8Path,
        facts: &dyn FactSource,
    ) -> Result<Self, SeedSearchError> {
        let backend = config.backend()?;
        let run_mode = config.run_mode()?;

        let program = match backend {
            SolverBackend::Reasoning => vec![config.clingo_program().to_string()],
            SolverBackend::Hybrid => config.clingo_lpx_argv(),
        };

        let mut files = vec![instance.to_path_buf(), config.seed_solving_encoding()];
        if backend == SolverBackend::Hybrid {
            files.push(config.flux_encoding());
            if config.maximize_flux() {
                files.push(config.maximize_flux_encoding());
            }
        }

        let mut constants = vec![
            format!("run_mode={}", run_mode.as_str()),
            format!("accu={}", u8::from(config.accumulation() || facts.accumulation())),
        ];

        if search_mode == SearchMode::Minimize {
            if facts.is_subseed() {
                files.push(config.maximize_produced_target_encoding());
                constants.push("subseed=1".to_string());
            }
            files.push(config.minimize_encoding());
        }

        Ok(Self {
            backend,
            program,
            files,
            constants,
            configuration: config.solver_configuration().map(str::to_string),
            opt_strategy: config.opt_strategy().map(str::to_string),
            grace: config.grace(),
        })
    }

    /// The same setup reading one more program file.
    #[must_use]
    pub fn with_extra_file(&self, path: impl Into<Utf8PathBuf>) -> Self {
        let mut setup = self.clone();
        setup.files.push(path.into());
        setup
    }

    /// Full command line for one solver call.
    pub fn command(
        &self,
        flags: &[String],
        models: u64,
        budget: TimeBudget,
    ) -> Result<CommandSpec, RunnerError> {
        let mut cmd = CommandSpec::from_argv(&self.program).ok_or_else(|| {
            RunnerError::ConfigurationInvalid {
                reason: "solver program is empty".to_string(),
            }
        })?;

        cmd = cmd.args(self.files.iter().map(|file| file.as_str()));
        for constant in &self.constants {
            cmd = cmd.arg("-c").arg(constant);
        }
        if let Some(configuration) = &self.configuration {
            cmd = cmd.arg(format!("--configuration={configuration}"));
        }
        if let Some(strategy) = &self.opt_strategy {
            cmd = cmd.arg(format!("--opt-strategy={strategy}"));
        }
        cmd = cmd.args(flags);
        cmd = cmd.arg("--outf=2");
        if let Some(secs) = budget.solver_secs() {
            cmd = cmd.arg(format!("--time-limit={secs}"));
        }
        Ok(cmd.arg(format!("--models={models}")).arg("--warn=none"))
    }

    /// Run the solver and decode its answer.
    pub fn invoke<R: ProcessRunner>(
        &self,
        runner: &R,
        flags: &[String],
        models: u64,
        budget: TimeBudget,
        mode: DecodeMode,
    ) -> Result<SolverAnswer, SeedSearchError> {
        let cmd = self.command(flags, models, budget)?;
        debug!(command = %cmd.display_line(), "Starting solver");

        let started = Instant::now();
        let output = runner.run(&cmd, budget.deadline_with_grace(self.grace))?;
        let elapsed = started.elapsed();

        let killed = output.timed_out;
        if killed {
            error!(
                minutes = budget.minutes(),
                "Time out: {} min expired",
                budget.minutes()
            );
        } else {
            check_exit(&output)?;
        }

        let decoded = decode(&output.stdout_string(), mode, killed);
        if decoded.repaired {
            warn!("Solver output was truncated; keeping the fully emitted models");
        }

        Ok(SolverAnswer {
            decoded,
            killed,
            elapsed,
            memory_gb: peak_children_memory_gb(),
        })
    }
}

/// One decoded solver call.
#[derive(Debug, Clone)]
pub struct SolverAnswer {
    pub decoded: DecodedRun,
    /// Killed at the deadline; `decoded` holds what was flushed before
    pub killed: bool,
    pub elapsed: Duration,
    pub memory_gb: Option<f64>,
}

/// Map an exit status that is not a regular answer to a solver error.
pub fn check_exit(output: &ProcessOutput) -> Result<(), SolverError> {
    match output.exit_code {
        Some(code) if ANSWER_EXIT_CODES.contains(&code) => Ok(()),
        Some(code) => Err(SolverError::AbnormalExit {
            code,
            stderr_tail: output.stderr_tail(STDERR_TAIL_CHARS),
        }),
        None => Err(SolverError::Signalled {
            stderr_tail: output.stderr_tail(STDERR_TAIL_CHARS),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::StaticFacts;
    use std::cell::RefCell;
    use std::ffi::OsString;

    fn setup() -> SolverSetup {
        SolverSetup {
            backend: SolverBackend::Reasoning,
            program: vec!["clingo".to_string()],
            files: vec![Utf8PathBuf::from("instance.lp"), Utf8PathBuf::from("asp/seed-solving.lp")],
            constants: vec!["run_mode=target".to_string(), "accu=0".to_string()],
            configuration: Some("jumpy".to_string()),
            opt_strategy: None,
            grace: Duration::from_secs(60),
        }
    }

    struct CannedRunner {
        output: ProcessOutput,
        seen: RefCell<Vec<(CommandSpec, Duration)>>,
    }

    impl ProcessRunner for CannedRunner {
        fn run(&self, cmd: &CommandSpec, timeout: Duration) -> Result<ProcessOutput, RunnerError> {
            self.seen.borrow_mut().push((cmd.clone(), timeout));
            Ok(self.output.clone())
        }
    }

    fn canned(stdout: &str, exit_code: Option<i32>, timed_out: bool) -> CannedRunner {
        CannedRunner {
            output: ProcessOutput::new(stdout.as_bytes().to_vec(), b"boom".to_vec(), exit_code, timed_out),
            seen: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_command_layout() {
        let flags = vec!["--enum-mode=cautious".to_string(), "--opt-mode=enum,3".to_string()];
        let cmd = setup()
            .command(&flags, 0, TimeBudget::new(Duration::from_secs(120)))
            .unwrap();
        assert_eq!(
            cmd.display_line(),
            "clingo instance.lp asp/seed-solving.lp -c run_mode=target -c accu=0 \
             --configuration=jumpy --enum-mode=cautious --opt-mode=enum,3 --outf=2 \
             --time-limit=120 --models=0 --warn=none"
        );
    }

    #[test]
    fn test_unlimited_budget_has_no_time_limit_flag() {
        let cmd = setup().command(&[], 5, TimeBudget::unlimited()).unwrap();
        assert!(!cmd.args.iter().any(|a| a.to_string_lossy().starts_with("--time-limit")));
        assert!(cmd.args.contains(&OsString::from("--models=5")));
    }

    #[test]
    fn test_extra_file_is_appended() {
        let extended = setup().with_extra_file("work/exclusions.lp");
        assert_eq!(extended.files.last().unwrap(), "work/exclusions.lp");
        assert_eq!(setup().files.len() + 1, extended.files.len());
    }

    #[test]
    fn test_for_search_minimize_with_subseed() {
        let config = Config::builder()
            .minimize(true)
            .encoding_dir("enc")
            .build()
            .unwrap();
        let facts = StaticFacts::new("").with_subseed(true);
        let setup = SolverSetup::for_search(
            &config,
            SearchMode::Minimize,
            Utf8Path::new("tmp/instance.lp"),
            &facts,
        )
        .unwrap();
        assert_eq!(
            setup.files,
            vec![
                Utf8PathBuf::from("tmp/instance.lp"),
                Utf8PathBuf::from("enc/seed-solving.lp"),
                Utf8PathBuf::from("enc/maximize_produced_target.lp"),
                Utf8PathBuf::from("enc/minimize.lp"),
            ]
        );
        assert!(setup.constants.contains(&"subseed=1".to_string()));
    }

    #[test]
    fn test_for_search_hybrid_uses_flux_encoding() {
        let config = Config::builder().backend("hybrid").accumulation(true).build().unwrap();
        let facts = StaticFacts::new("");
        let setup = SolverSetup::for_search(
            &config,
            SearchMode::SubsetMinimal,
            Utf8Path::new("instance.lp"),
            &facts,
        )
        .unwrap();
        assert_eq!(setup.program, vec!["clingo-lpx".to_string()]);
        assert!(setup.files.iter().any(|f| f.as_str().ends_with("flux.lp")));
        assert!(setup.constants.contains(&"accu=1".to_string()));
        assert!(!setup.constants.contains(&"subseed=1".to_string()));
    }

    #[test]
    fn test_check_exit_codes() {
        for code in ANSWER_EXIT_CODES {
            assert!(check_exit(&ProcessOutput::new(Vec::new(), Vec::new(), Some(code), false)).is_ok());
        }
        let err = check_exit(&ProcessOutput::new(Vec::new(), b"parse error".to_vec(), Some(65), false))
            .unwrap_err();
        assert!(matches!(err, SolverError::AbnormalExit { code: 65, .. }));
        assert!(matches!(
            check_exit(&ProcessOutput::new(Vec::new(), Vec::new(), None, false)),
            Err(SolverError::Signalled { .. })
        ));
    }

    #[test]
    fn test_invoke_waits_budget_plus_grace() {
        let runner = canned(
            r#"{"Call": [{"Witnesses": [{"Value": ["seed(\"M_a\",\"x\")"]}]}], "Result": "SATISFIABLE"}"#,
            Some(10),
            false,
        );
        let answer = setup()
            .invoke(&runner, &[], 0, TimeBudget::new(Duration::from_secs(30)), DecodeMode::EveryModel)
            .unwrap();
        assert!(!answer.killed);
        assert_eq!(answer.decoded.models.len(), 1);
        assert_eq!(runner.seen.borrow()[0].1, Duration::from_secs(90));
    }

    #[test]
    fn test_invoke_killed_is_not_an_error() {
        let runner = canned(r#"{"Call": [{"Witnesses": [{"Value": ["seed(\"M_a\",\"x\")"]}, {"Val"#, None, true);
        let answer = setup()
            .invoke(&runner, &[], 0, TimeBudget::new(Duration::from_secs(1)), DecodeMode::EveryModel)
            .unwrap();
        assert!(answer.killed);
        assert_eq!(answer.decoded.models.len(), 1);
    }

    #[test]
    fn test_invoke_abnormal_exit_is_solver_error() {
        let runner = canned("", Some(65), false);
        let err = setup()
            .invoke(&runner, &[], 0, TimeBudget::unlimited(), DecodeMode::EveryModel)
            .unwrap_err();
        assert!(matches!(err, SeedSearchError::Solver(SolverError::AbnormalExit { code: 65, .. })));
    }
}
