//! Isolated execution of validated searches under a wall-clock deadline
//!
//! A [`WorkerJob`] describes one filter or guess-and-validate run completely,
//! so it can cross a process boundary as JSON. A [`WorkerLauncher`] runs it
//! and waits for the one-shot [`WorkerReport`] until the deadline; past it,
//! the caller recovers what the job committed to its [`SideLog`].

mod process;
pub mod side_log;
mod thread;

pub use process::ProcessWorker;
pub use side_log::{Recovered, SideLog};
pub use thread::{JobFn, ThreadWorker};

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use seedsearch_runner::{NativeRunner, ProcessRunner, peak_children_memory_gb};
use seedsearch_utils::error::{ConfigError, SeedSearchError, WorkerError};
use seedsearch_utils::types::SolveStrategy;

use crate::filter::run_filter;
use crate::guess_check::{GuessCheckSettings, LoopReport, ProcessCandidateSolver, run_guess_check};
use crate::oracle::{CommandOracle, FeasibilityOracle};
use crate::query::DecodeMode;
use crate::solver::SolverSetup;

/// External oracle command, as configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleSpec {
    pub argv: Vec<String>,
    pub timeout: Duration,
    pub epsilon: f64,
}

/// One validated sub-search, self-contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerJob {
    pub label: String,
    pub strategy: SolveStrategy,
    pub setup: SolverSetup,
    pub flags: Vec<String>,
    pub settings: GuessCheckSettings,
    pub oracle: Option<OracleSpec>,
    pub side_log: Utf8PathBuf,
    /// Scratch directory for exclusion programs
    pub work_dir: Utf8PathBuf,
}

/// What a worker sends back when it finishes in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerReport {
    pub outcome: LoopReport,
    pub memory_gb: Option<f64>,
}

/// How a launched job ended.
#[derive(Debug)]
pub enum WorkerOutcome {
    Completed(WorkerReport),
    /// Deadline passed; the worker was terminated or abandoned
    Expired,
    Failed(WorkerError),
}

pub trait WorkerLauncher {
    fn launch(&self, job: &WorkerJob, deadline: Duration) -> WorkerOutcome;
}

impl<T: WorkerLauncher + ?Sized> WorkerLauncher for &T {
    fn launch(&self, job: &WorkerJob, deadline: Duration) -> WorkerOutcome {
        (**self).launch(job, deadline)
    }
}

/// Execute a job with its configured oracle command.
///
/// This is the body of the hidden `worker` subcommand. Child processes stay in
/// the worker's process group so that killing the worker reaches them.
pub fn run_job(job: &WorkerJob) -> Result<WorkerReport, SeedSearchError> {
    let spec = job.oracle.as_ref().ok_or_else(|| {
        SeedSearchError::Config(ConfigError::MissingRequired("oracle.command".to_string()))
    })?;
    let runner = NativeRunner::inheriting_group();
    let mut oracle = CommandOracle::new(spec.argv.clone(), spec.timeout, spec.epsilon, runner);
    run_job_with(job, &runner, &mut oracle)
}

/// Execute a job with the given runner and oracle.
pub fn run_job_with<R, O>(
    job: &WorkerJob,
    runner: &R,
    oracle: &mut O,
) -> Result<WorkerReport, SeedSearchError>
where
    R: ProcessRunner,
    O: FeasibilityOracle + ?Sized,
{
    let side_log = SideLog::new(job.side_log.clone());
    debug!(label = %job.label, strategy = %job.strategy, "Worker started");

    let outcome = match job.strategy {
        SolveStrategy::Filter => {
            let mode = if job.settings.optimum {
                DecodeMode::LastModel
            } else {
                DecodeMode::EveryModel
            };
            let answer = job
                .setup
                .invoke(runner, &job.flags, 0, job.settings.budget, mode)?;
            let mut report = run_filter(
                answer.decoded,
                oracle,
                job.settings.optimum,
                job.settings.limit,
                Some(&side_log),
            );
            report.timed_out = answer.killed;
            report
        }
        SolveStrategy::GuessCheck | SolveStrategy::GuessCheckDiversity => {
            let mut solver = ProcessCandidateSolver::new(
                job.setup.clone(),
                job.flags.clone(),
                job.settings.optimum,
                job.work_dir.join("guess_check.lp"),
                runner,
            );
            run_guess_check(&mut solver, oracle, &job.settings, Some(&side_log))?
        }
        SolveStrategy::Classic => {
            return Err(WorkerError::LaunchFailed {
                reason: "the classic strategy runs without a worker".to_string(),
            }
            .into());
        }
    };

    info!(
        label = %job.label,
        solutions = outcome.solutions.len(),
        rejected = outcome.rejected,
        "Worker finished"
    );
    Ok(WorkerReport {
        outcome,
        memory_gb: peak_children_memory_gb(),
    })
}
