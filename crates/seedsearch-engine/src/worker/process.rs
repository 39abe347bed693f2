//! Out-of-process worker: the current binary re-executed as `worker --job`

use camino::Utf8Path;
use std::ffi::OsString;
use std::time::Duration;
use tracing::{debug, warn};

use seedsearch_runner::{CommandSpec, NativeRunner, ProcessRunner};
use seedsearch_utils::atomic_write::write_file_atomic;
use seedsearch_utils::error::WorkerError;

use super::{WorkerJob, WorkerLauncher, WorkerOutcome, WorkerReport};

const JOB_FILE: &str = "worker-job.json";

/// Launches each job as a child process in its own process group.
///
/// The job travels as a JSON file; the report comes back as the last line of
/// the child's stdout. On expiry the whole group is killed, solver and oracle
/// included.
#[derive(Debug, Clone)]
pub struct ProcessWorker<R = NativeRunner> {
    program: OsString,
    runner: R,
}

impl ProcessWorker<NativeRunner> {
    /// Worker re-executing the running binary.
    pub fn current_exe() -> Result<Self, WorkerError> {
        let program = std::env::current_exe().map_err(|e| WorkerError::LaunchFailed {
            reason: format!("cannot locate the current executable: {e}"),
        })?;
        Ok(Self::new(program, NativeRunner::new()))
    }
}

impl<R: ProcessRunner> ProcessWorker<R> {
    #[must_use]
    pub fn new(program: impl Into<OsString>, runner: R) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    fn command(&self, job_path: &Utf8Path) -> CommandSpec {
        CommandSpec::new(self.program.clone())
            .arg("worker")
            .arg("--job")
            .arg(job_path.as_str())
    }
}

/// Parse the report from the worker's stdout.
fn parse_report(stdout: &str) -> Result<WorkerReport, WorkerError> {
    let line = stdout
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .ok_or_else(|| WorkerError::InvalidReport {
            reason: "worker printed nothing".to_string(),
        })?;
    serde_json::from_str(line).map_err(|e| WorkerError::InvalidReport {
        reason: e.to_string(),
    })
}

impl<R: ProcessRunner> WorkerLauncher for ProcessWorker<R> {
    fn launch(&self, job: &WorkerJob, deadline: Duration) -> WorkerOutcome {
        let job_path = job.work_dir.join(JOB_FILE);
        let encoded = match serde_json::to_string_pretty(job) {
            Ok(encoded) => encoded,
            Err(e) => {
                return WorkerOutcome::Failed(WorkerError::LaunchFailed {
                    reason: format!("cannot encode job: {e}"),
                });
            }
        };
        if let Err(e) = write_file_atomic(&job_path, &encoded) {
            return WorkerOutcome::Failed(WorkerError::LaunchFailed {
                reason: format!("{e:#}"),
            });
        }

        let cmd = self.command(&job_path);
        debug!(command = %cmd.display_line(), "Launching worker");

        let output = match self.runner.run(&cmd, deadline) {
            Ok(output) => output,
            Err(e) => {
                return WorkerOutcome::Failed(WorkerError::LaunchFailed {
                    reason: e.to_string(),
                });
            }
        };

        if output.timed_out {
            warn!(label = %job.label, "Worker killed at its deadline");
            return WorkerOutcome::Expired;
        }
        if !output.success() {
            let status = output
                .exit_code
                .map_or_else(|| "signal".to_string(), |code| format!("exit code {code}"));
            return WorkerOutcome::Failed(WorkerError::AbnormalExit {
                status,
                stderr_tail: output.stderr_tail(2_000),
            });
        }

        match parse_report(&output.stdout_string()) {
            Ok(report) => WorkerOutcome::Completed(report),
            Err(e) => WorkerOutcome::Failed(e),
        }
    }
}
