//! In-process worker: the job runs on a helper thread
//!
//! Used for oracles that live in the same process. A thread cannot be killed,
//! so an expired job is abandoned: it keeps running detached while the caller
//! recovers from the side log. Everything it writes after that is ignored.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::warn;

use seedsearch_runner::NativeRunner;
use seedsearch_utils::error::{SeedSearchError, WorkerError};

use super::{WorkerJob, WorkerLauncher, WorkerOutcome, WorkerReport, run_job_with};
use crate::oracle::FeasibilityOracle;

pub type JobFn = dyn Fn(&WorkerJob) -> Result<WorkerReport, SeedSearchError> + Send + Sync;

#[derive(Clone)]
pub struct ThreadWorker {
    job_fn: Arc<JobFn>,
}

impl std::fmt::Debug for ThreadWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadWorker").finish_non_exhaustive()
    }
}

impl ThreadWorker {
    pub fn new<F>(job_fn: F) -> Self
    where
        F: Fn(&WorkerJob) -> Result<WorkerReport, SeedSearchError> + Send + Sync + 'static,
    {
        Self {
            job_fn: Arc::new(job_fn),
        }
    }

    /// Run jobs against a fresh oracle from `make_oracle`, solving with
    /// [`NativeRunner`].
    pub fn with_oracle<F, O>(make_oracle: F) -> Self
    where
        F: Fn() -> O + Send + Sync + 'static,
        O: FeasibilityOracle,
    {
        Self::new(move |job| {
            let mut oracle = make_oracle();
            run_job_with(job, &NativeRunner::inheriting_group(), &mut oracle)
        })
    }
}

impl WorkerLauncher for ThreadWorker {
    fn launch(&self, job: &WorkerJob, deadline: Duration) -> WorkerOutcome {
        let (tx, rx) = mpsc::channel();
        let job_fn = Arc::clone(&self.job_fn);
        let job = job.clone();

        let spawned = thread::Builder::new()
            .name(format!("worker-{}", job.strategy))
            .spawn(move || {
                let _ = tx.send(job_fn(&job));
            });
        if let Err(err) = spawned {
            return WorkerOutcome::Failed(WorkerError::LaunchFailed {
                reason: err.to_string(),
            });
        }

        let received = if deadline == Duration::MAX {
            rx.recv().map_err(|_| mpsc::RecvTimeoutError::Disconnected)
        } else {
            rx.recv_timeout(deadline)
        };

        match received {
            Ok(Ok(report)) => WorkerOutcome::Completed(report),
            Ok(Err(err)) => WorkerOutcome::Failed(WorkerError::AbnormalExit {
                status: "error".to_string(),
                stderr_tail: err.to_string(),
            }),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!(
                    timeout_secs = deadline.as_secs(),
                    "Worker thread missed its deadline, abandoning it"
                );
                WorkerOutcome::Expired
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                WorkerOutcome::Failed(WorkerError::Disconnected)
            }
        }
    }
}
