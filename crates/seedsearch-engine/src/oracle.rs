//! Numeric feasibility check of candidate seed sets
//!
//! The oracle answers whether a seed set lets the objective reaction carry a
//! flux of at least epsilon. Every failure, numeric or operational, is an
//! infeasible verdict; the loop never sees an error from here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, warn};

use seedsearch_runner::{CommandSpec, ProcessRunner};

/// Answer of one feasibility check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub ok: bool,
    pub flux: f64,
}

impl Verdict {
    #[must_use]
    pub const fn feasible(flux: f64) -> Self {
        Self { ok: true, flux }
    }

    #[must_use]
    pub const fn infeasible() -> Self {
        Self { ok: false, flux: 0.0 }
    }
}

pub trait FeasibilityOracle {
    fn check(&mut self, seeds: &BTreeSet<String>) -> Verdict;
}

impl<F> FeasibilityOracle for F
where
    F: FnMut(&BTreeSet<String>) -> Verdict,
{
    fn check(&mut self, seeds: &BTreeSet<String>) -> Verdict {
        self(seeds)
    }
}

/// Oracle backed by an external command.
///
/// Seeds are appended as trailing arguments; the command prints a JSON line
/// `{"ok": bool, "flux": number}`. The last such line on stdout is the answer.
#[derive(Debug, Clone)]
pub struct CommandOracle<R> {
    argv: Vec<String>,
    timeout: Duration,
    epsilon: f64,
    runner: R,
}

impl<R: ProcessRunner> CommandOracle<R> {
    #[must_use]
    pub fn new(argv: Vec<String>, timeout: Duration, epsilon: f64, runner: R) -> Self {
        Self {
            argv,
            timeout,
            epsilon,
            runner,
        }
    }

    fn ask(&self, seeds: &BTreeSet<String>) -> Result<Verdict, String> {
        let cmd = CommandSpec::from_argv(&self.argv)
            .ok_or_else(|| "oracle command is empty".to_string())?
            .args(seeds);

        let output = self
            .runner
            .run(&cmd, self.timeout)
            .map_err(|e| e.to_string())?;
        if output.timed_out {
            return Err(format!("no answer within {}s", self.timeout.as_secs()));
        }
        if output.exit_code != Some(0) {
            return Err(format!(
                "exit code {:?}: {}",
                output.exit_code,
                output.stderr_tail(500)
            ));
        }

        let stdout = output.stdout_string();
        stdout
            .lines()
            .rev()
            .find_map(|line| serde_json::from_str::<Verdict>(line.trim()).ok())
            .ok_or_else(|| "no verdict line on stdout".to_string())
    }
}

impl<R: ProcessRunner> FeasibilityOracle for CommandOracle<R> {
    fn check(&mut self, seeds: &BTreeSet<String>) -> Verdict {
        match self.ask(seeds) {
            Ok(verdict) => {
                let ok = verdict.ok && verdict.flux.is_finite() && verdict.flux >= self.epsilon;
                debug!(size = seeds.len(), flux = verdict.flux, ok, "Feasibility checked");
                Verdict { ok, flux: verdict.flux }
            }
            Err(reason) => {
                warn!(size = seeds.len(), reason = %reason, "Feasibility check failed, rejecting candidate");
                Verdict::infeasible()
            }
        }
    }
}
