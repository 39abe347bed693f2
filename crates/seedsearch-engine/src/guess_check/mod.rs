//! Guess-and-validate: solver candidates confirmed by a feasibility oracle
//!
//! Each iteration asks for one candidate under the exclusions built so far,
//! checks it with the oracle, then excludes it. Rejected candidates are
//! excluded with all their supersets, assuming infeasibility is monotone
//! under seed-set inclusion. Accepted ones are logged to the side log before
//! the loop continues, so a killed worker loses nothing it reported.

mod candidate;
mod diversity;
mod exclusion;

pub use candidate::{CandidateAnswer, CandidateSolver, ProcessCandidateSolver};
pub use diversity::Diversity;
pub use exclusion::{Exclusion, ExclusionState};

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use seedsearch_utils::error::SeedSearchError;

use crate::oracle::FeasibilityOracle;
use crate::request::{SolutionLimit, TimeBudget};
use crate::solution::{OptimumDecomposition, Solution};
use crate::worker::side_log::SideLog;

/// Rejections between two checkpoints in the side log.
pub const CHECKPOINT_EVERY: u64 = 100;

const OPTIMUM_NAME: &str = "model_one_solution";

/// How a loop is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessCheckSettings {
    /// Stop at the first accepted candidate, which defines the optimum
    pub optimum: bool,
    /// Accepted sets exclude only themselves; otherwise their supersets too
    pub exact_acceptance: bool,
    pub limit: SolutionLimit,
    pub budget: TimeBudget,
    pub diversity: bool,
    pub diversity_seed: Option<u64>,
}

/// Outcome of one loop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoopReport {
    pub solutions: Vec<Solution>,
    pub rejected: u64,
    pub grounding_secs: f64,
    pub solving_secs: f64,
    pub optimum: Option<OptimumDecomposition>,
    /// The solver ran out of candidates
    pub unsatisfiable: bool,
    /// Stopped because the budget was used up
    pub timed_out: bool,
}

fn record(side_log: Option<&SideLog>, solution: &Solution, rejected: u64) {
    if let Some(log) = side_log
        && let Err(err) = log.record_accepted(solution, rejected)
    {
        warn!(error = %format!("{err:#}"), "Accepted solution not logged");
    }
}

fn checkpoint(side_log: Option<&SideLog>, rejected: u64) {
    if let Some(log) = side_log
        && let Err(err) = log.checkpoint(rejected)
    {
        warn!(error = %format!("{err:#}"), "Rejection checkpoint not logged");
    }
}

/// Run the loop until the limit, unsatisfiability or the budget stops it.
pub fn run_guess_check<S, O>(
    solver: &mut S,
    oracle: &mut O,
    settings: &GuessCheckSettings,
    side_log: Option<&SideLog>,
) -> Result<LoopReport, SeedSearchError>
where
    S: CandidateSolver + ?Sized,
    O: FeasibilityOracle + ?Sized,
{
    let started = Instant::now();
    let mut exclusions = ExclusionState::new();
    let mut diversity = settings
        .diversity
        .then(|| Diversity::new(settings.diversity_seed));
    let mut report = LoopReport::default();

    loop {
        if !settings.optimum && settings.limit.reached(report.solutions.len()) {
            break;
        }
        let spent = started.elapsed();
        if settings.budget.exhausted_by(spent) {
            report.timed_out = true;
            break;
        }

        let answer = solver.next_candidate(
            &exclusions,
            diversity.as_ref(),
            settings.budget.remaining_after(spent),
        )?;
        report.grounding_secs += answer.grounding_secs;
        report.solving_secs += answer.solving_secs;

        if answer.killed {
            report.timed_out = true;
            break;
        }
        let Some(candidate) = answer.candidate else {
            report.unsatisfiable = true;
            if report.solutions.is_empty() {
                info!("Unsatisfiable problem");
            }
            break;
        };

        if settings.optimum && candidate.seeds.is_empty() {
            let optimum = OptimumDecomposition::from_costs(&candidate.costs);
            info!(size = 0, "Optimum found");
            let solution = candidate.into_solution(OPTIMUM_NAME);
            record(side_log, &solution, report.rejected);
            report.solutions.push(solution);
            report.optimum = Some(optimum);
            break;
        }

        let size = candidate.seeds.len();
        let verdict = oracle.check(&candidate.seeds);

        if verdict.ok {
            debug!(size, flux = verdict.flux, "Candidate accepted");
            let seeds = candidate.seeds.clone();

            if settings.optimum {
                let solution = candidate.into_solution(OPTIMUM_NAME).with_flux(verdict.flux);
                let optimum = OptimumDecomposition::from_costs(&solution.costs);
                info!("Optimum found");
                if let Some(produced) = optimum.produced_targets {
                    info!("Number of producible targets: {}", -produced);
                }
                info!(size = optimum.size, "Minimal size of seed set is {}", optimum.size);
                record(side_log, &solution, report.rejected);
                report.solutions.push(solution);
                report.optimum = Some(optimum);
                break;
            }

            let index = report.solutions.len() + 1;
            let solution = candidate
                .into_solution(format!("model_{index}"))
                .with_flux(verdict.flux);
            info!(
                size,
                "Answer: {index} ({size} seeds)\n{}",
                seeds.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
            );
            record(side_log, &solution, report.rejected);
            report.solutions.push(solution);

            if settings.exact_acceptance {
                exclusions.exclude_exact(&seeds);
            } else {
                exclusions.exclude_with_supersets(&seeds);
            }
            if let Some(diversity) = diversity.as_mut() {
                diversity.update(&seeds);
            }
        } else {
            debug!(size, flux = verdict.flux, "Candidate rejected");
            report.rejected += 1;
            if let Some(diversity) = diversity.as_mut() {
                diversity.update(&candidate.seeds);
            }
            exclusions.exclude_with_supersets(&candidate.seeds);
            if report.rejected % CHECKPOINT_EVERY == 0 {
                checkpoint(side_log, report.rejected);
            }
        }
    }

    if report.rejected > 0 {
        info!(rejected = report.rejected, "Rejected solution during process: {}", report.rejected);
    }
    Ok(report)
}
