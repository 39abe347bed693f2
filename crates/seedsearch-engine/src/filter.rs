//! Filter strategy: validate solver models after the fact
//!
//! Unlike guess-and-validate, verdicts are not fed back to the solver. Every
//! model of one solver run is checked in order until the limit is met.

use tracing::{debug, info, warn};

use crate::decoder::{DecodedRun, SolveOutcome};
use crate::guess_check::{CHECKPOINT_EVERY, LoopReport};
use crate::oracle::FeasibilityOracle;
use crate::request::SolutionLimit;
use crate::solution::OptimumDecomposition;
use crate::worker::side_log::SideLog;

/// Validate the models of `decoded`.
///
/// In optimum mode only the last model counts; it is kept with its flux
/// whatever the verdict. It becomes the optimum for later queries only when
/// the solver proved optimality.
pub fn run_filter<O>(
    decoded: DecodedRun,
    oracle: &mut O,
    optimum: bool,
    limit: SolutionLimit,
    side_log: Option<&SideLog>,
) -> LoopReport
where
    O: FeasibilityOracle + ?Sized,
{
    let mut report = LoopReport {
        grounding_secs: decoded.grounding_secs.unwrap_or(0.0),
        solving_secs: decoded.solving_secs.unwrap_or(0.0),
        unsatisfiable: decoded.outcome.is_unsatisfiable() || decoded.models.is_empty(),
        ..LoopReport::default()
    };

    if report.unsatisfiable {
        info!("Unsatisfiable problem");
        return report;
    }

    let log = |report: &LoopReport| {
        if let (Some(log), Some(last)) = (side_log, report.solutions.last())
            && let Err(err) = log.record_accepted(last, report.rejected)
        {
            warn!(error = %format!("{err:#}"), "Accepted solution not logged");
        }
    };

    if optimum {
        let proven = decoded.outcome == SolveOutcome::OptimumFound;
        if let Some(model) = decoded.models.into_iter().last() {
            let verdict = oracle.check(&model.seeds);
            if proven {
                let found = OptimumDecomposition::from_costs(&model.costs);
                info!("Optimum found");
                info!(size = found.size, "Minimal size of seed set is {}", found.size);
                report.optimum = Some(found);
            } else {
                info!(outcome = ?decoded.outcome, "Optimum not found");
            }
            if !verdict.ok {
                debug!(flux = verdict.flux, "Optimum kept despite failing the flux check");
            }
            report
                .solutions
                .push(model.into_solution("model_one_solution").with_flux(verdict.flux));
            log(&report);
        }
        return report;
    }

    for model in decoded.models {
        if limit.reached(report.solutions.len()) {
            break;
        }
        let size = model.seeds.len();
        let verdict = oracle.check(&model.seeds);
        if verdict.ok {
            let index = report.solutions.len() + 1;
            info!(size, "Answer: {index} ({size} seeds)");
            report
                .solutions
                .push(model.into_solution(format!("model_{index}")).with_flux(verdict.flux));
            log(&report);
        } else {
            debug!(size, "Model rejected");
            report.rejected += 1;
            if report.rejected % CHECKPOINT_EVERY == 0
                && let Some(side_log) = side_log
                && let Err(err) = side_log.checkpoint(report.rejected)
            {
                warn!(error = %format!("{err:#}"), "Rejection checkpoint not logged");
            }
        }
    }

    if report.rejected > 0 {
        info!(rejected = report.rejected, "Rejected solution during process: {}", report.rejected);
    }
    report
}
