//! Building `SearchOutput` entries from the different ways a sub-search ends

use std::collections::BTreeSet;
use tracing::info;

use seedsearch_utils::types::SearchType;

use crate::decoder::SolveOutcome;
use crate::query::QueryProfile;
use crate::request::SearchRequest;
use crate::solution::{OptimumDecomposition, SearchOutput, Solution, Timer};
use crate::solver::SolverAnswer;
use crate::worker::{Recovered, WorkerReport};

/// Entry for a plain solver call.
pub(super) fn from_answer(
    answer: SolverAnswer,
    profile: &QueryProfile,
    request: &SearchRequest,
) -> SearchOutput {
    let decoded = answer.decoded;
    let timer = if answer.killed {
        Timer::timed_out()
    } else {
        Timer::from_secs(
            decoded.grounding_secs.unwrap_or(0.0),
            decoded.solving_secs.unwrap_or(0.0),
        )
    };
    let mut output = SearchOutput::new(timer);
    output.memory_peak_gb = answer.memory_gb;
    output.killed = answer.killed;

    if decoded.outcome.is_unsatisfiable() || decoded.models.is_empty() {
        info!("Unsatisfiable problem");
        return output;
    }

    // Only a proven optimum bounds later queries
    if request.seeks_optimum() {
        match decoded.models.last() {
            Some(last) if decoded.outcome == SolveOutcome::OptimumFound && !answer.killed => {
                let optimum = OptimumDecomposition::from_costs(&last.costs);
                info!("Optimum found");
                info!(size = optimum.size, "Minimal size of seed set is {}", optimum.size);
                output.optimum = Some(optimum);
            }
            _ => info!(outcome = ?decoded.outcome, "Optimum not found"),
        }
    }

    let enumerating = request.search_type == SearchType::Enumeration;
    for (index, model) in decoded.models.into_iter().enumerate() {
        if enumerating {
            info!(size = model.seeds.len(), "Answer: {} ({} seeds)", index + 1, model.seeds.len());
        }
        output.solutions.push(model.into_solution(profile.solution_name(index + 1)));
    }
    output
}

/// Entry for a validated run that reported back in time.
pub(super) fn from_report(report: WorkerReport) -> SearchOutput {
    let outcome = report.outcome;
    let timer = if outcome.timed_out {
        Timer::timed_out()
    } else {
        Timer::from_secs(outcome.grounding_secs, outcome.solving_secs)
    };
    SearchOutput {
        memory_peak_gb: report.memory_gb,
        solutions: outcome.solutions,
        rejected: Some(outcome.rejected),
        killed: outcome.timed_out,
        optimum: outcome.optimum,
        ..SearchOutput::new(timer)
    }
}

/// Entry rebuilt from a side log after the worker was lost.
pub(super) fn from_recovered(recovered: Recovered, timer: Timer, seeks_optimum: bool) -> SearchOutput {
    let optimum = if seeks_optimum {
        recovered
            .solutions
            .first()
            .map(|solution| OptimumDecomposition::from_costs(&solution.costs))
    } else {
        None
    };
    SearchOutput {
        solutions: recovered.solutions,
        rejected: Some(recovered.rejected),
        optimum,
        ..SearchOutput::new(timer)
    }
}

/// Intersection or union of the validated enumeration in `enumeration`.
pub(super) fn consensus(
    enumeration: &SearchOutput,
    search_type: SearchType,
    profile: &QueryProfile,
) -> SearchOutput {
    let mut output = SearchOutput::new(enumeration.timer);
    output.killed = enumeration.killed;
    output.rejected = enumeration.rejected;

    let mut sets = enumeration.solutions.iter().map(|solution| &solution.seeds);
    let Some(first) = sets.next() else {
        return output;
    };
    let seeds: BTreeSet<String> = match search_type {
        SearchType::Union => sets.fold(first.clone(), |acc, seeds| &acc | seeds),
        _ => sets.fold(first.clone(), |acc, seeds| &acc & seeds),
    };
    output.solutions.push(Solution::new(profile.solution_name(1), seeds));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::{DecodedModel, DecodedRun};
    use crate::query::query_profile;
    use crate::request::{SolutionLimit, TimeBudget};
    use crate::solution::TimerValue;
    use seedsearch_utils::types::{RunMode, SearchMode};
    use std::time::Duration;

    fn seeds(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| (*n).to_string()).collect()
    }

    fn request(mode: SearchMode, search_type: SearchType) -> SearchRequest {
        SearchRequest::new(
            RunMode::Target,
            mode,
            search_type,
            SolutionLimit::Unlimited,
            TimeBudget::unlimited(),
        )
    }

    fn answer(models: Vec<DecodedModel>, killed: bool) -> SolverAnswer {
        SolverAnswer {
            decoded: DecodedRun {
                outcome: SolveOutcome::OptimumFound,
                models,
                grounding_secs: Some(0.25),
                solving_secs: Some(1.0),
                repaired: false,
            },
            killed,
            elapsed: Duration::from_secs(1),
            memory_gb: Some(0.5),
        }
    }

    #[test]
    fn test_optimum_answer_sets_decomposition() {
        let model = DecodedModel {
            seeds: seeds(&["A", "B"]),
            costs: vec![-3, 2],
            ..DecodedModel::default()
        };
        let request = request(SearchMode::Minimize, SearchType::OneModel);
        let profile = query_profile(SearchMode::Minimize, SearchType::OneModel).unwrap();
        let output = from_answer(answer(vec![model], false), &profile, &request);

        let optimum = output.optimum.as_ref().unwrap();
        assert_eq!(optimum.produced_targets, Some(-3));
        assert_eq!(optimum.size, 2);
        assert!(output.solution("model_one_solution").is_some());
        assert_eq!(output.timer.solving_time, TimerValue::Seconds(1.0));
        assert_eq!(output.memory_peak_gb, Some(0.5));
    }

    #[test]
    fn test_unproven_optimum_is_not_an_optimum() {
        let model = DecodedModel {
            seeds: seeds(&["A", "B", "C"]),
            costs: vec![3],
            ..DecodedModel::default()
        };
        let request = request(SearchMode::Minimize, SearchType::OneModel);
        let profile = query_profile(SearchMode::Minimize, SearchType::OneModel).unwrap();
        let mut satisfiable = answer(vec![model.clone()], false);
        satisfiable.decoded.outcome = SolveOutcome::Satisfiable;

        let output = from_answer(satisfiable, &profile, &request);
        assert!(output.optimum.is_none());
        assert_eq!(output.solutions.len(), 1);

        let output = from_answer(answer(vec![model], true), &profile, &request);
        assert!(output.killed);
        assert!(output.optimum.is_none());
    }

    #[test]
    fn test_killed_answer_reports_time_out() {
        let model = DecodedModel {
            seeds: seeds(&["A"]),
            ..DecodedModel::default()
        };
        let request = request(SearchMode::SubsetMinimal, SearchType::Enumeration);
        let profile = query_profile(SearchMode::SubsetMinimal, SearchType::Enumeration).unwrap();
        let output = from_answer(answer(vec![model], true), &profile, &request);
        assert!(output.killed);
        assert!(output.timer.grounding_time.is_timed_out());
        assert_eq!(output.solutions[0].identifier, "model_1");
    }

    #[test]
    fn test_consensus_of_validated_sets() {
        let mut enumeration = SearchOutput::new(Timer::from_secs(0.1, 0.2));
        enumeration.solutions = vec![
            Solution::new("model_1", seeds(&["A", "B"])),
            Solution::new("model_2", seeds(&["A", "C"])),
        ];
        enumeration.rejected = Some(3);

        let inter = query_profile(SearchMode::Minimize, SearchType::Intersection).unwrap();
        let output = consensus(&enumeration, SearchType::Intersection, &inter);
        assert_eq!(output.solutions[0].identifier, "model_intersection");
        assert_eq!(output.solutions[0].seeds, seeds(&["A"]));
        assert_eq!(output.rejected, Some(3));

        let union = query_profile(SearchMode::Minimize, SearchType::Union).unwrap();
        let output = consensus(&enumeration, SearchType::Union, &union);
        assert_eq!(output.solutions[0].seeds, seeds(&["A", "B", "C"]));
    }

    #[test]
    fn test_consensus_of_nothing_is_empty() {
        let enumeration = SearchOutput::new(Timer::from_secs(0.0, 0.0));
        let inter = query_profile(SearchMode::SubsetMinimal, SearchType::Intersection).unwrap();
        assert!(consensus(&enumeration, SearchType::Intersection, &inter).is_empty());
    }
}
