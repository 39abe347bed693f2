//! End-to-end scenarios for the search orchestrator
//!
//! The solver is replaced by a scripted `ProcessRunner` and validated
//! strategies run on a `ThreadWorker`, so no clingo installation is needed.

use camino::Utf8PathBuf;
use std::cell::Cell;
use std::collections::BTreeSet;
use std::time::Duration;
use tempfile::TempDir;

use seedsearch::{
    CommandSpec, Config, ConfigBuilder, LoopReport, Orchestrator, Phase, ProcessOutput,
    ProcessRunner, RunnerError, Solution, StaticFacts, ThreadWorker, Timer, Verdict, WorkerJob,
    WorkerReport,
};
use seedsearch_engine::DecodedModel;
use seedsearch_engine::guess_check::{
    CandidateAnswer, CandidateSolver, Diversity, ExclusionState, run_guess_check,
};
use seedsearch_engine::worker::SideLog;
use seedsearch_engine::TimeBudget;
use seedsearch_utils::SeedSearchError;

// ============================================================================
// Test doubles
// ============================================================================

/// Clingo stand-in answering every call with the same output.
struct CannedSolver {
    stdout: String,
    exit_code: i32,
    calls: Cell<usize>,
}

impl CannedSolver {
    fn new(stdout: &str, exit_code: i32) -> Self {
        Self {
            stdout: stdout.to_string(),
            exit_code,
            calls: Cell::new(0),
        }
    }
}

impl ProcessRunner for CannedSolver {
    fn run(&self, _cmd: &CommandSpec, _timeout: Duration) -> Result<ProcessOutput, RunnerError> {
        self.calls.set(self.calls.get() + 1);
        Ok(ProcessOutput::new(
            self.stdout.clone().into_bytes(),
            Vec::new(),
            Some(self.exit_code),
            false,
        ))
    }
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

/// Toy network with exactly three minimal seed sets: {A}, {B, C} and {D}.
fn flux_check(seeds: &BTreeSet<String>) -> Verdict {
    let minimal = [set(&["A"]), set(&["B", "C"]), set(&["D"])];
    if minimal.iter().any(|m| m.is_subset(seeds)) {
        Verdict::feasible(2.5)
    } else {
        Verdict::infeasible()
    }
}

/// Brute-force candidate generator over the toy network.
///
/// `E` reaches every target logically but carries no flux, so the solver
/// proposes it and the oracle has to reject it.
struct ToyNetwork;

impl CandidateSolver for ToyNetwork {
    fn next_candidate(
        &mut self,
        exclusions: &ExclusionState,
        _diversity: Option<&Diversity>,
        _budget: TimeBudget,
    ) -> Result<CandidateAnswer, SeedSearchError> {
        let universe = ["A", "B", "C", "D", "E"];
        let mut subsets: Vec<BTreeSet<String>> = (1u32..(1 << universe.len()))
            .map(|mask| {
                (0..universe.len())
                    .filter(|i| mask & (1 << i) != 0)
                    .map(|i| universe[i].to_string())
                    .collect()
            })
            .filter(|s: &BTreeSet<String>| flux_check(s).ok || s.contains("E"))
            .collect();
        subsets.sort_by_key(BTreeSet::len);

        Ok(match subsets.into_iter().find(|s| !exclusions.excludes(s)) {
            Some(seeds) => CandidateAnswer::found(DecodedModel {
                costs: vec![seeds.len() as i64],
                seeds,
                ..DecodedModel::default()
            }),
            None => CandidateAnswer::exhausted(),
        })
    }
}

fn toy_worker() -> ThreadWorker {
    ThreadWorker::new(|job: &WorkerJob| {
        let side_log = SideLog::new(job.side_log.clone());
        let mut oracle = flux_check;
        let outcome = run_guess_check(&mut ToyNetwork, &mut oracle, &job.settings, Some(&side_log))?;
        Ok(WorkerReport {
            outcome,
            memory_gb: None,
        })
    })
}

fn config(dir: &TempDir) -> ConfigBuilder {
    Config::builder().temp_dir(Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap())
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_minimize_one_model_on_unsatisfiable_network() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).subset_minimal(false).minimize(true).build().unwrap();
    let facts = StaticFacts::new("target(\"M_x\").");
    let solver = CannedSolver::new(
        r#"{"Solver": "clingo", "Call": [{"Witnesses": []}], "Result": "UNSATISFIABLE", "Time": {"Total": 0.01, "Solve": 0.0}}"#,
        20,
    );

    let mut orchestrator = Orchestrator::new(&config, &facts, &solver, ThreadWorker::new(|_| {
        unreachable!("classic strategy never launches a worker")
    }));
    let report = orchestrator.run().unwrap();

    let optimum = report.get("MINIMIZE OPTIMUM").unwrap();
    assert!(optimum.optimum.is_none());
    assert!(optimum.solutions.is_empty());
    assert!(!optimum.killed);
    assert_eq!(solver.calls.get(), 1);
    assert_eq!(orchestrator.phase(), Phase::Done);
}

#[test]
fn test_subset_minimal_guess_check_finds_the_three_minimal_sets() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir)
        .strategy("guess-check")
        .solution_limit(0)
        .build()
        .unwrap();
    let facts = StaticFacts::new("");
    let solver = CannedSolver::new("", 0);

    let report = Orchestrator::new(&config, &facts, &solver, toy_worker()).run().unwrap();
    let entry = report.get("SUBSET MINIMAL ENUMERATION GUESS-CHECK").unwrap();

    let found: Vec<&BTreeSet<String>> = entry.solutions.iter().map(|s| &s.seeds).collect();
    assert_eq!(found.len(), 3);
    for expected in [set(&["A"]), set(&["B", "C"]), set(&["D"])] {
        assert!(found.contains(&&expected), "missing {expected:?}");
    }
    for a in &found {
        for b in &found {
            assert!(a == b || !a.is_subset(b), "{a:?} is contained in {b:?}");
        }
    }
    assert!(entry.solutions.iter().all(|s| s.flux == Some(2.5)));
    assert_eq!(entry.rejected, Some(1));
    assert!(!entry.killed);
    assert_eq!(solver.calls.get(), 0);
}

#[test]
fn test_minimize_guess_check_optimum_then_enumeration() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir)
        .subset_minimal(false)
        .minimize(true)
        .intersection(true)
        .union(true)
        .strategy("guess-check")
        .solution_limit(0)
        .build()
        .unwrap();
    let facts = StaticFacts::new("");
    let solver = CannedSolver::new("", 0);

    let report = Orchestrator::new(&config, &facts, &solver, toy_worker()).run().unwrap();

    let optimum = report.get("MINIMIZE OPTIMUM GUESS-CHECK").unwrap();
    assert_eq!(optimum.optimum.as_ref().unwrap().size, 1);
    assert_eq!(optimum.solutions[0].identifier, "model_one_solution");

    let union = report.get("MINIMIZE UNION GUESS-CHECK").unwrap();
    let enumeration = report.get("MINIMIZE ENUMERATION GUESS-CHECK").unwrap();
    let expected_union = enumeration
        .solutions
        .iter()
        .fold(BTreeSet::new(), |acc, s| &acc | &s.seeds);
    assert_eq!(union.solution("model_union").unwrap().seeds, expected_union);
    assert!(report.get("MINIMIZE INTERSECTION GUESS-CHECK").is_some());
}

#[test]
fn test_killed_worker_recovers_committed_records() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir)
        .strategy("guess-check-div")
        .time_limit_minutes(0.01)
        .grace(Duration::ZERO)
        .build()
        .unwrap();
    let facts = StaticFacts::new("");
    let solver = CannedSolver::new("", 0);
    let worker = ThreadWorker::new(|job: &WorkerJob| {
        let side_log = SideLog::new(job.side_log.clone());
        let io = |e: anyhow::Error| SeedSearchError::Io(std::io::Error::other(e.to_string()));
        for (i, seeds) in [["A"].as_slice(), &["D"], &["B", "C"]].iter().enumerate() {
            side_log
                .record_accepted(&Solution::new(format!("model_{}", i + 1), set(seeds)), 150)
                .map_err(io)?;
        }
        side_log.checkpoint(200).map_err(io)?;
        std::thread::sleep(Duration::from_secs(60));
        Ok(WorkerReport {
            outcome: LoopReport::default(),
            memory_gb: None,
        })
    });

    let report = Orchestrator::new(&config, &facts, &solver, worker).run().unwrap();
    let entry = report.get("SUBSET MINIMAL ENUMERATION GUESS-CHECK-DIVERSITY").unwrap();
    assert!(entry.killed);
    assert_eq!(entry.timer, Timer::timed_out());
    assert_eq!(entry.solutions.len(), 3);
    assert!(entry.rejected.unwrap() >= 200);
}

#[test]
fn test_report_serializes_time_out_marker() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).build().unwrap();
    let facts = StaticFacts::new("");
    let killed = ProcessOutput::new(
        br#"{"Call": [{"Witnesses": [{"Value": ["seed(\"A\",\"c\")"]}, {"Value": ["seed(\"B\",\"c\")"#
            .to_vec(),
        Vec::new(),
        None,
        true,
    );

    struct Killed(ProcessOutput);
    impl ProcessRunner for Killed {
        fn run(&self, _cmd: &CommandSpec, _t: Duration) -> Result<ProcessOutput, RunnerError> {
            Ok(self.0.clone())
        }
    }

    let report = Orchestrator::new(&config, &facts, Killed(killed), toy_worker()).run().unwrap();
    let entry = report.get("SUBSET MINIMAL ENUMERATION").unwrap();
    assert!(entry.killed);
    assert_eq!(entry.solutions.len(), 1);
    assert_eq!(entry.solutions[0].seeds, set(&["A"]));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(
        json["entries"]["SUBSET MINIMAL ENUMERATION"]["timer"]["solving_time"],
        "Time out"
    );
}
