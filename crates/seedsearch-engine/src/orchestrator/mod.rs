//! Search orchestration: which sub-searches run, in which order
//!
//! Every configured strategy walks the same phases:
//!
//! ```text
//! Idle -> FindingOptimum -> Enumerating -> Intersecting -> Unioning -> Done
//! ```
//!
//! `FindingOptimum` only exists for minimize searches; when it yields no
//! usable optimum the remaining phases of that strategy are recorded as not
//! computed. Plain solver calls run through a [`ProcessRunner`], validated
//! strategies through a [`WorkerLauncher`] with a side log for recovery.

mod outputs;

use camino::Utf8PathBuf;
use std::fmt;
use tracing::{debug, error, info, warn};

use seedsearch_config::Config;
use seedsearch_runner::{ProcessRunner, peak_children_memory_gb};
use seedsearch_utils::error::{SeedSearchError, SolverError};
use seedsearch_utils::logging::{log_sub_search_complete, log_sub_search_error, sub_search_span};
use seedsearch_utils::types::{RunMode, SearchMode, SearchType, SolveStrategy, SolverBackend};

use crate::facts::{FactSource, write_instance};
use crate::guess_check::GuessCheckSettings;
use crate::query::{QueryProfile, carry_forward_optimum, query_profile};
use crate::request::{SearchRequest, SolutionLimit, TimeBudget};
use crate::solution::{OptimumDecomposition, SearchOutput, SearchReport, Timer};
use crate::solver::SolverSetup;
use crate::worker::{OracleSpec, Recovered, SideLog, WorkerJob, WorkerLauncher, WorkerOutcome};

/// Where the orchestration currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FindingOptimum,
    Enumerating,
    Intersecting,
    Unioning,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::FindingOptimum => "finding-optimum",
            Self::Enumerating => "enumerating",
            Self::Intersecting => "intersecting",
            Self::Unioning => "unioning",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

impl Phase {
    const fn for_type(search_type: SearchType) -> Self {
        match search_type {
            SearchType::OneModel => Self::FindingOptimum,
            SearchType::Enumeration => Self::Enumerating,
            SearchType::Intersection => Self::Intersecting,
            SearchType::Union => Self::Unioning,
        }
    }
}

/// One search mode with its solver setup and scratch space.
struct Branch {
    mode: SearchMode,
    setup: SolverSetup,
    work_dir: Utf8PathBuf,
}

/// What a minimize optimum allows for the rest of its strategy.
enum OptimumGate {
    Proceed(OptimumDecomposition),
    Skip(String),
}

fn io_error(err: &anyhow::Error) -> SeedSearchError {
    SeedSearchError::Io(std::io::Error::other(format!("{err:#}")))
}

/// Drives every sub-search of one network run.
pub struct Orchestrator<'a, R, L> {
    config: &'a Config,
    facts: &'a dyn FactSource,
    runner: R,
    launcher: L,
    phase: Phase,
    visited: Vec<Phase>,
}

impl<'a, R: ProcessRunner, L: WorkerLauncher> Orchestrator<'a, R, L> {
    pub fn new(config: &'a Config, facts: &'a dyn FactSource, runner: R, launcher: L) -> Self {
        Self {
            config,
            facts,
            runner,
            launcher,
            phase: Phase::Idle,
            visited: vec![Phase::Idle],
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Every phase entered so far, in order.
    #[must_use]
    pub fn visited(&self) -> &[Phase] {
        &self.visited
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "Phase transition");
        self.phase = phase;
        self.visited.push(phase);
    }

    /// Run every configured search and collect the results.
    ///
    /// Unsatisfiable, killed or crashed sub-searches are recorded in the
    /// report; only configuration and scratch-space errors abort.
    pub fn run(&mut self) -> Result<SearchReport, SeedSearchError> {
        let run_mode = self.config.run_mode()?;
        let backend = self.config.backend()?;
        let strategies = self.config.strategies()?;
        let mut report = SearchReport::new(backend.label(run_mode));

        if backend == SolverBackend::Hybrid && self.facts.objectives().is_empty() {
            error!("No objective reaction found, the hybrid solver needs one");
            return Err(SolverError::NoObjective.into());
        }

        let scratch_root = self.config.temp_dir();
        std::fs::create_dir_all(&scratch_root)?;
        let scratch = tempfile::Builder::new()
            .prefix("run-")
            .tempdir_in(&scratch_root)?;
        let work_dir = Utf8PathBuf::from_path_buf(scratch.path().to_path_buf()).map_err(|path| {
            SeedSearchError::Io(std::io::Error::other(format!(
                "scratch path is not UTF-8: {}",
                path.display()
            )))
        })?;
        let instance = write_instance(self.facts, &work_dir).map_err(|e| io_error(&e))?;

        info!(
            backend = %report.backend,
            run_mode = %run_mode,
            strategies = strategies.len(),
            "Starting seed search"
        );

        if self.config.subset_minimal() {
            let branch = self.branch(SearchMode::SubsetMinimal, &instance, &work_dir)?;
            for strategy in &strategies {
                self.run_subset_minimal(&branch, *strategy, run_mode, &mut report)?;
            }
        }
        if self.config.minimize() {
            let branch = self.branch(SearchMode::Minimize, &instance, &work_dir)?;
            for strategy in &strategies {
                self.run_minimize(&branch, *strategy, run_mode, &mut report)?;
            }
        }

        self.enter(Phase::Done);
        Ok(report)
    }

    fn branch(
        &self,
        mode: SearchMode,
        instance: &Utf8PathBuf,
        work_dir: &Utf8PathBuf,
    ) -> Result<Branch, SeedSearchError> {
        let work_dir = work_dir.join(mode.as_str());
        std::fs::create_dir_all(&work_dir)?;
        Ok(Branch {
            mode,
            setup: SolverSetup::for_search(self.config, mode, instance, self.facts)?,
            work_dir,
        })
    }

    fn request(&self, run_mode: RunMode, mode: SearchMode, search_type: SearchType) -> SearchRequest {
        SearchRequest::new(
            run_mode,
            mode,
            search_type,
            SolutionLimit::from_raw(self.config.solution_limit()),
            TimeBudget::from_minutes(self.config.time_limit_minutes()),
        )
    }

    fn run_subset_minimal(
        &mut self,
        branch: &Branch,
        strategy: SolveStrategy,
        run_mode: RunMode,
        report: &mut SearchReport,
    ) -> Result<(), SeedSearchError> {
        // Without enumeration the limit still asks for one domain-guided model.
        let enumeration = self.request(run_mode, branch.mode, SearchType::Enumeration);
        self.sub_search(branch, strategy, enumeration, None, report)?;

        if self.config.intersection() {
            let request = self.request(run_mode, branch.mode, SearchType::Intersection);
            self.sub_search(branch, strategy, request, None, report)?;
        }
        if self.config.union() {
            debug!("Union is only computed for minimize searches");
        }
        Ok(())
    }

    fn run_minimize(
        &mut self,
        branch: &Branch,
        strategy: SolveStrategy,
        run_mode: RunMode,
        report: &mut SearchReport,
    ) -> Result<(), SeedSearchError> {
        let optimum_request = self.request(run_mode, branch.mode, SearchType::OneModel);
        let found = self.sub_search(branch, strategy, optimum_request, None, report)?;

        let mut followups = Vec::new();
        if optimum_request.solution_limit.enumerates() {
            followups.push(SearchType::Enumeration);
        }
        if self.config.intersection() {
            followups.push(SearchType::Intersection);
        }
        if self.config.union() {
            followups.push(SearchType::Union);
        }

        match self.optimum_gate(found) {
            OptimumGate::Proceed(optimum) => {
                for search_type in followups {
                    let request = optimum_request.with_type(search_type);
                    self.sub_search(branch, strategy, request, Some(&optimum), report)?;
                }
            }
            OptimumGate::Skip(note) => {
                info!("{note}");
                for search_type in followups {
                    let profile = query_profile(branch.mode, search_type)?;
                    let label = format!("{}{}", profile.label, strategy.label_suffix());
                    report.insert(label, SearchOutput::not_computed(format!("Not computed: {note}")));
                }
            }
        }
        Ok(())
    }

    fn optimum_gate(&self, found: Option<OptimumDecomposition>) -> OptimumGate {
        match found {
            None => OptimumGate::Skip("No optimum found.".to_string()),
            Some(optimum) if optimum.is_zero() => {
                let mut note = "Optimum is 0.".to_string();
                if self.facts.keep_import_reactions() {
                    note.push_str(" Import reactions are kept; try again with them removed.");
                }
                OptimumGate::Skip(note)
            }
            Some(optimum) => OptimumGate::Proceed(optimum),
        }
    }

    /// Run one labeled sub-search and record it. Returns the optimum it found.
    fn sub_search(
        &mut self,
        branch: &Branch,
        strategy: SolveStrategy,
        request: SearchRequest,
        optimum: Option<&OptimumDecomposition>,
        report: &mut SearchReport,
    ) -> Result<Option<OptimumDecomposition>, SeedSearchError> {
        let mut profile = query_profile(request.search_mode, request.search_type)?;
        if let Some(optimum) = optimum {
            carry_forward_optimum(&mut profile, optimum);
        }
        let label = format!("{}{}", profile.label, strategy.label_suffix());

        self.enter(Phase::for_type(request.search_type));
        let span = sub_search_span(&label, strategy.as_str());
        let _guard = span.enter();
        info!("Searching {label}");

        let output = if !strategy.is_validated() {
            self.classic(branch, &profile, &request)?
        } else if matches!(request.search_type, SearchType::Intersection | SearchType::Union) {
            self.validated_consensus(branch.mode, strategy, &profile, &request, report)?
        } else {
            self.validated(branch, strategy, &profile, &request, &label)?
        };

        match &output.error {
            Some(err) => log_sub_search_error(&label, err),
            None => log_sub_search_complete(&label, output.solutions.len(), output.rejected, output.killed),
        }
        let found = output.optimum.clone();
        report.insert(label, output);
        Ok(found)
    }

    fn classic(
        &self,
        branch: &Branch,
        profile: &QueryProfile,
        request: &SearchRequest,
    ) -> Result<SearchOutput, SeedSearchError> {
        let answer = branch.setup.invoke(
            &self.runner,
            &profile.flags,
            request.models_flag(),
            request.time_budget,
            profile.decode_mode,
        );
        match answer {
            Ok(answer) => Ok(outputs::from_answer(answer, profile, request)),
            Err(err @ (SeedSearchError::Solver(_) | SeedSearchError::Runner(_))) => {
                Ok(SearchOutput::failed(err.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    fn validated_consensus(
        &self,
        mode: SearchMode,
        strategy: SolveStrategy,
        profile: &QueryProfile,
        request: &SearchRequest,
        report: &SearchReport,
    ) -> Result<SearchOutput, SeedSearchError> {
        let enumeration = query_profile(mode, SearchType::Enumeration)?;
        let source = format!("{}{}", enumeration.label, strategy.label_suffix());
        Ok(match report.get(&source) {
            Some(validated) => outputs::consensus(validated, request.search_type, profile),
            None => SearchOutput::not_computed(format!(
                "Not computed: {source} was not run"
            )),
        })
    }

    fn validated(
        &self,
        branch: &Branch,
        strategy: SolveStrategy,
        profile: &QueryProfile,
        request: &SearchRequest,
        label: &str,
    ) -> Result<SearchOutput, SeedSearchError> {
        let log_path = branch.work_dir.join(format!(
            "{}.jsonl",
            label.to_ascii_lowercase().replace(' ', "_")
        ));
        let side_log = SideLog::create(log_path).map_err(|e| io_error(&e))?;

        let job = WorkerJob {
            label: label.to_string(),
            strategy,
            setup: branch.setup.clone(),
            flags: profile.flags.clone(),
            settings: GuessCheckSettings {
                optimum: request.seeks_optimum(),
                exact_acceptance: request.search_mode == SearchMode::Minimize,
                limit: request.solution_limit,
                budget: request.time_budget,
                diversity: strategy == SolveStrategy::GuessCheckDiversity,
                diversity_seed: self.config.diversity_seed(),
            },
            oracle: self.config.oracle_command().map(|argv| OracleSpec {
                argv: argv.to_vec(),
                timeout: self.config.oracle_timeout(),
                epsilon: self.config.flux_epsilon(),
            }),
            side_log: side_log.path().to_path_buf(),
            work_dir: branch.work_dir.clone(),
        };

        let deadline = request.time_budget.deadline_with_grace(self.config.grace());
        let output = match self.launcher.launch(&job, deadline) {
            WorkerOutcome::Completed(worker_report) => {
                side_log.remove();
                outputs::from_report(worker_report)
            }
            WorkerOutcome::Expired => {
                error!(
                    minutes = request.time_budget.minutes(),
                    "Time out: {} min expired",
                    request.time_budget.minutes()
                );
                let mut output = outputs::from_recovered(
                    recover(&side_log),
                    Timer::timed_out(),
                    request.seeks_optimum(),
                );
                output.killed = true;
                // The runner has reaped the worker by now
                output.memory_peak_gb = peak_children_memory_gb();
                output
            }
            WorkerOutcome::Failed(err) => {
                let mut output =
                    outputs::from_recovered(recover(&side_log), Timer::failed(), request.seeks_optimum());
                output.error = Some(err.to_string());
                output.memory_peak_gb = peak_children_memory_gb();
                output
            }
        };
        Ok(output)
    }
}

fn recover(side_log: &SideLog) -> Recovered {
    match side_log.recover() {
        Ok(recovered) => {
            info!(
                solutions = recovered.solutions.len(),
                rejected = recovered.rejected,
                "Recovered results from the side log"
            );
            recovered
        }
        Err(err) => {
            warn!(error = %format!("{err:#}"), "Side log unreadable, nothing recovered");
            Recovered::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::StaticFacts;
    use crate::guess_check::LoopReport;
    use crate::guess_check::tests::{set, three_minimal_sets};
    use crate::solution::Solution;
    use crate::worker::{ThreadWorker, WorkerReport};
    use seedsearch_runner::{CommandSpec, ProcessOutput, RunnerError};
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Answers solver calls from a closure over the command line.
    struct ScriptedSolver<F> {
        script: F,
        calls: RefCell<Vec<String>>,
    }

    impl<F: Fn(&str) -> ProcessOutput> ScriptedSolver<F> {
        fn new(script: F) -> Self {
            Self {
                script,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl<F: Fn(&str) -> ProcessOutput> ProcessRunner for ScriptedSolver<F> {
        fn run(&self, cmd: &CommandSpec, _timeout: Duration) -> Result<ProcessOutput, RunnerError> {
            let line = cmd.display_line();
            self.calls.borrow_mut().push(line.clone());
            Ok((self.script)(&line))
        }
    }

    fn answer(result: &str, witnesses: &str, code: i32) -> ProcessOutput {
        let json = format!(
            r#"{{"Call": [{{"Witnesses": [{witnesses}]}}], "Result": "{result}", "Time": {{"Total": 0.5, "Solve": 0.25}}}}"#
        );
        ProcessOutput::new(json.into_bytes(), Vec::new(), Some(code), false)
    }

    fn unused_worker() -> ThreadWorker {
        ThreadWorker::new(|_| panic!("no validated strategy configured"))
    }

    fn config(dir: &TempDir) -> seedsearch_config::ConfigBuilder {
        let temp = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        Config::builder().temp_dir(temp)
    }

    #[test]
    fn test_minimize_on_unsatisfiable_network() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir).subset_minimal(false).minimize(true).build().unwrap();
        let facts = StaticFacts::new("");
        let solver = ScriptedSolver::new(|_| answer("UNSATISFIABLE", "", 20));

        let mut orchestrator = Orchestrator::new(&config, &facts, &solver, unused_worker());
        let report = orchestrator.run().unwrap();

        let optimum = report.get("MINIMIZE OPTIMUM").unwrap();
        assert!(optimum.optimum.is_none());
        assert!(optimum.solutions.is_empty());
        assert!(!optimum.killed);
        let enumeration = report.get("MINIMIZE ENUMERATION").unwrap();
        assert_eq!(enumeration.timer, Timer::not_computed());
        assert_eq!(solver.calls.borrow().len(), 1);
        assert_eq!(
            orchestrator.visited(),
            [Phase::Idle, Phase::FindingOptimum, Phase::Done]
        );
    }

    #[test]
    fn test_minimize_carries_optimum_forward() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir)
            .subset_minimal(false)
            .minimize(true)
            .intersection(true)
            .union(true)
            .build()
            .unwrap();
        let facts = StaticFacts::new("");
        let solver = ScriptedSolver::new(|line| {
            if line.contains("--enum-mode=cautious") {
                answer("OPTIMUM FOUND", r#"{"Value": ["seed(\"A\",\"x\")"], "Costs": [2]}"#, 30)
            } else if line.contains("--enum-mode=brave") {
                answer(
                    "OPTIMUM FOUND",
                    r#"{"Value": ["seed(\"A\",\"x\")", "seed(\"B\",\"x\")", "seed(\"C\",\"x\")"], "Costs": [2]}"#,
                    30,
                )
            } else {
                answer(
                    "OPTIMUM FOUND",
                    r#"{"Value": ["seed(\"A\",\"x\")", "seed(\"B\",\"x\")"], "Costs": [2]},
                       {"Value": ["seed(\"A\",\"x\")", "seed(\"C\",\"x\")"], "Costs": [2]}"#,
                    30,
                )
            }
        });

        let mut orchestrator = Orchestrator::new(&config, &facts, &solver, unused_worker());
        let report = orchestrator.run().unwrap();

        assert_eq!(report.get("MINIMIZE OPTIMUM").unwrap().optimum.as_ref().unwrap().size, 2);
        let calls = solver.calls.borrow();
        assert!(calls[1].contains("--opt-mode=enum,2"));
        assert!(calls[1].contains("--project=show"));
        assert_eq!(report.get("MINIMIZE ENUMERATION").unwrap().solutions.len(), 2);
        let union = report.get("MINIMIZE UNION").unwrap();
        assert_eq!(union.solution("model_union").unwrap().size, 3);
        assert_eq!(
            report.labels().collect::<Vec<_>>(),
            [
                "MINIMIZE OPTIMUM",
                "MINIMIZE ENUMERATION",
                "MINIMIZE INTERSECTION",
                "MINIMIZE UNION"
            ]
        );
        assert_eq!(orchestrator.phase(), Phase::Done);
    }

    #[test]
    fn test_zero_optimum_skips_with_hint() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir).subset_minimal(false).minimize(true).build().unwrap();
        let facts = StaticFacts::new("").with_keep_import_reactions(true);
        let solver = ScriptedSolver::new(|_| answer("OPTIMUM FOUND", r#"{"Value": [], "Costs": [0]}"#, 30));

        let report = Orchestrator::new(&config, &facts, &solver, unused_worker()).run().unwrap();
        let note = report.get("MINIMIZE ENUMERATION").unwrap().note.clone().unwrap();
        assert!(note.starts_with("Not computed: Optimum is 0."));
        assert!(note.contains("Import reactions"));
        assert_eq!(solver.calls.borrow().len(), 1);
    }

    #[test]
    fn test_solver_time_limit_leaves_no_optimum() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir)
            .subset_minimal(false)
            .minimize(true)
            .intersection(true)
            .build()
            .unwrap();
        let facts = StaticFacts::new("");
        let solver = ScriptedSolver::new(|_| {
            let json = r#"{"Call": [{"Witnesses": [{"Value": ["seed(\"A\",\"x\")", "seed(\"B\",\"x\")", "seed(\"C\",\"x\")"], "Costs": [3]}]}], "Result": "SATISFIABLE", "Models": {"Number": 1, "More": "yes", "Optimum": "unknown"}, "Time": {"Total": 1.0, "Solve": 0.9}}"#;
            ProcessOutput::new(json.as_bytes().to_vec(), Vec::new(), Some(11), false)
        });

        let report = Orchestrator::new(&config, &facts, &solver, unused_worker()).run().unwrap();
        let optimum = report.get("MINIMIZE OPTIMUM").unwrap();
        assert!(optimum.optimum.is_none());
        assert_eq!(optimum.solutions.len(), 1);
        for label in ["MINIMIZE ENUMERATION", "MINIMIZE INTERSECTION"] {
            let skipped = report.get(label).unwrap();
            assert_eq!(skipped.note.as_deref(), Some("Not computed: No optimum found."));
        }
        assert_eq!(solver.calls.borrow().len(), 1);
    }

    #[test]
    fn test_solver_crash_is_recorded_and_run_continues() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir).intersection(true).build().unwrap();
        let facts = StaticFacts::new("");
        let solver = ScriptedSolver::new(|line| {
            if line.contains("--enum-mode=domRec") {
                ProcessOutput::new(Vec::new(), b"parse error".to_vec(), Some(65), false)
            } else {
                answer("SATISFIABLE", r#"{"Value": ["seed(\"A\",\"x\")"]}"#, 10)
            }
        });

        let report = Orchestrator::new(&config, &facts, &solver, unused_worker()).run().unwrap();
        let failed = report.get("SUBSET MINIMAL ENUMERATION").unwrap();
        assert_eq!(failed.timer, Timer::failed());
        assert!(failed.error.is_some());
        let inter = report.get("SUBSET MINIMAL INTERSECTION").unwrap();
        assert!(inter.solution("model_intersection").is_some());
    }

    #[test]
    fn test_hybrid_without_objective_aborts() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir).backend("hybrid").build().unwrap();
        let facts = StaticFacts::new("");
        let solver = ScriptedSolver::new(|_| answer("UNSATISFIABLE", "", 20));
        let err = Orchestrator::new(&config, &facts, &solver, unused_worker())
            .run()
            .unwrap_err();
        assert!(matches!(err, SeedSearchError::Solver(SolverError::NoObjective)));
        assert!(solver.calls.borrow().is_empty());
    }

    #[test]
    fn test_validated_strategy_runs_in_worker() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir)
            .strategy("guess-check")
            .solution_limit(0)
            .intersection(true)
            .build()
            .unwrap();
        let facts = StaticFacts::new("");
        let solver = ScriptedSolver::new(|_| panic!("the worker owns the solver"));
        let worker = ThreadWorker::new(|job| {
            assert_eq!(job.label, "SUBSET MINIMAL ENUMERATION GUESS-CHECK");
            assert!(!job.settings.exact_acceptance);
            let solutions = [["A"].as_slice(), &["B", "C"], &["D"]]
                .iter()
                .enumerate()
                .map(|(i, seeds)| {
                    assert!(three_minimal_sets(&set(seeds)).ok);
                    Solution::new(format!("model_{}", i + 1), set(seeds))
                })
                .collect();
            Ok(WorkerReport {
                outcome: LoopReport {
                    solutions,
                    rejected: 1,
                    ..LoopReport::default()
                },
                memory_gb: None,
            })
        });

        let report = Orchestrator::new(&config, &facts, &solver, worker).run().unwrap();
        let enumeration = report.get("SUBSET MINIMAL ENUMERATION GUESS-CHECK").unwrap();
        assert_eq!(enumeration.solutions.len(), 3);
        assert_eq!(enumeration.rejected, Some(1));
        let inter = report.get("SUBSET MINIMAL INTERSECTION GUESS-CHECK").unwrap();
        assert!(inter.solutions[0].seeds.is_empty());
    }

    #[test]
    fn test_expired_worker_recovers_side_log() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir)
            .strategy("filter")
            .time_limit_minutes(0.01)
            .grace(Duration::ZERO)
            .build()
            .unwrap();
        let facts = StaticFacts::new("");
        let solver = ScriptedSolver::new(|_| panic!("the worker owns the solver"));
        let worker = ThreadWorker::new(|job| {
            let log = SideLog::new(job.side_log.clone());
            for i in 1..=2 {
                let seeds = BTreeSet::from([format!("M_{i}")]);
                log.record_accepted(&Solution::new(format!("model_{i}"), seeds), 0)
                    .map_err(|e| SeedSearchError::Io(std::io::Error::other(e.to_string())))?;
            }
            log.checkpoint(100)
                .map_err(|e| SeedSearchError::Io(std::io::Error::other(e.to_string())))?;
            std::thread::sleep(Duration::from_secs(30));
            Ok(WorkerReport {
                outcome: LoopReport::default(),
                memory_gb: None,
            })
        });

        let report = Orchestrator::new(&config, &facts, &solver, worker).run().unwrap();
        let entry = report.get("SUBSET MINIMAL ENUMERATION FILTER").unwrap();
        assert!(entry.killed);
        assert_eq!(entry.timer, Timer::timed_out());
        assert_eq!(entry.solutions.len(), 2);
        assert_eq!(entry.rejected, Some(100));
        #[cfg(unix)]
        assert!(entry.memory_peak_gb.is_some());
    }

    #[test]
    fn test_failed_worker_still_reports_memory() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir).strategy("guess-check").build().unwrap();
        let facts = StaticFacts::new("");
        let solver = ScriptedSolver::new(|_| panic!("the worker owns the solver"));
        let worker = ThreadWorker::new(|_| {
            Err(SeedSearchError::Io(std::io::Error::other("oracle model missing")))
        });

        let report = Orchestrator::new(&config, &facts, &solver, worker).run().unwrap();
        let entry = report.get("SUBSET MINIMAL ENUMERATION GUESS-CHECK").unwrap();
        assert_eq!(entry.timer, Timer::failed());
        assert!(entry.error.is_some());
        assert!(entry.solutions.is_empty());
        #[cfg(unix)]
        assert!(entry.memory_peak_gb.is_some());
    }
}
