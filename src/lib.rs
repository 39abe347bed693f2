//! seedsearch: seed set search over metabolic networks
//!
//! The library facade re-exports the workspace crates:
//!
//! - [`seedsearch_engine`]: queries, decoding, guess-and-validate, workers and
//!   the [`Orchestrator`]
//! - [`seedsearch_config`]: configuration discovery and overrides
//! - [`seedsearch_runner`]: process execution with timeouts
//! - [`seedsearch_utils`]: errors, exit codes, logging, atomic writes
//!
//! ```no_run
//! use seedsearch::{Config, NativeRunner, Orchestrator, ProcessWorker, StaticFacts};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder().minimize(true).build()?;
//! let facts = StaticFacts::from_file(camino::Utf8Path::new("network.lp"))?;
//! let launcher = ProcessWorker::current_exe()?;
//! let report = Orchestrator::new(&config, &facts, NativeRunner::new(), launcher).run()?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! # Ok(())
//! # }
//! ```

pub mod cli;

pub use seedsearch_config::{CliArgs, Config, ConfigBuilder, ConfigSource};
pub use seedsearch_engine::{
    CommandOracle, DecodeMode, DecodedModel, DecodedRun, FactSource, FeasibilityOracle,
    GuessCheckSettings, LoopReport, OptimumDecomposition, Orchestrator, Phase, ProcessWorker,
    QueryProfile, SearchOutput, SearchReport, SearchRequest, SolutionLimit, Solution,
    SolveOutcome, SolverSetup, StaticFacts, ThreadWorker, TimeBudget, Timer, TimerValue, Verdict,
    WorkerJob, WorkerLauncher, WorkerOutcome, WorkerReport, decode, query_profile, repair_json,
};
pub use seedsearch_runner::{CommandSpec, NativeRunner, ProcessOutput, ProcessRunner, RunnerError};
pub use seedsearch_utils::error::{ConfigError, QueryError, SolverError, UserFriendlyError, WorkerError};
pub use seedsearch_utils::types::{RunMode, SearchMode, SearchType, SolveStrategy, SolverBackend};
pub use seedsearch_utils::{ExitCode, SeedSearchError};
