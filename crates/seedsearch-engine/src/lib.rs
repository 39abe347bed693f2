//! Seed search engine
//!
//! Drives an ASP solver through subset-minimal and minimize searches, confirms
//! candidates with an external feasibility oracle when asked to, and bounds
//! every sub-search by a wall-clock budget.
//!
//! The entry point is [`Orchestrator`]. The modules below it can be used on
//! their own:
//!
//! - [`query`]: solver flags and labels per (search mode, search type)
//! - [`decoder`]: clingo JSON output to models, with truncation repair
//! - [`guess_check`]: the guess-and-validate loop
//! - [`filter`]: validation of an already enumerated answer
//! - [`worker`]: isolated execution with side-log recovery

pub mod decoder;
pub mod facts;
pub mod filter;
pub mod guess_check;
pub mod oracle;
pub mod orchestrator;
pub mod query;
pub mod request;
pub mod solution;
pub mod solver;
pub mod worker;

pub use decoder::{DecodedModel, DecodedRun, SolveOutcome, decode, repair_json};
pub use facts::{FactSource, StaticFacts};
pub use guess_check::{GuessCheckSettings, LoopReport, run_guess_check};
pub use oracle::{CommandOracle, FeasibilityOracle, Verdict};
pub use orchestrator::{Orchestrator, Phase};
pub use query::{DecodeMode, QueryProfile, query_profile};
pub use request::{SearchRequest, SolutionLimit, TimeBudget};
pub use solution::{OptimumDecomposition, SearchOutput, SearchReport, Solution, Timer, TimerValue};
pub use solver::{SolverAnswer, SolverSetup};
pub use worker::{ProcessWorker, ThreadWorker, WorkerJob, WorkerLauncher, WorkerOutcome, WorkerReport, run_job};
