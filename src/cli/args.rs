//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface using clap: the main `Cli`
//! struct, its subcommands, and the mapping onto configuration overrides.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::CliArgs;

/// seedsearch - seed set search over metabolic networks with ASP solvers
#[derive(Parser, Debug)]
#[command(name = "seedsearch")]
#[command(about = "Search minimal seed sets of a metabolic network with an ASP solver")]
#[command(long_about = r#"
seedsearch drives clingo (or clingo-lpx) over a network instance given as
logic-program facts. It finds subset-minimal and cardinality-minimal seed sets,
optionally confirming each candidate with an external flux feasibility oracle.

EXAMPLES:
  # Subset-minimal enumeration, at most 10 solutions
  seedsearch search network.lp --out results.json

  # Minimize with intersection and union, 5 minutes per sub-search
  seedsearch search network.lp --minimize --no-subset-minimal \
      --intersection --union --time-limit 5

  # Every strategy, validating with an external oracle
  seedsearch search network.lp --strategy all --oracle-command ./check_flux.py

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from CWD for .seedsearch/config.toml
  Use --config to specify an explicit config file path
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search seed sets of a network instance
    Search(SearchArgs),

    /// Run one isolated search job and print its report (internal)
    #[command(hide = true)]
    Worker {
        /// Job description written by the parent process
        #[arg(long)]
        job: Utf8PathBuf,
    },
}

#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Logic-program facts of the network instance
    pub facts: Utf8PathBuf,

    /// Objective reaction (repeatable); required by the hybrid backend
    #[arg(long = "objective")]
    pub objectives: Vec<String>,

    /// Restrict seeds to the declared possible seeds
    #[arg(long)]
    pub subseed: bool,

    /// The instance keeps the network's import reactions
    #[arg(long)]
    pub keep_import_reactions: bool,

    /// Run mode: target, full or fba
    #[arg(long)]
    pub run_mode: Option<String>,

    /// Run the subset-minimal search
    #[arg(long, conflicts_with = "no_subset_minimal")]
    pub subset_minimal: bool,

    /// Skip the subset-minimal search
    #[arg(long)]
    pub no_subset_minimal: bool,

    /// Run the cardinality-minimal search
    #[arg(long)]
    pub minimize: bool,

    /// Also compute the intersection of solutions
    #[arg(long)]
    pub intersection: bool,

    /// Also compute the union of solutions (minimize only)
    #[arg(long)]
    pub union: bool,

    /// Solutions per enumeration: 0 unlimited, -1 no enumeration
    #[arg(short = 'n', long, allow_hyphen_values = true)]
    pub solution_limit: Option<i64>,

    /// Minutes per sub-search, 0 for no limit
    #[arg(long = "time-limit")]
    pub time_limit_minutes: Option<f64>,

    /// classic, filter, guess-check, guess-check-div or all
    #[arg(long)]
    pub strategy: Option<String>,

    /// Seed of the diversity heuristic's random choices
    #[arg(long)]
    pub diversity_seed: Option<u64>,

    /// Smallest objective flux accepted as feasible
    #[arg(long)]
    pub flux_epsilon: Option<f64>,

    /// Let seeds avoid accumulation through export reactions
    #[arg(long)]
    pub accumulation: bool,

    /// Solver backend: reasoning or hybrid
    #[arg(long)]
    pub backend: Option<String>,

    /// clingo executable
    #[arg(long)]
    pub clingo: Option<String>,

    /// clingo `--configuration`, or none
    #[arg(long)]
    pub configuration: Option<String>,

    /// clingo `--opt-strategy`, or none
    #[arg(long)]
    pub opt_strategy: Option<String>,

    /// Maximize objective flux (hybrid backend)
    #[arg(long)]
    pub maximize_flux: bool,

    /// Directory of the logic-program encodings
    #[arg(long)]
    pub encoding_dir: Option<Utf8PathBuf>,

    /// Feasibility oracle command; seeds are appended as arguments
    #[arg(long, value_delimiter = ' ')]
    pub oracle_command: Vec<String>,

    /// Scratch directory for instance files, worker jobs and side logs
    #[arg(long)]
    pub temp_dir: Option<Utf8PathBuf>,

    /// Write the results as JSON to this file
    #[arg(short, long)]
    pub out: Option<Utf8PathBuf>,

    /// Print the effective configuration with its sources and exit
    #[arg(long)]
    pub show_config: bool,
}

impl SearchArgs {
    /// Configuration overrides carried by these arguments.
    #[must_use]
    pub fn to_cli_args(&self, config_path: Option<PathBuf>) -> CliArgs {
        let subset_minimal = if self.no_subset_minimal {
            Some(false)
        } else if self.subset_minimal {
            Some(true)
        } else {
            None
        };

        CliArgs {
            config_path,
            run_mode: self.run_mode.clone(),
            subset_minimal,
            minimize: self.minimize.then_some(true),
            intersection: self.intersection,
            union: self.union,
            solution_limit: self.solution_limit,
            time_limit_minutes: self.time_limit_minutes,
            strategy: self.strategy.clone(),
            diversity_seed: self.diversity_seed,
            flux_epsilon: self.flux_epsilon,
            accumulation: self.accumulation,
            backend: self.backend.clone(),
            clingo: self.clingo.clone(),
            configuration: self.configuration.clone(),
            opt_strategy: self.opt_strategy.clone(),
            maximize_flux: self.maximize_flux,
            encoding_dir: self.encoding_dir.clone(),
            oracle_command: self.oracle_command.clone(),
            temp_dir: self.temp_dir.clone(),
        }
    }
}
