//! Configuration management for seedsearch
//!
//! Hierarchical configuration with discovery and precedence CLI > file >
//! defaults. TOML files carry `[search]`, `[solver]`, `[encoding]`, `[oracle]`
//! and `[output]` sections.

mod builder;
mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use model::*;
pub use seedsearch_utils::types::ConfigSource;

use camino::Utf8PathBuf;
use std::collections::HashMap;
use std::time::Duration;

use seedsearch_utils::error::{ConfigError, SeedSearchError};
use seedsearch_utils::types::{RunMode, SolveStrategy, SolverBackend};

/// Replace `slot` with `value` when present and record where it came from.
pub(crate) fn overlay<T>(
    slot: &mut Option<T>,
    value: Option<T>,
    key: &str,
    source: &ConfigSource,
    attribution: &mut HashMap<String, ConfigSource>,
) {
    if let Some(value) = value {
        *slot = Some(value);
        attribution.insert(key.to_string(), source.clone());
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, SeedSearchError>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse().map_err(|reason: String| {
        SeedSearchError::Config(ConfigError::InvalidValue {
            key: key.to_string(),
            value: reason,
        })
    })
}

impl Config {
    /// Built-in defaults, each attributed to [`ConfigSource::Default`].
    pub(crate) fn with_defaults() -> Self {
        const DEFAULTED: &[&str] = &[
            "run_mode",
            "subset_minimal",
            "minimize",
            "intersection",
            "union",
            "solution_limit",
            "time_limit_minutes",
            "strategy",
            "flux_epsilon",
            "accumulation",
            "backend",
            "clingo",
            "clingo_lpx",
            "configuration",
            "opt_strategy",
            "grace_secs",
            "maximize_flux",
            "encoding_dir",
        ];

        Self {
            search: SearchSection::default(),
            solver: SolverSection::default(),
            encoding: EncodingSection::default(),
            oracle: OracleSection::default(),
            output: OutputSection::default(),
            source_attribution: DEFAULTED
                .iter()
                .map(|key| ((*key).to_string(), ConfigSource::Default))
                .collect(),
        }
    }

    pub fn run_mode(&self) -> Result<RunMode, SeedSearchError> {
        parse_value("run_mode", self.search.run_mode.as_deref().unwrap_or("target"))
    }

    /// Strategies to run, in order. `all` expands to every strategy.
    pub fn strategies(&self) -> Result<Vec<SolveStrategy>, SeedSearchError> {
        let raw = self.search.strategy.as_deref().unwrap_or("classic");
        SolveStrategy::parse_selection(raw).map_err(|reason| {
            SeedSearchError::Config(ConfigError::InvalidValue {
                key: "strategy".to_string(),
                value: reason,
            })
        })
    }

    pub fn backend(&self) -> Result<SolverBackend, SeedSearchError> {
        parse_value("backend", self.solver.backend.as_deref().unwrap_or("reasoning"))
    }

    #[must_use]
    pub fn subset_minimal(&self) -> bool {
        self.search.subset_minimal.unwrap_or(true)
    }

    #[must_use]
    pub fn minimize(&self) -> bool {
        self.search.minimize.unwrap_or(false)
    }

    #[must_use]
    pub fn intersection(&self) -> bool {
        self.search.intersection.unwrap_or(false)
    }

    #[must_use]
    pub fn union(&self) -> bool {
        self.search.union.unwrap_or(false)
    }

    #[must_use]
    pub fn accumulation(&self) -> bool {
        self.search.accumulation.unwrap_or(false)
    }

    #[must_use]
    pub fn maximize_flux(&self) -> bool {
        self.solver.maximize_flux.unwrap_or(false)
    }

    #[must_use]
    pub fn solution_limit(&self) -> i64 {
        self.search.solution_limit.unwrap_or(DEFAULT_SOLUTION_LIMIT)
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> f64 {
        self.search.time_limit_minutes.unwrap_or(0.0)
    }

    #[must_use]
    pub fn flux_epsilon(&self) -> f64 {
        self.search.flux_epsilon.unwrap_or(DEFAULT_FLUX_EPSILON)
    }

    #[must_use]
    pub fn diversity_seed(&self) -> Option<u64> {
        self.search.diversity_seed
    }

    #[must_use]
    pub fn grace(&self) -> Duration {
        Duration::from_secs(self.solver.grace_secs.unwrap_or(DEFAULT_GRACE_SECS))
    }

    #[must_use]
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle.timeout_secs.unwrap_or(DEFAULT_ORACLE_TIMEOUT_SECS))
    }

    #[must_use]
    pub fn clingo_program(&self) -> &str {
        self.solver.clingo.as_deref().unwrap_or("clingo")
    }

    #[must_use]
    pub fn clingo_lpx_argv(&self) -> Vec<String> {
        self.solver
            .clingo_lpx
            .clone()
            .unwrap_or_else(|| vec!["clingo-lpx".to_string()])
    }

    /// `--configuration` value, `None` when disabled.
    #[must_use]
    pub fn solver_configuration(&self) -> Option<&str> {
        self.solver
            .configuration
            .as_deref()
            .filter(|value| !value.eq_ignore_ascii_case("none"))
    }

    /// `--opt-strategy` value, `None` when disabled.
    #[must_use]
    pub fn opt_strategy(&self) -> Option<&str> {
        self.solver
            .opt_strategy
            .as_deref()
            .filter(|value| !value.eq_ignore_ascii_case("none"))
    }

    #[must_use]
    pub fn oracle_command(&self) -> Option<&[String]> {
        self.oracle.command.as_deref()
    }

    /// Scratch directory, falling back to the system temp directory.
    #[must_use]
    pub fn temp_dir(&self) -> Utf8PathBuf {
        self.output.temp_dir.clone().unwrap_or_else(|| {
            Utf8PathBuf::from_path_buf(std::env::temp_dir().join("seedsearch"))
                .unwrap_or_else(|_| Utf8PathBuf::from(".seedsearch-tmp"))
        })
    }

    fn encoding_file(&self, name: Option<&str>, fallback: &str) -> Utf8PathBuf {
        let dir = self.encoding.dir.clone().unwrap_or_else(|| Utf8PathBuf::from("asp"));
        dir.join(name.unwrap_or(fallback))
    }

    #[must_use]
    pub fn seed_solving_encoding(&self) -> Utf8PathBuf {
        self.encoding_file(self.encoding.seed_solving.as_deref(), "seed-solving.lp")
    }

    #[must_use]
    pub fn minimize_encoding(&self) -> Utf8PathBuf {
        self.encoding_file(self.encoding.minimize.as_deref(), "minimize.lp")
    }

    #[must_use]
    pub fn maximize_produced_target_encoding(&self) -> Utf8PathBuf {
        self.encoding_file(
            self.encoding.maximize_produced_target.as_deref(),
            "maximize_produced_target.lp",
        )
    }

    #[must_use]
    pub fn flux_encoding(&self) -> Utf8PathBuf {
        self.encoding_file(self.encoding.flux.as_deref(), "flux.lp")
    }

    #[must_use]
    pub fn maximize_flux_encoding(&self) -> Utf8PathBuf {
        self.encoding_file(self.encoding.maximize_flux.as_deref(), "maximize_flux.lp")
    }
}
