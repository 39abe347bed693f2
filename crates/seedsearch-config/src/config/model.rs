use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use seedsearch_utils::types::ConfigSource;

/// Default number of solutions enumerated per sub-search
pub const DEFAULT_SOLUTION_LIMIT: i64 = 10;

/// Seconds granted to the solver past its own time limit before it is killed
pub const DEFAULT_GRACE_SECS: u64 = 60;

/// Minimal objective flux for a seed set to be considered feasible
pub const DEFAULT_FLUX_EPSILON: f64 = 1e-5;

/// Default timeout for a single feasibility check in seconds
pub const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 300;

/// Configuration for seedsearch runs.
///
/// `Config` provides hierarchical configuration with discovery and precedence:
/// CLI arguments > config file > built-in defaults.
///
/// # Discovery
///
/// [`Config::discover()`] searches for `.seedsearch/config.toml` upward from the
/// current directory, stopping at a repository root, and applies built-in
/// defaults for unspecified values.
///
/// # Source Attribution
///
/// Each configuration value tracks its source (`cli`, `config`, `programmatic`,
/// or `default`).
///
/// # Configuration File Format
///
/// ```toml
/// [search]
/// run_mode = "target"
/// subset_minimal = true
/// minimize = true
/// intersection = true
/// solution_limit = 10
/// time_limit_minutes = 30
/// strategy = "guess-check-div"
/// diversity_seed = 42
///
/// [solver]
/// backend = "reasoning"
/// clingo = "clingo"
/// configuration = "jumpy"
///
/// [encoding]
/// dir = "/opt/seedsearch/asp"
///
/// [oracle]
/// command = ["python", "-m", "fluxcheck", "--model", "network.sbml"]
/// timeout_secs = 120
///
/// [output]
/// temp_dir = "/tmp/seedsearch"
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// What to search for and how candidates are confirmed.
    pub search: SearchSection,
    /// Solver programs and flags.
    pub solver: SolverSection,
    /// Location of the logic-program encodings.
    pub encoding: EncodingSection,
    /// External feasibility oracle.
    pub oracle: OracleSection,
    /// Scratch and result locations.
    pub output: OutputSection,
    /// Source attribution for each setting.
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// `[search]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchSection {
    /// `target`, `full` or `fba`
    pub run_mode: Option<String>,
    pub subset_minimal: Option<bool>,
    pub minimize: Option<bool>,
    pub intersection: Option<bool>,
    pub union: Option<bool>,
    /// 0 means unlimited, -1 skips enumeration
    pub solution_limit: Option<i64>,
    /// 0 means unlimited
    pub time_limit_minutes: Option<f64>,
    /// One strategy name or `all`
    pub strategy: Option<String>,
    /// Fixes the diversity heuristic's random choices when set
    pub diversity_seed: Option<u64>,
    pub flux_epsilon: Option<f64>,
    /// Allow compounds to accumulate
    pub accumulation: Option<bool>,
}

/// `[solver]` section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SolverSection {
    /// `reasoning` or `hybrid`
    pub backend: Option<String>,
    /// Program used for the reasoning backend
    pub clingo: Option<String>,
    /// Command line prefix used for the hybrid backend
    pub clingo_lpx: Option<Vec<String>>,
    /// Value of `--configuration`, `none` to omit the flag
    pub configuration: Option<String>,
    /// Value of `--opt-strategy`, `none` to omit the flag
    pub opt_strategy: Option<String>,
    pub grace_secs: Option<u64>,
    /// Add the flux maximisation encoding to hybrid runs
    pub maximize_flux: Option<bool>,
}

/// `[encoding]` section
///
/// File names are resolved against `dir`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EncodingSection {
    pub dir: Option<Utf8PathBuf>,
    pub seed_solving: Option<String>,
    pub minimize: Option<String>,
    pub maximize_produced_target: Option<String>,
    pub flux: Option<String>,
    pub maximize_flux: Option<String>,
}

/// `[oracle]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OracleSection {
    /// Program and leading arguments; seeds are appended per check
    pub command: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
}

/// `[output]` section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSection {
    /// Directory for instance files, exclusion programs, worker jobs and side logs.
    /// Defaults to the system temp directory.
    pub temp_dir: Option<Utf8PathBuf>,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            run_mode: Some("target".to_string()),
            subset_minimal: Some(true),
            minimize: Some(false),
            intersection: Some(false),
            union: Some(false),
            solution_limit: Some(DEFAULT_SOLUTION_LIMIT),
            time_limit_minutes: Some(0.0),
            strategy: Some("classic".to_string()),
            diversity_seed: None,
            flux_epsilon: Some(DEFAULT_FLUX_EPSILON),
            accumulation: Some(false),
        }
    }
}

impl Default for SolverSection {
    fn default() -> Self {
        Self {
            backend: Some("reasoning".to_string()),
            clingo: Some("clingo".to_string()),
            clingo_lpx: Some(vec!["clingo-lpx".to_string()]),
            configuration: Some("jumpy".to_string()),
            opt_strategy: Some("none".to_string()),
            grace_secs: Some(DEFAULT_GRACE_SECS),
            maximize_flux: Some(false),
        }
    }
}

impl Default for EncodingSection {
    fn default() -> Self {
        Self {
            dir: Some(Utf8PathBuf::from("asp")),
            seed_solving: Some("seed-solving.lp".to_string()),
            minimize: Some("minimize.lp".to_string()),
            maximize_produced_target: Some("maximize_produced_target.lp".to_string()),
            flux: Some("flux.lp".to_string()),
            maximize_flux: Some("maximize_flux.lp".to_string()),
        }
    }
}
