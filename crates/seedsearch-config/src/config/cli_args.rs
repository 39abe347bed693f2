use camino::Utf8PathBuf;
use std::path::PathBuf;

/// Command-line overrides applied on top of the configuration file.
///
/// `None` (or `false` for switches) leaves the file or default value in place.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Explicit configuration file, bypassing discovery
    pub config_path: Option<PathBuf>,
    pub run_mode: Option<String>,
    pub subset_minimal: Option<bool>,
    pub minimize: Option<bool>,
    pub intersection: bool,
    pub union: bool,
    pub solution_limit: Option<i64>,
    pub time_limit_minutes: Option<f64>,
    pub strategy: Option<String>,
    pub diversity_seed: Option<u64>,
    pub flux_epsilon: Option<f64>,
    pub accumulation: bool,
    pub backend: Option<String>,
    pub clingo: Option<String>,
    pub configuration: Option<String>,
    pub opt_strategy: Option<String>,
    pub maximize_flux: bool,
    pub encoding_dir: Option<Utf8PathBuf>,
    /// Empty keeps the configured oracle command
    pub oracle_command: Vec<String>,
    pub temp_dir: Option<Utf8PathBuf>,
}
