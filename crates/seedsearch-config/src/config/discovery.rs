use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use seedsearch_utils::error::{ConfigError, SeedSearchError};

use super::{
    CliArgs, Config, ConfigSource, EncodingSection, OracleSection, OutputSection, SearchSection,
    SolverSection, overlay,
};

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    search: Option<SearchSection>,
    solver: Option<SolverSection>,
    encoding: Option<EncodingSection>,
    oracle: Option<OracleSection>,
    output: Option<OutputSection>,
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        let mut config = Self::with_defaults();

        let config_path = match &cli_args.config_path {
            Some(explicit) => Some(explicit.clone()),
            None => Self::discover_config_file_from(start_dir)?,
        };

        if let Some(path) = &config_path {
            tracing::debug!(path = %path.display(), "Loading configuration file");
            let file_config = Self::load_config_file(path)?;
            config.apply_file(file_config);
        }

        config.apply_cli(cli_args);
        config.validate()?;

        Ok(config)
    }

    /// Walk up from `start_dir` looking for `.seedsearch/config.toml`.
    ///
    /// Stops at repository root markers (.git, .hg, .svn) or the filesystem root.
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>> {
        let mut current_dir = Some(start_dir);

        while let Some(dir) = current_dir {
            let config_path = dir.join(".seedsearch").join("config.toml");
            if config_path.is_file() {
                return Ok(Some(config_path));
            }

            if [".git", ".hg", ".svn"]
                .iter()
                .any(|marker| dir.join(marker).exists())
            {
                break;
            }

            current_dir = dir.parent();
        }

        Ok(None)
    }

    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                SeedSearchError::Config(ConfigError::InvalidFile(format!(
                    "{}: {e}",
                    path.display()
                )))
                .into()
            }),
            // An explicit path that does not exist behaves like no file
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TomlConfig::default()),
            Err(e) => Err(anyhow::anyhow!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            )),
        }
    }

    fn apply_file(&mut self, file: TomlConfig) {
        let source = ConfigSource::Config;
        let attribution = &mut self.source_attribution;

        if let Some(search) = file.search {
            let s = &mut self.search;
            overlay(&mut s.run_mode, search.run_mode, "run_mode", &source, attribution);
            overlay(&mut s.subset_minimal, search.subset_minimal, "subset_minimal", &source, attribution);
            overlay(&mut s.minimize, search.minimize, "minimize", &source, attribution);
            overlay(&mut s.intersection, search.intersection, "intersection", &source, attribution);
            overlay(&mut s.union, search.union, "union", &source, attribution);
            overlay(&mut s.solution_limit, search.solution_limit, "solution_limit", &source, attribution);
            overlay(
                &mut s.time_limit_minutes,
                search.time_limit_minutes,
                "time_limit_minutes",
                &source,
                attribution,
            );
            overlay(&mut s.strategy, search.strategy, "strategy", &source, attribution);
            overlay(&mut s.diversity_seed, search.diversity_seed, "diversity_seed", &source, attribution);
            overlay(&mut s.flux_epsilon, search.flux_epsilon, "flux_epsilon", &source, attribution);
            overlay(&mut s.accumulation, search.accumulation, "accumulation", &source, attribution);
        }

        if let Some(solver) = file.solver {
            let s = &mut self.solver;
            overlay(&mut s.backend, solver.backend, "backend", &source, attribution);
            overlay(&mut s.clingo, solver.clingo, "clingo", &source, attribution);
            overlay(&mut s.clingo_lpx, solver.clingo_lpx, "clingo_lpx", &source, attribution);
            overlay(&mut s.configuration, solver.configuration, "configuration", &source, attribution);
            overlay(&mut s.opt_strategy, solver.opt_strategy, "opt_strategy", &source, attribution);
            overlay(&mut s.grace_secs, solver.grace_secs, "grace_secs", &source, attribution);
            overlay(&mut s.maximize_flux, solver.maximize_flux, "maximize_flux", &source, attribution);
        }

        if let Some(encoding) = file.encoding {
            let e = &mut self.encoding;
            overlay(&mut e.dir, encoding.dir, "encoding_dir", &source, attribution);
            overlay(&mut e.seed_solving, encoding.seed_solving, "encoding_seed_solving", &source, attribution);
            overlay(&mut e.minimize, encoding.minimize, "encoding_minimize", &source, attribution);
            overlay(
                &mut e.maximize_produced_target,
                encoding.maximize_produced_target,
                "encoding_maximize_produced_target",
                &source,
                attribution,
            );
            overlay(&mut e.flux, encoding.flux, "encoding_flux", &source, attribution);
            overlay(
                &mut e.maximize_flux,
                encoding.maximize_flux,
                "encoding_maximize_flux",
                &source,
                attribution,
            );
        }

        if let Some(oracle) = file.oracle {
            overlay(&mut self.oracle.command, oracle.command, "oracle_command", &source, attribution);
            overlay(
                &mut self.oracle.timeout_secs,
                oracle.timeout_secs,
                "oracle_timeout_secs",
                &source,
                attribution,
            );
        }

        if let Some(output) = file.output {
            overlay(&mut self.output.temp_dir, output.temp_dir, "temp_dir", &source, attribution);
        }
    }

    fn apply_cli(&mut self, cli: &CliArgs) {
        let source = ConfigSource::Cli;
        let attribution = &mut self.source_attribution;
        let s = &mut self.search;

        overlay(&mut s.run_mode, cli.run_mode.clone(), "run_mode", &source, attribution);
        overlay(&mut s.subset_minimal, cli.subset_minimal, "subset_minimal", &source, attribution);
        overlay(&mut s.minimize, cli.minimize, "minimize", &source, attribution);
        overlay(&mut s.intersection, cli.intersection.then_some(true), "intersection", &source, attribution);
        overlay(&mut s.union, cli.union.then_some(true), "union", &source, attribution);
        overlay(&mut s.solution_limit, cli.solution_limit, "solution_limit", &source, attribution);
        overlay(
            &mut s.time_limit_minutes,
            cli.time_limit_minutes,
            "time_limit_minutes",
            &source,
            attribution,
        );
        overlay(&mut s.strategy, cli.strategy.clone(), "strategy", &source, attribution);
        overlay(&mut s.diversity_seed, cli.diversity_seed, "diversity_seed", &source, attribution);
        overlay(&mut s.flux_epsilon, cli.flux_epsilon, "flux_epsilon", &source, attribution);
        overlay(&mut s.accumulation, cli.accumulation.then_some(true), "accumulation", &source, attribution);

        let s = &mut self.solver;
        overlay(&mut s.backend, cli.backend.clone(), "backend", &source, attribution);
        overlay(&mut s.clingo, cli.clingo.clone(), "clingo", &source, attribution);
        overlay(&mut s.configuration, cli.configuration.clone(), "configuration", &source, attribution);
        overlay(&mut s.opt_strategy, cli.opt_strategy.clone(), "opt_strategy", &source, attribution);
        overlay(&mut s.maximize_flux, cli.maximize_flux.then_some(true), "maximize_flux", &source, attribution);

        overlay(&mut self.encoding.dir, cli.encoding_dir.clone(), "encoding_dir", &source, attribution);
        overlay(
            &mut self.oracle.command,
            (!cli.oracle_command.is_empty()).then(|| cli.oracle_command.clone()),
            "oracle_command",
            &source,
            attribution,
        );
        overlay(&mut self.output.temp_dir, cli.temp_dir.clone(), "temp_dir", &source, attribution);
    }
}
