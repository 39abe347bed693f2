use camino::Utf8PathBuf;
use std::time::Duration;

use seedsearch_utils::error::SeedSearchError;

use super::{Config, ConfigSource, overlay};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// Builder values bypass file discovery entirely and are attributed to
    /// [`ConfigSource::Programmatic`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use seedsearch_config::Config;
    ///
    /// let config = Config::builder()
    ///     .run_mode("full")
    ///     .minimize(true)
    ///     .solution_limit(0)
    ///     .strategy("guess-check")
    ///     .oracle_command(["fluxcheck", "--model", "net.xml"])
    ///     .build()
    ///     .expect("valid configuration");
    /// assert_eq!(config.solution_limit(), 0);
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Fluent builder for [`Config`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    run_mode: Option<String>,
    subset_minimal: Option<bool>,
    minimize: Option<bool>,
    intersection: Option<bool>,
    union: Option<bool>,
    solution_limit: Option<i64>,
    time_limit_minutes: Option<f64>,
    strategy: Option<String>,
    diversity_seed: Option<u64>,
    flux_epsilon: Option<f64>,
    accumulation: Option<bool>,
    backend: Option<String>,
    clingo: Option<String>,
    grace: Option<Duration>,
    encoding_dir: Option<Utf8PathBuf>,
    oracle_command: Option<Vec<String>>,
    oracle_timeout: Option<Duration>,
    temp_dir: Option<Utf8PathBuf>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `target`, `full` or `fba`
    #[must_use]
    pub fn run_mode(mut self, mode: impl Into<String>) -> Self {
        self.run_mode = Some(mode.into());
        self
    }

    #[must_use]
    pub fn subset_minimal(mut self, enabled: bool) -> Self {
        self.subset_minimal = Some(enabled);
        self
    }

    #[must_use]
    pub fn minimize(mut self, enabled: bool) -> Self {
        self.minimize = Some(enabled);
        self
    }

    #[must_use]
    pub fn intersection(mut self, enabled: bool) -> Self {
        self.intersection = Some(enabled);
        self
    }

    #[must_use]
    pub fn union(mut self, enabled: bool) -> Self {
        self.union = Some(enabled);
        self
    }

    /// 0 for unlimited, -1 to skip enumeration
    #[must_use]
    pub fn solution_limit(mut self, limit: i64) -> Self {
        self.solution_limit = Some(limit);
        self
    }

    #[must_use]
    pub fn time_limit_minutes(mut self, minutes: f64) -> Self {
        self.time_limit_minutes = Some(minutes);
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    #[must_use]
    pub fn diversity_seed(mut self, seed: u64) -> Self {
        self.diversity_seed = Some(seed);
        self
    }

    #[must_use]
    pub fn flux_epsilon(mut self, epsilon: f64) -> Self {
        self.flux_epsilon = Some(epsilon);
        self
    }

    #[must_use]
    pub fn accumulation(mut self, enabled: bool) -> Self {
        self.accumulation = Some(enabled);
        self
    }

    /// `reasoning` or `hybrid`
    #[must_use]
    pub fn backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    #[must_use]
    pub fn clingo(mut self, program: impl Into<String>) -> Self {
        self.clingo = Some(program.into());
        self
    }

    /// Time granted to the solver past its own limit. Rounded down to seconds.
    #[must_use]
    pub fn grace(mut self, grace: Duration) -> Self {
        self.grace = Some(grace);
        self
    }

    #[must_use]
    pub fn encoding_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.encoding_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn oracle_command<I, S>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.oracle_command = Some(argv.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn temp_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<Config, SeedSearchError> {
        let mut config = Config::with_defaults();
        let source = ConfigSource::Programmatic;
        let attribution = &mut config.source_attribution;

        let s = &mut config.search;
        overlay(&mut s.run_mode, self.run_mode, "run_mode", &source, attribution);
        overlay(&mut s.subset_minimal, self.subset_minimal, "subset_minimal", &source, attribution);
        overlay(&mut s.minimize, self.minimize, "minimize", &source, attribution);
        overlay(&mut s.intersection, self.intersection, "intersection", &source, attribution);
        overlay(&mut s.union, self.union, "union", &source, attribution);
        overlay(&mut s.solution_limit, self.solution_limit, "solution_limit", &source, attribution);
        overlay(
            &mut s.time_limit_minutes,
            self.time_limit_minutes,
            "time_limit_minutes",
            &source,
            attribution,
        );
        overlay(&mut s.strategy, self.strategy, "strategy", &source, attribution);
        overlay(&mut s.diversity_seed, self.diversity_seed, "diversity_seed", &source, attribution);
        overlay(&mut s.flux_epsilon, self.flux_epsilon, "flux_epsilon", &source, attribution);
        overlay(&mut s.accumulation, self.accumulation, "accumulation", &source, attribution);

        overlay(&mut config.solver.backend, self.backend, "backend", &source, attribution);
        overlay(&mut config.solver.clingo, self.clingo, "clingo", &source, attribution);
        overlay(
            &mut config.solver.grace_secs,
            self.grace.map(|grace| grace.as_secs()),
            "grace_secs",
            &source,
            attribution,
        );

        overlay(&mut config.encoding.dir, self.encoding_dir, "encoding_dir", &source, attribution);
        overlay(&mut config.oracle.command, self.oracle_command, "oracle_command", &source, attribution);
        overlay(
            &mut config.oracle.timeout_secs,
            self.oracle_timeout.map(|timeout| timeout.as_secs()),
            "oracle_timeout_secs",
            &source,
            attribution,
        );
        overlay(&mut config.output.temp_dir, self.temp_dir, "temp_dir", &source, attribution);

        config.validate()?;
        Ok(config)
    }
}
