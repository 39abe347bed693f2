use std::collections::BTreeMap;

use super::{Config, ConfigSource};

fn source_label(source: Option<&ConfigSource>) -> &'static str {
    match source {
        Some(ConfigSource::Cli) => "cli",
        Some(ConfigSource::Config) => "config",
        Some(ConfigSource::Programmatic) => "programmatic",
        Some(ConfigSource::Default) | None => "default",
    }
}

impl Config {
    /// Effective configuration as `key -> (value, source)`, for `--show-config`
    /// and for the log line printed at the start of a run.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();

        let mut add = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                let source = source_label(self.source_attribution.get(key));
                config.insert(key.to_string(), (value, source.to_string()));
            }
        };

        let search = &self.search;
        add("run_mode", search.run_mode.clone());
        add("subset_minimal", search.subset_minimal.map(|v| v.to_string()));
        add("minimize", search.minimize.map(|v| v.to_string()));
        add("intersection", search.intersection.map(|v| v.to_string()));
        add("union", search.union.map(|v| v.to_string()));
        add("solution_limit", search.solution_limit.map(|v| v.to_string()));
        add("time_limit_minutes", search.time_limit_minutes.map(|v| v.to_string()));
        add("strategy", search.strategy.clone());
        add("diversity_seed", search.diversity_seed.map(|v| v.to_string()));
        add("flux_epsilon", search.flux_epsilon.map(|v| v.to_string()));
        add("accumulation", search.accumulation.map(|v| v.to_string()));

        let solver = &self.solver;
        add("backend", solver.backend.clone());
        add("clingo", solver.clingo.clone());
        add("clingo_lpx", solver.clingo_lpx.as_ref().map(|argv| argv.join(" ")));
        add("configuration", solver.configuration.clone());
        add("opt_strategy", solver.opt_strategy.clone());
        add("grace_secs", solver.grace_secs.map(|v| v.to_string()));
        add("maximize_flux", solver.maximize_flux.map(|v| v.to_string()));

        add("encoding_dir", self.encoding.dir.as_ref().map(ToString::to_string));
        add("oracle_command", self.oracle.command.as_ref().map(|argv| argv.join(" ")));
        add("oracle_timeout_secs", Some(self.oracle_timeout().as_secs().to_string()));
        add("temp_dir", Some(self.temp_dir().to_string()));

        config
    }
}
