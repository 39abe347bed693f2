use std::time::Duration;

use seedsearch_utils::error::{ConfigError, SeedSearchError};
use seedsearch_utils::types::{SolveStrategy, SolverBackend};

use super::Config;

fn invalid(key: &str, value: impl Into<String>) -> SeedSearchError {
    SeedSearchError::Config(ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.into(),
    })
}

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), SeedSearchError> {
        // Enumerated strings must parse
        self.run_mode()?;
        let strategies = self.strategies()?;
        let backend = self.backend()?;

        if let Some(limit) = self.search.solution_limit
            && limit < -1
        {
            return Err(invalid(
                "solution_limit",
                format!("{limit} (must be -1, 0 or positive)"),
            ));
        }

        if let Some(minutes) = self.search.time_limit_minutes
            && (!minutes.is_finite()
                || minutes < 0.0
                || Duration::try_from_secs_f64(minutes * 60.0).is_err())
        {
            return Err(invalid(
                "time_limit_minutes",
                format!("{minutes} (must be 0 or a positive number of minutes)"),
            ));
        }

        if let Some(epsilon) = self.search.flux_epsilon
            && (!epsilon.is_finite() || epsilon < 0.0)
        {
            return Err(invalid("flux_epsilon", format!("{epsilon} (must not be negative)")));
        }

        if !self.search.subset_minimal.unwrap_or(false) && !self.search.minimize.unwrap_or(false) {
            return Err(invalid(
                "search",
                "neither subset_minimal nor minimize is enabled",
            ));
        }

        if backend == SolverBackend::Hybrid && strategies != [SolveStrategy::Classic] {
            return Err(invalid(
                "strategy",
                "the hybrid backend only runs the classic strategy",
            ));
        }

        if let Some(clingo) = &self.solver.clingo
            && clingo.trim().is_empty()
        {
            return Err(invalid("clingo", "program must not be empty"));
        }

        if let Some(argv) = &self.solver.clingo_lpx
            && argv.first().is_none_or(|program| program.trim().is_empty())
        {
            return Err(invalid("clingo_lpx", "command must name a program"));
        }

        if let Some(argv) = &self.oracle.command
            && argv.first().is_none_or(|program| program.trim().is_empty())
        {
            return Err(invalid("oracle_command", "command must name a program"));
        }

        if self.oracle.timeout_secs == Some(0) {
            return Err(invalid("oracle_timeout_secs", "must be greater than 0"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error_key(err: SeedSearchError) -> String {
        match err {
            SeedSearchError::Config(ConfigError::InvalidValue { key, .. }) => key,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(Config::with_defaults().validate().is_ok());
    }

    #[test]
    fn test_solution_limit_bounds() {
        let mut config = Config::with_defaults();
        config.search.solution_limit = Some(-1);
        assert!(config.validate().is_ok());
        config.search.solution_limit = Some(-3);
        assert_eq!(error_key(config.validate().unwrap_err()), "solution_limit");
    }

    #[test]
    fn test_negative_time_limit_rejected() {
        let mut config = Config::with_defaults();
        config.search.time_limit_minutes = Some(-0.5);
        assert_eq!(error_key(config.validate().unwrap_err()), "time_limit_minutes");
    }

    #[test]
    fn test_time_limit_beyond_duration_rejected() {
        let mut config = Config::with_defaults();
        config.search.time_limit_minutes = Some(1e300);
        assert_eq!(error_key(config.validate().unwrap_err()), "time_limit_minutes");
        config.search.time_limit_minutes = Some(525_600.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_no_search_mode_rejected() {
        let mut config = Config::with_defaults();
        config.search.subset_minimal = Some(false);
        config.search.minimize = Some(false);
        assert_eq!(error_key(config.validate().unwrap_err()), "search");
    }

    #[test]
    fn test_hybrid_requires_classic() {
        let mut config = Config::with_defaults();
        config.solver.backend = Some("hybrid".to_string());
        assert!(config.validate().is_ok());
        config.search.strategy = Some("filter".to_string());
        assert_eq!(error_key(config.validate().unwrap_err()), "strategy");
    }

    #[test]
    fn test_empty_oracle_command_rejected() {
        let mut config = Config::with_defaults();
        config.oracle.command = Some(Vec::new());
        assert_eq!(error_key(config.validate().unwrap_err()), "oracle_command");
    }

    #[test]
    fn test_unknown_run_mode_rejected() {
        let mut config = Config::with_defaults();
        config.search.run_mode = Some("partial".to_string());
        assert_eq!(error_key(config.validate().unwrap_err()), "run_mode");
    }
}
