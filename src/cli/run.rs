//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Initialises logging
//! - Builds CliArgs and discovers Config
//! - Dispatches to command handlers
//! - Handles all error output

use anyhow::Result;
use clap::Parser;

use super::args::{Cli, Commands};
use super::commands;

use crate::{Config, ExitCode, SeedSearchError};
use seedsearch_utils::logging::init_tracing;

/// Main CLI execution function.
///
/// Handles ALL output including errors and returns the exit code to use on
/// failure. main.rs only calls `std::process::exit`; it does not print.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Warning: failed to initialise logging: {e}");
    }

    let result = match &cli.command {
        Commands::Search(args) => {
            let cli_args = args.to_cli_args(cli.config.clone());
            match Config::discover(&cli_args) {
                Ok(config) => commands::execute_search_command(args, &config),
                Err(err) => Err(err),
            }
        }
        Commands::Worker { job } => commands::execute_worker_command(job),
    };

    match result {
        Ok(()) => Ok(()),
        Err(error) => Err(report_error(&error)),
    }
}

/// Print an error for the user and pick the exit code.
fn report_error(error: &anyhow::Error) -> ExitCode {
    if let Some(seedsearch_error) = error.downcast_ref::<SeedSearchError>() {
        eprintln!("{}", seedsearch_error.display_for_user());
        return seedsearch_error.to_exit_code();
    }

    eprintln!("✗ {error:#}");
    if let Some(suggestions) = enhance_error_context(error) {
        eprintln!("\n  Suggestions:");
        for (i, suggestion) in suggestions.iter().enumerate() {
            eprintln!("    {}. {}", i + 1, suggestion);
        }
    }
    ExitCode::INTERNAL
}

/// Suggestions for common failures outside the error taxonomy
fn enhance_error_context(error: &anyhow::Error) -> Option<Vec<String>> {
    let error_str = format!("{error:#}");

    if error_str.contains("Failed to read facts file") {
        Some(vec![
            "Verify the facts path exists".to_string(),
            "Convert the network to logic-program facts first".to_string(),
        ])
    } else if error_str.contains("Failed to parse worker job") {
        Some(vec!["The worker subcommand is internal; run `seedsearch search` instead".to_string()])
    } else if error_str.contains("Permission denied") {
        Some(vec![
            "Check file and directory permissions".to_string(),
            "Point --temp-dir at a writable directory".to_string(),
        ])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedsearch_utils::error::{ConfigError, QueryError};

    #[test]
    fn test_exit_code_from_taxonomy() {
        let config = anyhow::Error::new(SeedSearchError::Config(ConfigError::MissingRequired(
            "oracle.command".to_string(),
        )));
        assert_eq!(report_error(&config), ExitCode::CLI_ARGS);

        let query = anyhow::Error::new(SeedSearchError::Query(QueryError::Unsupported {
            mode: "subset-minimal".to_string(),
            search_type: "union".to_string(),
        }));
        assert_eq!(report_error(&query), ExitCode::CLI_ARGS);
    }

    #[test]
    fn test_other_errors_are_internal() {
        let err = anyhow::anyhow!("Failed to read facts file: missing.lp");
        assert!(enhance_error_context(&err).is_some());
        assert_eq!(report_error(&err), ExitCode::INTERNAL);
    }
}
