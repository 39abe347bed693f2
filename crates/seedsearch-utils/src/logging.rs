//! Structured logging for seedsearch
//!
//! All progress output goes through `tracing`; the CLI installs the subscriber
//! with [`init_tracing`]. Logs are written to stderr so that the worker's stdout
//! stays reserved for its report.

use tracing::{Level, error, info, span};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins when set. Otherwise the filter is `seedsearch=info` or, when
/// `verbose`, `debug` for every seedsearch crate (solver command lines, oracle
/// verdicts, exclusion programs).
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(verbose)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "seedsearch=debug,seedsearch_engine=debug,seedsearch_runner=debug,seedsearch_config=debug,warn"
    } else {
        "seedsearch=info,seedsearch_engine=info,seedsearch_runner=warn,warn"
    }
}

/// Span wrapping one sub-search (one labeled entry of the search output).
pub fn sub_search_span(label: &str, strategy: &str) -> tracing::Span {
    span!(
        Level::INFO,
        "sub_search",
        label = %label,
        strategy = %strategy,
    )
}

/// Log the end of a sub-search with its outcome.
pub fn log_sub_search_complete(label: &str, solutions: usize, rejected: Option<u64>, killed: bool) {
    info!(
        label = %label,
        solutions,
        rejected = rejected.unwrap_or(0),
        killed,
        "Sub-search finished"
    );
}

/// Log a sub-search that ended with a process-level failure.
pub fn log_sub_search_error(label: &str, error: &str) {
    error!(label = %label, error = %error, "Sub-search failed");
}
