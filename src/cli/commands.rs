//! Command implementations

use anyhow::{Context, Result};
use camino::Utf8Path;
use tracing::{debug, info};

use seedsearch_engine::worker::run_job;
use seedsearch_engine::{
    FactSource, Orchestrator, ProcessWorker, SearchOutput, SearchReport, StaticFacts, TimerValue,
    WorkerJob,
};
use seedsearch_runner::NativeRunner;
use seedsearch_utils::atomic_write::write_file_atomic;

use super::args::SearchArgs;
use crate::{Config, SeedSearchError};

/// Execute the `search` command.
pub(super) fn execute_search_command(args: &SearchArgs, config: &Config) -> Result<()> {
    let effective = config.effective_config();
    if args.show_config {
        println!("Effective configuration:");
        for (key, (value, source)) in &effective {
            println!("  {key} = {value}  [{source}]");
        }
        return Ok(());
    }
    for (key, (value, source)) in &effective {
        debug!(key = %key, value = %value, source = %source, "Configuration");
    }

    let facts = StaticFacts::from_file(&args.facts)?
        .with_objectives(args.objectives.iter().cloned())
        .with_subseed(args.subseed)
        .with_keep_import_reactions(args.keep_import_reactions)
        .with_accumulation(config.accumulation());
    info!(
        facts = %args.facts,
        objectives = facts.objectives().len(),
        "Loaded network instance"
    );

    let launcher = ProcessWorker::current_exe().map_err(SeedSearchError::from)?;
    let report = Orchestrator::new(config, &facts, NativeRunner::new(), launcher).run()?;

    print_report(&report);

    if let Some(out) = &args.out {
        write_report(&report, out)?;
        println!("Results written to {out}");
    }
    Ok(())
}

/// Execute the hidden `worker` command: run the job, print the report on stdout.
pub(super) fn execute_worker_command(job_path: &Utf8Path) -> Result<()> {
    let text = std::fs::read_to_string(job_path)
        .with_context(|| format!("Failed to read worker job: {job_path}"))?;
    let job: WorkerJob = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse worker job: {job_path}"))?;
    let report = run_job(&job)?;
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn write_report(report: &SearchReport, path: &Utf8Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report).context("Failed to serialize results")?;
    write_file_atomic(path, &json)
}

fn timer_text(value: TimerValue) -> String {
    match value {
        TimerValue::Seconds(secs) => format!("{secs:.3}s"),
        TimerValue::TimedOut => "Time out".to_string(),
        TimerValue::NotComputed => "Not computed".to_string(),
        TimerValue::Failed => "Failed".to_string(),
    }
}

fn summary_line(label: &str, output: &SearchOutput) -> String {
    let mut line = format!(
        "{label}: {} solution(s), solving {}",
        output.solutions.len(),
        timer_text(output.timer.solving_time)
    );
    if let Some(rejected) = output.rejected {
        line.push_str(&format!(", {rejected} rejected"));
    }
    if let Some(optimum) = &output.optimum {
        line.push_str(&format!(", optimum size {}", optimum.size));
    }
    if output.killed {
        line.push_str(" (killed)");
    }
    line
}

fn print_report(report: &SearchReport) {
    println!("{}", report.backend);
    for (label, output) in &report.entries {
        println!("  {}", summary_line(label, output));
        if let Some(note) = &output.note {
            println!("    {note}");
        }
        if let Some(error) = &output.error {
            println!("    error: {error}");
        }
        for solution in &output.solutions {
            let seeds: Vec<&str> = solution.seeds.iter().map(String::as_str).collect();
            println!("    {} ({}): {}", solution.identifier, solution.size, seeds.join(", "));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seedsearch_engine::{Solution, Timer};
    use std::collections::BTreeSet;

    #[test]
    fn test_summary_line_for_timed_out_entry() {
        let mut output = SearchOutput::new(Timer::timed_out());
        output.killed = true;
        output.rejected = Some(12);
        output.solutions.push(Solution::new("model_1", BTreeSet::from(["A".to_string()])));
        assert_eq!(
            summary_line("SUBSET MINIMAL ENUMERATION GUESS-CHECK", &output),
            "SUBSET MINIMAL ENUMERATION GUESS-CHECK: 1 solution(s), solving Time out, 12 rejected (killed)"
        );
    }

    #[test]
    fn test_write_report_is_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = camino::Utf8PathBuf::from_path_buf(dir.path().join("out.json")).unwrap();
        let mut report = SearchReport::new("REASONING");
        report.insert("MINIMIZE OPTIMUM", SearchOutput::new(Timer::from_secs(0.5, 1.25)));

        write_report(&report, &path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["backend"], "REASONING");
        assert_eq!(value["entries"]["MINIMIZE OPTIMUM"]["timer"]["solving_time"], 1.25);
    }
}
