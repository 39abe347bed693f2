//! Candidate generation: one solver answer under the current exclusions

use anyhow::Context;
use camino::Utf8PathBuf;
use tracing::debug;

use seedsearch_runner::ProcessRunner;
use seedsearch_utils::atomic_write::write_file_atomic;
use seedsearch_utils::error::SeedSearchError;

use super::diversity::{Diversity, ensure_domain_heuristic};
use super::exclusion::ExclusionState;
use crate::decoder::DecodedModel;
use crate::query::DecodeMode;
use crate::request::TimeBudget;
use crate::solver::SolverSetup;

/// Result of asking for one candidate.
#[derive(Debug, Clone, Default)]
pub struct CandidateAnswer {
    /// `None` when no model is left (or the call ran out of time)
    pub candidate: Option<DecodedModel>,
    pub grounding_secs: f64,
    pub solving_secs: f64,
    /// The call hit its deadline
    pub killed: bool,
}

impl CandidateAnswer {
    #[must_use]
    pub fn found(candidate: DecodedModel) -> Self {
        Self {
            candidate: Some(candidate),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn exhausted() -> Self {
        Self::default()
    }
}

pub trait CandidateSolver {
    /// Next candidate respecting `exclusions`, nudged by `diversity` when given.
    fn next_candidate(
        &mut self,
        exclusions: &ExclusionState,
        diversity: Option<&Diversity>,
        budget: TimeBudget,
    ) -> Result<CandidateAnswer, SeedSearchError>;
}

/// Re-invokes the solver with exclusions written to an extra program file.
///
/// In optimum mode the solver optimises and the last (optimal) model is the
/// candidate; otherwise the first model is.
pub struct ProcessCandidateSolver<R> {
    setup: SolverSetup,
    flags: Vec<String>,
    optimum: bool,
    program_path: Utf8PathBuf,
    runner: R,
}

impl<R: ProcessRunner> ProcessCandidateSolver<R> {
    #[must_use]
    pub fn new(
        setup: SolverSetup,
        flags: Vec<String>,
        optimum: bool,
        program_path: impl Into<Utf8PathBuf>,
        runner: R,
    ) -> Self {
        let program_path = program_path.into();
        Self {
            setup: setup.with_extra_file(program_path.clone()),
            flags,
            optimum,
            program_path,
            runner,
        }
    }
}

impl<R: ProcessRunner> CandidateSolver for ProcessCandidateSolver<R> {
    fn next_candidate(
        &mut self,
        exclusions: &ExclusionState,
        diversity: Option<&Diversity>,
        budget: TimeBudget,
    ) -> Result<CandidateAnswer, SeedSearchError> {
        if exclusions.rejects_everything() {
            debug!("Every candidate is excluded");
            return Ok(CandidateAnswer::exhausted());
        }

        let mut program = exclusions.render();
        let mut flags = self.flags.clone();
        if let Some(diversity) = diversity {
            program.push_str(&diversity.render());
            ensure_domain_heuristic(&mut flags);
        }
        write_file_atomic(&self.program_path, &program)
            .with_context(|| format!("Failed to write exclusions to {}", self.program_path))
            .map_err(|e| SeedSearchError::Io(std::io::Error::other(format!("{e:#}"))))?;

        let (models, mode) = if self.optimum {
            (0, DecodeMode::LastModel)
        } else {
            (1, DecodeMode::EveryModel)
        };
        let answer = self.setup.invoke(&self.runner, &flags, models, budget, mode)?;

        let solving_secs = answer
            .decoded
            .solving_secs
            .unwrap_or_else(|| answer.elapsed.as_secs_f64());
        Ok(CandidateAnswer {
            candidate: if answer.killed {
                None
            } else {
                answer.decoded.models.into_iter().next()
            },
            grounding_secs: answer.decoded.grounding_secs.unwrap_or(0.0),
            solving_secs,
            killed: answer.killed,
        })
    }
}
