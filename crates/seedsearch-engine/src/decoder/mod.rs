//! Result decoding for clingo / clingo-lpx JSON output (`--outf=2`)
//!
//! Decoding never fails: text that cannot be parsed, even after repair, is
//! reported as a run with no models and a `warn!` event.

mod atoms;
mod repair;

pub use repair::repair_json;

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use crate::query::DecodeMode;
use crate::solution::Solution;
use atoms::{parse_atom, parse_flux};

/// Outcome marker of a solver answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    Satisfiable,
    OptimumFound,
    Unsatisfiable,
    /// Interrupted before a verdict, or no readable marker
    Unknown,
}

impl SolveOutcome {
    fn from_marker(marker: &str) -> Self {
        match marker.trim() {
            "SATISFIABLE" => Self::Satisfiable,
            "OPTIMUM FOUND" => Self::OptimumFound,
            "UNSATISFIABLE" => Self::Unsatisfiable,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn is_unsatisfiable(&self) -> bool {
        matches!(self, Self::Unsatisfiable)
    }
}

/// Content of one retained witness.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecodedModel {
    pub seeds: BTreeSet<String>,
    pub accumulation_avoid: Option<BTreeSet<String>>,
    pub reaction_flux: BTreeMap<String, f64>,
    pub costs: Vec<i64>,
}

impl DecodedModel {
    /// Fluxes of the given objective reactions present in this model.
    #[must_use]
    pub fn objective_flux(&self, objectives: &[String]) -> BTreeMap<String, f64> {
        objectives
            .iter()
            .filter_map(|r| self.reaction_flux.get(r).map(|v| (r.clone(), *v)))
            .collect()
    }

    #[must_use]
    pub fn into_solution(self, identifier: impl Into<String>) -> Solution {
        let mut solution = Solution::new(identifier, self.seeds).with_costs(self.costs);
        solution.accumulation_avoid = self.accumulation_avoid;
        solution.reaction_flux = self.reaction_flux;
        solution
    }
}

/// Everything a solver answer yields.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRun {
    pub outcome: SolveOutcome,
    pub models: Vec<DecodedModel>,
    /// `Time.Total - Time.Solve`, when the summary was emitted
    pub grounding_secs: Option<f64>,
    pub solving_secs: Option<f64>,
    /// The text was truncated and had to be repaired
    pub repaired: bool,
}

impl DecodedRun {
    fn empty() -> Self {
        Self {
            outcome: SolveOutcome::Unknown,
            models: Vec::new(),
            grounding_secs: None,
            solving_secs: None,
            repaired: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ClingoOutput {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    call: Vec<ClingoCall>,
    #[serde(default)]
    time: Option<ClingoTime>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ClingoCall {
    #[serde(default)]
    witnesses: Vec<ClingoWitness>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ClingoWitness {
    #[serde(default)]
    value: Vec<String>,
    #[serde(default)]
    costs: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ClingoTime {
    total: Option<f64>,
    solve: Option<f64>,
}

/// Decode solver output.
///
/// When the process was `killed`, output that does not parse is repaired
/// first, keeping only fully emitted witnesses.
#[must_use]
pub fn decode(text: &str, mode: DecodeMode, killed: bool) -> DecodedRun {
    if text.trim().is_empty() {
        return DecodedRun::empty();
    }

    let (parsed, repaired) = match serde_json::from_str::<ClingoOutput>(text) {
        Ok(parsed) => (parsed, false),
        Err(err) if killed => {
            debug!(error = %err, "Solver output truncated, repairing");
            let Some(fixed) = repair_json(text) else {
                warn!("Truncated solver output could not be repaired");
                return DecodedRun::empty();
            };
            match serde_json::from_str::<ClingoOutput>(&fixed) {
                Ok(parsed) => (parsed, true),
                Err(err) => {
                    warn!(error = %err, "Repaired solver output is still invalid");
                    return DecodedRun::empty();
                }
            }
        }
        Err(err) => {
            warn!(error = %err, "Solver output is not valid JSON");
            return DecodedRun::empty();
        }
    };

    let outcome = parsed
        .result
        .as_deref()
        .map_or(SolveOutcome::Unknown, SolveOutcome::from_marker);

    let (grounding_secs, solving_secs) = match parsed.time {
        Some(ClingoTime { total, solve }) => {
            let grounding = match (total, solve) {
                (Some(total), Some(solve)) => Some((total - solve).max(0.0)),
                _ => None,
            };
            (grounding, solve)
        }
        None => (None, None),
    };

    let models = if outcome.is_unsatisfiable() {
        Vec::new()
    } else {
        let witnesses = parsed
            .call
            .into_iter()
            .next()
            .map(|call| call.witnesses)
            .unwrap_or_default();
        match mode {
            DecodeMode::EveryModel => witnesses.into_iter().map(decode_witness).collect(),
            DecodeMode::LastModel => witnesses
                .into_iter()
                .last()
                .map(decode_witness)
                .into_iter()
                .collect(),
        }
    };

    DecodedRun {
        outcome,
        models,
        grounding_secs,
        solving_secs,
        repaired,
    }
}

fn decode_witness(witness: ClingoWitness) -> DecodedModel {
    let mut model = DecodedModel {
        costs: witness.costs.iter().map(|c| c.round() as i64).collect(),
        ..DecodedModel::default()
    };

    for atom in &witness.value {
        let Some((name, args)) = parse_atom(atom) else {
            debug!(atom = %atom, "Skipping malformed atom");
            continue;
        };
        match (name, args.as_slice()) {
            ("seed", [metabolite, ..]) => {
                model.seeds.insert(metabolite.clone());
            }
            ("seed_accu", [metabolite, ..]) => {
                model
                    .accumulation_avoid
                    .get_or_insert_with(BTreeSet::new)
                    .insert(metabolite.clone());
            }
            ("__lpx", [reaction, value]) => {
                if let Some(flux) = parse_flux(value) {
                    model.reaction_flux.insert(reaction.clone(), flux);
                }
            }
            _ => {}
        }
    }
    model
}
