//! Solutions and the per-sub-search output tree

use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// One seed set returned by a search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub identifier: String,
    pub seeds: BTreeSet<String>,
    pub size: usize,
    /// Seeds whose export reaction avoids accumulation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accumulation_avoid: Option<BTreeSet<String>>,
    /// Cost vector reported by the solver, highest priority first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub costs: Vec<i64>,
    /// Objective flux confirmed by the feasibility oracle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flux: Option<f64>,
    /// Reaction fluxes assigned by a hybrid solver
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub reaction_flux: BTreeMap<String, f64>,
}

impl Solution {
    #[must_use]
    pub fn new(identifier: impl Into<String>, seeds: BTreeSet<String>) -> Self {
        Self {
            identifier: identifier.into(),
            size: seeds.len(),
            seeds,
            accumulation_avoid: None,
            costs: Vec::new(),
            flux: None,
            reaction_flux: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_flux(mut self, flux: f64) -> Self {
        self.flux = Some(flux);
        self
    }

    #[must_use]
    pub fn with_costs(mut self, costs: Vec<i64>) -> Self {
        self.costs = costs;
        self
    }

    /// Rename, keeping the content. Used when solutions are renumbered.
    #[must_use]
    pub fn renamed(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Fluxes of `objectives` present in this solution, one `"R" = v` line each.
    #[must_use]
    pub fn objective_display(&self, objectives: &[String]) -> String {
        objectives
            .iter()
            .filter_map(|reaction| {
                self.reaction_flux
                    .get(reaction)
                    .map(|flux| format!("\"{reaction}\" = {flux}\n"))
            })
            .collect()
    }
}

/// Named components of a minimize cost vector.
///
/// With two objectives the first (highest priority) is the negated number of
/// produced targets and the second the seed-set size; with one objective it is
/// the size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimumDecomposition {
    pub costs: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produced_targets: Option<i64>,
    pub size: i64,
}

impl OptimumDecomposition {
    #[must_use]
    pub fn from_costs(costs: &[i64]) -> Self {
        let (produced_targets, size) = match costs {
            [] => (None, 0),
            [size] => (None, *size),
            [produced, size, ..] => (Some(*produced), *size),
        };
        Self {
            costs: costs.to_vec(),
            produced_targets,
            size,
        }
    }

    /// Optimum of a model without any seed.
    #[must_use]
    pub fn zero() -> Self {
        Self::from_costs(&[])
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.size == 0
    }
}

// ============================================================================
// Timers
// ============================================================================

/// A timer entry: seconds, or why there is no number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimerValue {
    Seconds(f64),
    TimedOut,
    NotComputed,
    Failed,
}

impl TimerValue {
    #[must_use]
    pub fn from_secs(secs: f64) -> Self {
        Self::Seconds((secs * 1000.0).round() / 1000.0)
    }

    #[must_use]
    pub fn from_duration(duration: Duration) -> Self {
        Self::from_secs(duration.as_secs_f64())
    }

    #[must_use]
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

impl Serialize for TimerValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Seconds(secs) => serializer.serialize_f64(*secs),
            Self::TimedOut => serializer.serialize_str("Time out"),
            Self::NotComputed => serializer.serialize_str("Not computed"),
            Self::Failed => serializer.serialize_str("Failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Timer {
    pub grounding_time: TimerValue,
    pub solving_time: TimerValue,
}

impl Timer {
    #[must_use]
    pub fn new(grounding_time: TimerValue, solving_time: TimerValue) -> Self {
        Self {
            grounding_time,
            solving_time,
        }
    }

    #[must_use]
    pub fn from_secs(grounding: f64, solving: f64) -> Self {
        Self::new(TimerValue::from_secs(grounding), TimerValue::from_secs(solving))
    }

    #[must_use]
    pub fn timed_out() -> Self {
        Self::new(TimerValue::TimedOut, TimerValue::TimedOut)
    }

    #[must_use]
    pub fn not_computed() -> Self {
        Self::new(TimerValue::NotComputed, TimerValue::NotComputed)
    }

    #[must_use]
    pub fn failed() -> Self {
        Self::new(TimerValue::Failed, TimerValue::Failed)
    }
}

// ============================================================================
// Output tree
// ============================================================================

fn serialize_solutions<S: Serializer>(solutions: &[Solution], serializer: S) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(solutions.len()))?;
    for solution in solutions {
        map.serialize_entry(&solution.identifier, solution)?;
    }
    map.end()
}

/// Result of one labeled sub-search. Never mutated after the sub-search ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchOutput {
    pub timer: Timer,
    pub memory_peak_gb: Option<f64>,
    /// Solutions in the order they were found, serialized as `identifier -> solution`
    #[serde(serialize_with = "serialize_solutions")]
    pub solutions: Vec<Solution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected: Option<u64>,
    pub killed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimum: Option<OptimumDecomposition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchOutput {
    #[must_use]
    pub fn new(timer: Timer) -> Self {
        Self {
            timer,
            memory_peak_gb: None,
            solutions: Vec::new(),
            rejected: None,
            killed: false,
            optimum: None,
            note: None,
            error: None,
        }
    }

    /// Entry for a sub-search that was skipped, with the reason.
    #[must_use]
    pub fn not_computed(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..Self::new(Timer::not_computed())
        }
    }

    /// Entry for a sub-search whose process failed.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(Timer::failed())
        }
    }

    #[must_use]
    pub fn solution(&self, identifier: &str) -> Option<&Solution> {
        self.solutions.iter().find(|s| s.identifier == identifier)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }
}

fn serialize_entries<S: Serializer>(
    entries: &[(String, SearchOutput)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(entries.len()))?;
    for (label, output) in entries {
        map.serialize_entry(label, output)?;
    }
    map.end()
}

/// Every sub-search of one run, keyed by label in execution order.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub backend: String,
    pub started_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_entries")]
    pub entries: Vec<(String, SearchOutput)>,
}

impl SearchReport {
    #[must_use]
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            started_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    /// Record a finished sub-search. A label seen before is replaced in place.
    pub fn insert(&mut self, label: impl Into<String>, output: SearchOutput) {
        let label = label.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, slot)) => *slot = output,
            None => self.entries.push((label, output)),
        }
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&SearchOutput> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, output)| output)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(label, _)| label.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
