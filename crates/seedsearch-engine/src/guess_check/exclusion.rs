//! Constraints excluding seed sets already decided by the oracle

use std::collections::BTreeSet;
use std::fmt::Write as _;

/// One excluded seed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exclusion {
    /// The set and every superset of it
    Superset(BTreeSet<String>),
    /// Exactly this set
    Exact(BTreeSet<String>),
}

impl Exclusion {
    fn excludes(&self, candidate: &BTreeSet<String>) -> bool {
        match self {
            Self::Superset(seeds) => seeds.is_subset(candidate),
            Self::Exact(seeds) => seeds == candidate,
        }
    }

    fn render(&self, out: &mut String) {
        let seeds = match self {
            Self::Superset(seeds) | Self::Exact(seeds) => seeds,
        };
        if seeds.is_empty() {
            out.push_str(":- #true.\n");
            return;
        }
        out.push_str(":- ");
        let body: Vec<String> = seeds
            .iter()
            .map(|seed| format!("seed(\"{}\",_)", escape(seed)))
            .collect();
        out.push_str(&body.join(", "));
        if let Self::Exact(seeds) = self {
            let _ = write!(out, ", #count{{M: seed(M,_)}} = {}", seeds.len());
        }
        out.push_str(".\n");
    }
}

fn escape(seed: &str) -> String {
    seed.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Exclusions accumulated by one guess-and-validate loop.
///
/// Only grows while the loop runs; reset between independent searches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionState {
    exclusions: Vec<Exclusion>,
}

impl ExclusionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude `seeds` and all of its supersets (rejected candidates).
    pub fn exclude_with_supersets(&mut self, seeds: &BTreeSet<String>) {
        self.exclusions.push(Exclusion::Superset(seeds.clone()));
    }

    /// Exclude exactly `seeds` (accepted candidates).
    pub fn exclude_exact(&mut self, seeds: &BTreeSet<String>) {
        self.exclusions.push(Exclusion::Exact(seeds.clone()));
    }

    #[must_use]
    pub fn excludes(&self, candidate: &BTreeSet<String>) -> bool {
        self.exclusions.iter().any(|e| e.excludes(candidate))
    }

    /// An excluded empty set with supersets forbids every candidate.
    #[must_use]
    pub fn rejects_everything(&self) -> bool {
        self.exclusions
            .iter()
            .any(|e| matches!(e, Exclusion::Superset(seeds) if seeds.is_empty()))
    }

    /// Integrity constraints, one per line.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for exclusion in &self.exclusions {
            exclusion.render(&mut out);
        }
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exclusions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exclusions.is_empty()
    }

    pub fn reset(&mut self) {
        self.exclusions.clear();
    }
}
