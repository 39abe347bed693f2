//! Mapping from (search mode, search type) to solver flags and output names

use seedsearch_utils::error::QueryError;
use seedsearch_utils::types::{SearchMode, SearchType};

use crate::solution::OptimumDecomposition;

/// Which witnesses of a solver answer are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecodeMode {
    /// Every witness is a solution
    EveryModel,
    /// Only the last witness counts (optimum refinement, consensus)
    LastModel,
}

/// Solver semantics and naming for one query shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryProfile {
    pub search_mode: SearchMode,
    pub search_type: SearchType,
    /// Flags implementing the query; the optimisation flag, when present, is last
    pub flags: Vec<String>,
    /// Key of the sub-search in the search output
    pub label: &'static str,
    /// Fixed solution identifier, `None` for numbered models
    pub model_name: Option<&'static str>,
    pub decode_mode: DecodeMode,
}

impl QueryProfile {
    /// Identifier of the `index`-th (1-based) solution of this query.
    #[must_use]
    pub fn solution_name(&self, index: usize) -> String {
        match self.model_name {
            Some(name) => name.to_string(),
            None => format!("model_{index}"),
        }
    }

    /// Whether the optimisation bound can be appended to the last flag.
    #[must_use]
    pub fn takes_optimum(&self) -> bool {
        self.search_mode == SearchMode::Minimize && self.search_type != SearchType::OneModel
    }
}

fn flags(items: &[&str]) -> Vec<String> {
    items.iter().map(|flag| (*flag).to_string()).collect()
}

/// Solver flags and labels for a query.
///
/// Subset-minimal searches have no optimum and no union; asking for one of
/// those is a contract violation.
pub fn query_profile(mode: SearchMode, search_type: SearchType) -> Result<QueryProfile, QueryError> {
    let (flags, label, model_name, decode_mode) = match (mode, search_type) {
        (SearchMode::Minimize, SearchType::OneModel) => (
            Vec::new(),
            "MINIMIZE OPTIMUM",
            Some("model_one_solution"),
            DecodeMode::LastModel,
        ),
        (SearchMode::Minimize, SearchType::Enumeration) => (
            flags(&["--project=show", "--opt-mode=enum"]),
            "MINIMIZE ENUMERATION",
            None,
            DecodeMode::EveryModel,
        ),
        (SearchMode::Minimize, SearchType::Intersection) => (
            flags(&["--enum-mode=cautious", "--opt-mode=enum"]),
            "MINIMIZE INTERSECTION",
            Some("model_intersection"),
            DecodeMode::LastModel,
        ),
        (SearchMode::Minimize, SearchType::Union) => (
            flags(&["--enum-mode=brave", "--opt-mode=enum"]),
            "MINIMIZE UNION",
            Some("model_union"),
            DecodeMode::LastModel,
        ),
        (SearchMode::SubsetMinimal, SearchType::Enumeration) => (
            flags(&["--heuristic=Domain", "--enum-mode=domRec", "--dom-mod=5,16"]),
            "SUBSET MINIMAL ENUMERATION",
            None,
            DecodeMode::EveryModel,
        ),
        (SearchMode::SubsetMinimal, SearchType::Intersection) => (
            flags(&["--heuristic=Domain", "--enum-mode=cautious", "--dom-mod=5,16"]),
            "SUBSET MINIMAL INTERSECTION",
            Some("model_intersection"),
            DecodeMode::LastModel,
        ),
        (SearchMode::SubsetMinimal, SearchType::OneModel | SearchType::Union) => {
            return Err(QueryError::Unsupported {
                mode: mode.to_string(),
                search_type: search_type.to_string(),
            });
        }
    };

    Ok(QueryProfile {
        search_mode: mode,
        search_type,
        flags,
        label,
        model_name,
        decode_mode,
    })
}

/// Constrain a minimize query to the optimum already found.
///
/// The bound is appended to the last flag (`--opt-mode=enum`), as
/// `,<produced targets>,<size>` or `,<size>`.
pub fn carry_forward_optimum(profile: &mut QueryProfile, optimum: &OptimumDecomposition) {
    if !profile.takes_optimum() {
        return;
    }
    if let Some(last) = profile.flags.last_mut() {
        match optimum.produced_targets {
            Some(produced) => last.push_str(&format!(",{produced},{}", optimum.size)),
            None => last.push_str(&format!(",{}", optimum.size)),
        }
    }
}
