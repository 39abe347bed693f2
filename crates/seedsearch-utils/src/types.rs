//! Shared enumerations used by configuration and the search engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Source of a configuration value.
///
/// ```rust
/// use seedsearch_utils::types::ConfigSource;
///
/// let json = serde_json::to_string(&ConfigSource::Cli).unwrap();
/// assert_eq!(json, r#""cli""#);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Value provided via CLI argument (highest precedence).
    Cli,
    /// Value loaded from configuration file.
    Config,
    /// Value provided programmatically (e.g., `Config::builder()`).
    Programmatic,
    /// Built-in default value (lowest precedence).
    Default,
}

/// Which targets the seed search must reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Produce the declared targets
    Target,
    /// Produce every producible compound
    Full,
    /// Reach the objective reaction through flux balance
    Fba,
}

/// Minimality notion used by a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    /// No returned set contains another one
    SubsetMinimal,
    /// Smallest cardinality (optionally after maximising produced targets)
    Minimize,
}

/// Shape of the answer requested from a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchType {
    OneModel,
    Enumeration,
    Intersection,
    Union,
}

/// How candidates produced by the solver are confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SolveStrategy {
    /// Solver answers are reported as is
    Classic,
    /// Every enumerated answer is checked by the oracle afterwards
    Filter,
    /// Answers are checked one by one and fed back as constraints
    GuessCheck,
    /// Guess-check with the diversity heuristic
    #[serde(rename = "guess-check-div")]
    GuessCheckDiversity,
}

/// Solver family driven by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverBackend {
    /// Plain ASP solving
    Reasoning,
    /// ASP with linear constraints (flux encoded in the program)
    Hybrid,
}

impl RunMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Target => "target",
            Self::Full => "full",
            Self::Fba => "fba",
        }
    }
}

impl SearchMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SubsetMinimal => "subset-minimal",
            Self::Minimize => "minimize",
        }
    }
}

impl SearchType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneModel => "one-model",
            Self::Enumeration => "enumeration",
            Self::Intersection => "intersection",
            Self::Union => "union",
        }
    }
}

impl SolveStrategy {
    /// Every strategy, in the order `all` runs them.
    pub const ALL: [SolveStrategy; 4] = [
        Self::Classic,
        Self::Filter,
        Self::GuessCheck,
        Self::GuessCheckDiversity,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Filter => "filter",
            Self::GuessCheck => "guess-check",
            Self::GuessCheckDiversity => "guess-check-div",
        }
    }

    /// Suffix appended to output labels for this strategy.
    #[must_use]
    pub const fn label_suffix(&self) -> &'static str {
        match self {
            Self::Classic => "",
            Self::Filter => " FILTER",
            Self::GuessCheck => " GUESS-CHECK",
            Self::GuessCheckDiversity => " GUESS-CHECK-DIVERSITY",
        }
    }

    /// Whether candidates go through the feasibility oracle.
    #[must_use]
    pub const fn is_validated(&self) -> bool {
        !matches!(self, Self::Classic)
    }

    /// Parse a strategy selection, where `all` expands to every strategy.
    pub fn parse_selection(value: &str) -> Result<Vec<SolveStrategy>, String> {
        if value.eq_ignore_ascii_case("all") {
            return Ok(Self::ALL.to_vec());
        }
        value.parse().map(|strategy| vec![strategy])
    }
}

impl SolverBackend {
    /// Heading used for results of this backend.
    #[must_use]
    pub const fn label(&self, run_mode: RunMode) -> &'static str {
        match (self, run_mode) {
            (Self::Reasoning, _) => "REASONING",
            (Self::Hybrid, RunMode::Fba) => "FBA",
            (Self::Hybrid, _) => "HYBRID",
        }
    }
}

macro_rules! display_and_parse {
    ($ty:ty, $what:literal, [$($variant:expr),+ $(,)?]) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
                [$($variant),+]
                    .into_iter()
                    .find(|candidate: &$ty| candidate.as_str() == wanted)
                    .ok_or_else(|| format!("Unknown {}: {s}", $what))
            }
        }
    };
}

display_and_parse!(RunMode, "run mode", [RunMode::Target, RunMode::Full, RunMode::Fba]);
display_and_parse!(
    SearchMode,
    "search mode",
    [SearchMode::SubsetMinimal, SearchMode::Minimize]
);
display_and_parse!(
    SearchType,
    "search type",
    [
        SearchType::OneModel,
        SearchType::Enumeration,
        SearchType::Intersection,
        SearchType::Union,
    ]
);
display_and_parse!(
    SolveStrategy,
    "solve strategy",
    [
        SolveStrategy::Classic,
        SolveStrategy::Filter,
        SolveStrategy::GuessCheck,
        SolveStrategy::GuessCheckDiversity,
    ]
);

impl SolverBackend {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Reasoning => "reasoning",
            Self::Hybrid => "hybrid",
        }
    }
}

display_and_parse!(
    SolverBackend,
    "solver backend",
    [SolverBackend::Reasoning, SolverBackend::Hybrid]
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_snake_and_kebab_case() {
        assert_eq!("subset_minimal".parse::<SearchMode>(), Ok(SearchMode::SubsetMinimal));
        assert_eq!("one-model".parse::<SearchType>(), Ok(SearchType::OneModel));
        assert_eq!("FBA".parse::<RunMode>(), Ok(RunMode::Fba));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "cardinal".parse::<SearchMode>().unwrap_err();
        assert!(err.contains("search mode"));
    }

    #[test]
    fn test_strategy_selection_all() {
        let all = SolveStrategy::parse_selection("all").unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], SolveStrategy::Classic);
        assert_eq!(
            SolveStrategy::parse_selection("guess-check-div").unwrap(),
            vec![SolveStrategy::GuessCheckDiversity]
        );
    }

    #[test]
    fn test_label_suffixes() {
        assert_eq!(SolveStrategy::Classic.label_suffix(), "");
        assert_eq!(
            SolveStrategy::GuessCheckDiversity.label_suffix(),
            " GUESS-CHECK-DIVERSITY"
        );
        assert!(!SolveStrategy::Classic.is_validated());
        assert!(SolveStrategy::Filter.is_validated());
    }

    #[test]
    fn test_backend_labels() {
        assert_eq!(SolverBackend::Reasoning.label(RunMode::Fba), "REASONING");
        assert_eq!(SolverBackend::Hybrid.label(RunMode::Fba), "FBA");
        assert_eq!(SolverBackend::Hybrid.label(RunMode::Target), "HYBRID");
    }

    #[test]
    fn test_serde_names_match_display() {
        let json = serde_json::to_string(&SolveStrategy::GuessCheckDiversity).unwrap();
        assert_eq!(json, r#""guess-check-div""#);
        let json = serde_json::to_string(&SearchMode::SubsetMinimal).unwrap();
        assert_eq!(json, r#""subset-minimal""#);
    }
}
