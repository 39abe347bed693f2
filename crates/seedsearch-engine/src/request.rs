//! Search requests: what one solver invocation is asked to do

use serde::{Deserialize, Serialize};
use std::time::Duration;

use seedsearch_utils::types::{RunMode, SearchMode, SearchType};

/// How many solutions an enumeration may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum SolutionLimit {
    Unlimited,
    AtMost(u64),
    /// Enumeration disabled; subset-minimal searches still produce one model
    NoEnumeration,
}

impl SolutionLimit {
    /// Interpret the configured integer: 0 unlimited, -1 no enumeration.
    #[must_use]
    pub fn from_raw(raw: i64) -> Self {
        match raw {
            0 => Self::Unlimited,
            n if n < 0 => Self::NoEnumeration,
            n => Self::AtMost(n.unsigned_abs()),
        }
    }

    #[must_use]
    pub fn enumerates(&self) -> bool {
        !matches!(self, Self::NoEnumeration)
    }

    /// Value for the solver's `--models` flag, 0 meaning all.
    #[must_use]
    pub fn models_flag(&self) -> u64 {
        match self {
            Self::Unlimited => 0,
            Self::AtMost(n) => *n,
            Self::NoEnumeration => 1,
        }
    }

    /// Whether `found` solutions satisfy the limit.
    #[must_use]
    pub fn reached(&self, found: usize) -> bool {
        match self {
            Self::Unlimited => false,
            Self::AtMost(n) => found as u64 >= *n,
            Self::NoEnumeration => found >= 1,
        }
    }
}

/// Wall-clock budget of one sub-search. `None` is unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeBudget(Option<Duration>);

impl TimeBudget {
    #[must_use]
    pub const fn unlimited() -> Self {
        Self(None)
    }

    #[must_use]
    pub const fn new(limit: Duration) -> Self {
        Self(Some(limit))
    }

    /// Budget from a configured number of minutes, 0 (or less) meaning unlimited.
    ///
    /// Minutes beyond what a `Duration` holds are unlimited too.
    #[must_use]
    pub fn from_minutes(minutes: f64) -> Self {
        if minutes.is_finite() && minutes > 0.0 {
            Self(Duration::try_from_secs_f64(minutes * 60.0).ok())
        } else {
            Self(None)
        }
    }

    #[must_use]
    pub const fn limit(&self) -> Option<Duration> {
        self.0
    }

    /// Whole seconds for the solver's `--time-limit`, at least 1.
    #[must_use]
    pub fn solver_secs(&self) -> Option<u64> {
        self.0.map(|limit| limit.as_secs().max(1))
    }

    /// How long the parent waits before killing: budget plus grace.
    ///
    /// `Duration::MAX` when unlimited.
    #[must_use]
    pub fn deadline_with_grace(&self, grace: Duration) -> Duration {
        match self.0 {
            Some(limit) => limit.saturating_add(grace),
            None => Duration::MAX,
        }
    }

    /// Whether `spent` uses up the budget.
    #[must_use]
    pub fn exhausted_by(&self, spent: Duration) -> bool {
        self.0.is_some_and(|limit| spent >= limit)
    }

    /// What is left after `spent`. Unlimited stays unlimited.
    #[must_use]
    pub fn remaining_after(&self, spent: Duration) -> Self {
        Self(self.0.map(|limit| limit.saturating_sub(spent)))
    }

    /// Minutes, for messages
    #[must_use]
    pub fn minutes(&self) -> f64 {
        self.0.map_or(0.0, |limit| limit.as_secs_f64() / 60.0)
    }
}

/// One sub-search. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub run_mode: RunMode,
    pub search_mode: SearchMode,
    pub search_type: SearchType,
    pub solution_limit: SolutionLimit,
    pub time_budget: TimeBudget,
}

impl SearchRequest {
    #[must_use]
    pub fn new(
        run_mode: RunMode,
        search_mode: SearchMode,
        search_type: SearchType,
        solution_limit: SolutionLimit,
        time_budget: TimeBudget,
    ) -> Self {
        Self {
            run_mode,
            search_mode,
            search_type,
            solution_limit,
            time_budget,
        }
    }

    /// The same request with another search type.
    #[must_use]
    pub fn with_type(self, search_type: SearchType) -> Self {
        Self {
            search_type,
            ..self
        }
    }

    /// Whether this request asks for the minimize optimum.
    #[must_use]
    pub fn seeks_optimum(&self) -> bool {
        self.search_mode == SearchMode::Minimize && self.search_type == SearchType::OneModel
    }

    /// `--models` value for this request.
    ///
    /// Only enumerations are bounded; optimum and consensus queries need every
    /// model the solver emits.
    #[must_use]
    pub fn models_flag(&self) -> u64 {
        match self.search_type {
            SearchType::Enumeration => self.solution_limit.models_flag(),
            _ => 0,
        }
    }
}
