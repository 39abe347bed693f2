//! Fixed premises of a search: the network instance as logic-program facts

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};

use seedsearch_utils::atomic_write::write_file_atomic;

/// Supplier of the instance a search runs on.
pub trait FactSource {
    /// Logic-program text of the instance
    fn facts(&self) -> &str;

    /// Objective reactions, surfaced in hybrid models
    fn objectives(&self) -> &[String];

    /// Seeds are restricted to a declared subset of possible seeds
    fn is_subseed(&self) -> bool;

    /// Import reactions were kept in the network
    fn keep_import_reactions(&self) -> bool;

    /// Seeds may avoid accumulation through their export reactions
    fn accumulation(&self) -> bool;
}

/// In-memory facts, usually read from a `.lp` file.
#[derive(Debug, Clone, Default)]
pub struct StaticFacts {
    text: String,
    objectives: Vec<String>,
    subseed: bool,
    keep_import_reactions: bool,
    accumulation: bool,
}

impl StaticFacts {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn from_file(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read facts file: {path}"))?;
        Ok(Self::new(text))
    }

    #[must_use]
    pub fn with_objectives<I, S>(mut self, objectives: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.objectives = objectives.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_subseed(mut self, subseed: bool) -> Self {
        self.subseed = subseed;
        self
    }

    #[must_use]
    pub fn with_keep_import_reactions(mut self, keep: bool) -> Self {
        self.keep_import_reactions = keep;
        self
    }

    #[must_use]
    pub fn with_accumulation(mut self, accumulation: bool) -> Self {
        self.accumulation = accumulation;
        self
    }
}

impl FactSource for StaticFacts {
    fn facts(&self) -> &str {
        &self.text
    }

    fn objectives(&self) -> &[String] {
        &self.objectives
    }

    fn is_subseed(&self) -> bool {
        self.subseed
    }

    fn keep_import_reactions(&self) -> bool {
        self.keep_import_reactions
    }

    fn accumulation(&self) -> bool {
        self.accumulation
    }
}

/// Write the instance to `dir/instance.lp` so solver processes can read it.
pub fn write_instance(source: &dyn FactSource, dir: &Utf8Path) -> Result<Utf8PathBuf> {
    let path = dir.join("instance.lp");
    write_file_atomic(&path, source.facts())?;
    Ok(path)
}
