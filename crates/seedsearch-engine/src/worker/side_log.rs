//! Durable side-channel log of a validated search
//!
//! One JSON record per line, appended and synced before the loop moves on.
//! After a worker is killed, the lines that made it to disk are the recovered
//! result; a torn last line is ignored.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use seedsearch_utils::atomic_write::{append_line_durable, write_file_atomic};

use crate::solution::Solution;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum SideRecord {
    Accepted { solution: Solution, rejected: u64 },
    Checkpoint { rejected: u64 },
}

impl SideRecord {
    fn rejected(&self) -> u64 {
        match self {
            Self::Accepted { rejected, .. } | Self::Checkpoint { rejected } => *rejected,
        }
    }
}

/// What a side log holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recovered {
    pub solutions: Vec<Solution>,
    /// Rejections known at the last durable record
    pub rejected: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideLog {
    path: Utf8PathBuf,
}

impl SideLog {
    /// Open an existing log, or name a future one.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Start an empty log at `path`, discarding any previous content.
    pub fn create(path: impl Into<Utf8PathBuf>) -> Result<Self> {
        let log = Self::new(path);
        write_file_atomic(&log.path, "")?;
        Ok(log)
    }

    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn record_accepted(&self, solution: &Solution, rejected: u64) -> Result<()> {
        self.append(&SideRecord::Accepted {
            solution: solution.clone(),
            rejected,
        })
    }

    pub fn checkpoint(&self, rejected: u64) -> Result<()> {
        self.append(&SideRecord::Checkpoint { rejected })
    }

    fn append(&self, record: &SideRecord) -> Result<()> {
        let line = serde_json::to_string(record).context("Failed to encode side log record")?;
        append_line_durable(&self.path, &line)
    }

    /// Read back every complete record. A missing log recovers nothing.
    pub fn recover(&self) -> Result<Recovered> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path, "No side log to recover");
                return Ok(Recovered::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read side log: {}", self.path));
            }
        };

        let mut recovered = Recovered::default();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SideRecord>(line) {
                Ok(record) => {
                    recovered.rejected = recovered.rejected.max(record.rejected());
                    if let SideRecord::Accepted { solution, .. } = record {
                        recovered.solutions.push(solution);
                    }
                }
                Err(err) => {
                    warn!(path = %self.path, line = index + 1, error = %err, "Skipping unreadable side log record");
                }
            }
        }
        Ok(recovered)
    }

    /// Delete the log once its content has been delivered another way.
    pub fn remove(&self) {
        if let Err(err) = std::fs::remove_file(&self.path)
            && err.kind() != std::io::ErrorKind::NotFound
        {
            warn!(path = %self.path, error = %err, "Failed to remove side log");
        }
    }
}
