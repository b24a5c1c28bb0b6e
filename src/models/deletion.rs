use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Running totals of a deletion pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionOutcome {
    pub attempted: usize,
    pub deleted_count: usize,
    pub deleted_size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteStatus {
    Completed,
    Cancelled,
}

/// A single file that could not be removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionFailure {
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletionReport {
    pub outcome: DeletionOutcome,
    pub status: DeleteStatus,
    pub total: usize,
    pub failures: Vec<DeletionFailure>,
    pub duration: Duration,
}

impl DeletionReport {
    pub fn skipped(&self) -> usize {
        self.outcome.attempted - self.outcome.deleted_count
    }
}
