use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use super::category::{CategoryKey, CategoryStats};
use crate::error::TraversalError;

/// A file selected for deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFile {
    pub path: PathBuf,
    pub size: u64,
}

/// Running totals of one scan generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanStatistics {
    pub categories: BTreeMap<CategoryKey, CategoryStats>,
    pub files_scanned: u64,
    pub dirs_scanned: u64,
    pub unwanted_file_count: u64,
    pub unwanted_total_size: u64,
}

impl ScanStatistics {
    pub fn category(&self, key: &str) -> Option<&CategoryStats> {
        self.categories
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, stats)| stats)
    }

    /// Whether the unwanted totals equal the sum over all categories.
    pub fn is_consistent(&self) -> bool {
        let count: u64 = self.categories.values().map(|s| s.count).sum();
        let size: u64 = self.categories.values().map(|s| s.total_size_bytes).sum();
        count == self.unwanted_file_count && size == self.unwanted_total_size
    }
}

/// How a scan ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanOutcome {
    Completed,
    Cancelled,
    Failed(TraversalError),
}

impl ScanOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ScanOutcome::Completed)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScanOutcome::Cancelled)
    }
}

/// An entry the scanner could not read but skipped past.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanError {
    pub path: PathBuf,
    pub error_type: ScanErrorType,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanErrorType {
    PermissionDenied,
    NotFound,
    IoError,
    Other,
}

impl From<std::io::ErrorKind> for ScanErrorType {
    fn from(kind: std::io::ErrorKind) -> Self {
        match kind {
            std::io::ErrorKind::PermissionDenied => ScanErrorType::PermissionDenied,
            std::io::ErrorKind::NotFound => ScanErrorType::NotFound,
            std::io::ErrorKind::Other => ScanErrorType::Other,
            _ => ScanErrorType::IoError,
        }
    }
}

/// Everything a finished scan hands to its caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_path: PathBuf,
    pub candidates: Vec<CandidateFile>,
    pub statistics: ScanStatistics,
    pub outcome: ScanOutcome,
    pub errors: Vec<ScanError>,
    pub scan_duration: Duration,
    pub timestamp: SystemTime,
}
