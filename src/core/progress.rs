use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::core::classifier;
use crate::models::category::{CategoryKey, Classification};
use crate::models::scan_result::ScanStatistics;

/// Live statistics of one scan generation.
///
/// Every mutation and every snapshot goes through the same mutex, so a reader
/// never sees a category count bumped without its size, or a category bumped
/// without the scan-wide totals.
pub struct StatsTracker {
    stats: Mutex<ScanStatistics>,
    start_time: Instant,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self {
            stats: Mutex::new(ScanStatistics::default()),
            start_time: Instant::now(),
        }
    }

    // Critical sections only add integers, so a poisoned lock still holds
    // consistent totals.
    fn lock(&self) -> MutexGuard<'_, ScanStatistics> {
        self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Classifies `file_name` and, when unwanted, adds it to its category and
    /// to the unwanted totals.
    pub fn record(&self, file_name: &str, size: u64) -> Option<CategoryKey> {
        match classifier::classify(file_name) {
            Classification::Keep => None,
            Classification::Unwanted(key) => {
                let mut stats = self.lock();
                stats.categories.entry(key.clone()).or_default().add(size);
                stats.unwanted_file_count += 1;
                stats.unwanted_total_size += size;
                Some(key)
            }
        }
    }

    /// Counts one visited file and returns the new total.
    pub fn observe_file(&self) -> u64 {
        let mut stats = self.lock();
        stats.files_scanned += 1;
        stats.files_scanned
    }

    pub fn observe_dir(&self) {
        self.lock().dirs_scanned += 1;
    }

    pub fn files_scanned(&self) -> u64 {
        self.lock().files_scanned
    }

    pub fn snapshot(&self) -> ScanStatistics {
        self.lock().clone()
    }

    pub fn files_per_second(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed < f64::EPSILON {
            return 0.0;
        }
        self.files_scanned() as f64 / elapsed
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

impl Default for StatsTracker {
    fn default() -> Self {
        Self::new()
    }
}
