use std::time::Instant;

use crate::models::deletion::{DeleteStatus, DeletionFailure, DeletionOutcome, DeletionReport};
use crate::models::scan_result::CandidateFile;
use crate::models::size::human_readable_size;

use super::cancel::CancellationToken;

/// Removes candidates one at a time, in the order given.
///
/// A file that cannot be removed is logged and skipped; the pass goes on.
/// `on_progress(processed, total)` runs after every attempt.
pub fn delete(
    candidates: &[CandidateFile],
    token: &CancellationToken,
    on_progress: &(dyn Fn(usize, usize) + Sync),
) -> DeletionReport {
    let started = Instant::now();
    let total = candidates.len();
    let mut outcome = DeletionOutcome::default();
    let mut failures = Vec::new();
    let mut status = DeleteStatus::Completed;

    for candidate in candidates {
        if token.is_cancelled() {
            status = DeleteStatus::Cancelled;
            break;
        }

        outcome.attempted += 1;
        match std::fs::remove_file(&candidate.path) {
            Ok(()) => {
                tracing::info!(
                    path = %candidate.path.display(),
                    size = candidate.size,
                    "Deleted: {} ({})",
                    candidate.path.display(),
                    human_readable_size(candidate.size)
                );
                outcome.deleted_count += 1;
                outcome.deleted_size_bytes += candidate.size;
            }
            Err(e) => {
                tracing::warn!(
                    path = %candidate.path.display(),
                    "Error deleting {}: {}",
                    candidate.path.display(),
                    e
                );
                failures.push(DeletionFailure {
                    path: candidate.path.clone(),
                    message: e.to_string(),
                });
            }
        }

        on_progress(outcome.attempted, total);
    }

    let duration = started.elapsed();
    tracing::info!("Cleanup finished in {:.2} seconds", duration.as_secs_f64());
    tracing::info!("Total files deleted: {}", outcome.deleted_count);
    tracing::info!("Total space freed: {}", human_readable_size(outcome.deleted_size_bytes));

    DeletionReport {
        outcome,
        status,
        total,
        failures,
        duration,
    }
}
