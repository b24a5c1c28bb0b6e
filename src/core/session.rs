use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use tokio::task::JoinHandle;

use crate::config::settings::Settings;
use crate::error::SessionError;
use crate::models::deletion::DeletionReport;
use crate::models::scan_result::{CandidateFile, ScanReport, ScanStatistics};

use super::cancel::CancellationToken;
use super::eraser;
use super::events::{Event, EventSender};
use super::progress::StatsTracker;
use super::scanner::Scanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Scanning,
    ScanComplete,
    Deleting,
}

/// Mutable state of the current scan generation.
struct Inner {
    generation: u64,
    phase: Phase,
    token: Option<CancellationToken>,
    stats: Option<Arc<StatsTracker>>,
    /// Report of a completed scan awaiting confirmation.
    pending: Option<Arc<ScanReport>>,
}

/// Drives one scan-then-delete lifecycle at a time.
///
/// Work runs on the tokio blocking pool; progress and completion are
/// delivered as [`Event`]s. Every started phase ends with exactly one
/// completion event, whether it finished, failed or was cancelled.
pub struct Session {
    settings: Arc<Settings>,
    event_tx: EventSender,
    inner: Arc<Mutex<Inner>>,
}

impl Session {
    pub fn new(settings: Settings, event_tx: EventSender) -> Self {
        Self {
            settings: Arc::new(settings),
            event_tx,
            inner: Arc::new(Mutex::new(Inner {
                generation: 0,
                phase: Phase::Idle,
                token: None,
                stats: None,
                pending: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Snapshot of the current generation's statistics, if a scan has run.
    pub fn snapshot(&self) -> Option<ScanStatistics> {
        self.lock().stats.as_ref().map(|s| s.snapshot())
    }

    pub fn files_per_second(&self) -> f64 {
        self.lock()
            .stats
            .as_ref()
            .map(|s| s.files_per_second())
            .unwrap_or(0.0)
    }

    /// Candidates waiting for confirmation after a completed scan.
    pub fn pending_candidates(&self) -> Vec<CandidateFile> {
        self.lock()
            .pending
            .as_ref()
            .map(|report| report.candidates.clone())
            .unwrap_or_default()
    }

    /// Cancels whatever phase is running. No-op when idle.
    pub fn request_cancel(&self) {
        if let Some(token) = &self.lock().token {
            tracing::debug!("cancellation requested");
            token.cancel();
        }
    }

    /// Drops a completed scan's candidates without deleting anything.
    pub fn discard(&self) {
        let mut inner = self.lock();
        if inner.phase == Phase::ScanComplete {
            inner.phase = Phase::Idle;
            inner.pending = None;
        }
    }

    /// Starts a new scan generation rooted at `root`.
    ///
    /// A phase still running from the previous generation is cancelled and
    /// its statistics and candidates are discarded.
    pub fn start_scan(&self, root: PathBuf) -> JoinHandle<Arc<ScanReport>> {
        let token = CancellationToken::new();
        let stats = Arc::new(StatsTracker::new());

        let generation = {
            let mut inner = self.lock();
            if let Some(previous) = inner.token.take() {
                previous.cancel();
            }
            inner.generation += 1;
            inner.phase = Phase::Scanning;
            inner.token = Some(token.clone());
            inner.stats = Some(Arc::clone(&stats));
            inner.pending = None;
            inner.generation
        };

        tracing::debug!(generation, root = %root.display(), "scan started");
        let _ = self.event_tx.send(Event::ScanStarted {
            generation,
            path: root.clone(),
        });

        let scanner = Scanner::new(Arc::clone(&self.settings), stats);
        let event_tx = self.event_tx.clone();
        let inner = Arc::clone(&self.inner);

        tokio::task::spawn_blocking(move || {
            let progress_tx = event_tx.clone();
            let on_progress = move |stats: &ScanStatistics| {
                let _ = progress_tx.send(Event::ScanProgress {
                    generation,
                    stats: stats.clone(),
                });
            };

            let run = scanner.scan(&root, &token, &on_progress);
            let report = Arc::new(ScanReport {
                scan_path: root,
                candidates: run.candidates,
                statistics: scanner.stats().snapshot(),
                outcome: run.outcome,
                errors: run.errors,
                scan_duration: scanner.stats().elapsed(),
                timestamp: SystemTime::now(),
            });

            {
                let mut inner = lock_inner(&inner);
                if inner.generation == generation {
                    inner.token = None;
                    if report.outcome.is_completed() {
                        inner.phase = Phase::ScanComplete;
                        inner.pending = Some(Arc::clone(&report));
                    } else {
                        inner.phase = Phase::Idle;
                    }
                }
            }

            tracing::debug!(generation, outcome = ?report.outcome, "scan finished");
            let _ = event_tx.send(Event::ScanCompleted {
                generation,
                report: Arc::clone(&report),
            });
            report
        })
    }

    /// Deletes the candidates of the last completed scan.
    pub fn start_delete(&self) -> Result<JoinHandle<DeletionReport>, SessionError> {
        let token = CancellationToken::new();

        let (generation, scanned) = {
            let mut inner = self.lock();
            if inner.phase != Phase::ScanComplete {
                return Err(SessionError::NotReady(inner.phase));
            }
            let scanned = match inner.pending.take() {
                Some(report) if !report.candidates.is_empty() => report,
                other => {
                    inner.pending = other;
                    return Err(SessionError::NothingToDelete);
                }
            };
            inner.phase = Phase::Deleting;
            inner.token = Some(token.clone());
            (inner.generation, scanned)
        };

        let total = scanned.candidates.len();
        tracing::debug!(generation, total, "deletion started");
        let _ = self.event_tx.send(Event::DeleteStarted { generation, total });

        let event_tx = self.event_tx.clone();
        let inner = Arc::clone(&self.inner);

        Ok(tokio::task::spawn_blocking(move || {
            let progress_tx = event_tx.clone();
            let on_progress = move |processed: usize, total: usize| {
                let _ = progress_tx.send(Event::DeleteProgress {
                    generation,
                    processed,
                    total,
                });
            };

            let report = eraser::delete(&scanned.candidates, &token, &on_progress);

            {
                let mut inner = lock_inner(&inner);
                if inner.generation == generation {
                    inner.token = None;
                    inner.phase = Phase::Idle;
                    inner.stats = None;
                }
            }

            tracing::debug!(generation, status = ?report.status, "deletion finished");
            let _ = event_tx.send(Event::DeleteCompleted {
                generation,
                report: report.clone(),
            });
            report
        }))
    }
}

fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
