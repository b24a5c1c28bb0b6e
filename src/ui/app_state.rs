use std::path::PathBuf;
use std::sync::Arc;

use crate::core::analyzer::{Analyzer, CategoryRow};
use crate::models::deletion::{DeleteStatus, DeletionReport};
use crate::models::scan_result::{ScanOutcome, ScanReport, ScanStatistics};
use crate::models::size::human_readable_size;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Scanning,
    Results,
    Confirm,
    Deleting,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

pub struct AppState {
    pub view_mode: ViewMode,
    help_return: ViewMode,
    pub root_path: PathBuf,
    pub generation: u64,
    pub stats: ScanStatistics,
    pub rows: Vec<CategoryRow>,
    pub scan_speed: f64,
    pub status: String,
    pub status_kind: StatusKind,
    pub delete_processed: usize,
    pub delete_total: usize,
    pub last_report: Option<Arc<ScanReport>>,
    pub selected_index: usize,
    pub list_offset: usize,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            view_mode: ViewMode::Scanning,
            help_return: ViewMode::Results,
            root_path,
            generation: 0,
            stats: ScanStatistics::default(),
            rows: Vec::new(),
            scan_speed: 0.0,
            status: String::from("Ready to scan"),
            status_kind: StatusKind::Info,
            delete_processed: 0,
            delete_total: 0,
            last_report: None,
            selected_index: 0,
            list_offset: 0,
            should_quit: false,
        }
    }

    pub fn set_status(&mut self, kind: StatusKind, message: impl Into<String>) {
        self.status_kind = kind;
        self.status = message.into();
    }

    /// Whether the last finished scan left anything to delete.
    pub fn can_delete(&self) -> bool {
        self.view_mode == ViewMode::Results
            && self
                .last_report
                .as_ref()
                .is_some_and(|r| r.outcome.is_completed() && !r.candidates.is_empty())
    }

    pub fn begin_scan(&mut self, generation: u64) {
        self.generation = generation;
        self.view_mode = ViewMode::Scanning;
        self.stats = ScanStatistics::default();
        self.rows.clear();
        self.scan_speed = 0.0;
        self.last_report = None;
        self.selected_index = 0;
        self.list_offset = 0;
        self.delete_processed = 0;
        self.delete_total = 0;
        self.set_status(StatusKind::Info, "Scanning directory...");
    }

    pub fn update_stats(&mut self, stats: ScanStatistics) {
        self.rows = Analyzer::category_rows(&stats);
        self.stats = stats;
        if self.selected_index >= self.rows.len() {
            self.selected_index = self.rows.len().saturating_sub(1);
        }
    }

    pub fn cancelling(&mut self) {
        let running = if self.view_mode == ViewMode::Help {
            self.help_return
        } else {
            self.view_mode
        };
        match running {
            ViewMode::Scanning => self.set_status(StatusKind::Warning, "Cancelling scan..."),
            ViewMode::Deleting => self.set_status(StatusKind::Warning, "Cancelling deletion..."),
            _ => {}
        }
    }

    pub fn finish_scan(&mut self, report: Arc<ScanReport>) {
        self.update_stats(report.statistics.clone());
        self.view_mode = ViewMode::Results;

        match &report.outcome {
            ScanOutcome::Failed(err) => {
                self.set_status(StatusKind::Error, format!("Scan failed: {}", err));
            }
            ScanOutcome::Cancelled => {
                self.set_status(StatusKind::Warning, "Scan cancelled");
            }
            ScanOutcome::Completed if report.candidates.is_empty() => {
                self.set_status(StatusKind::Success, "No unwanted files found");
            }
            ScanOutcome::Completed => {
                let message = format!(
                    "Found {} unwanted files ({}) - press d to delete",
                    report.statistics.unwanted_file_count,
                    human_readable_size(report.statistics.unwanted_total_size)
                );
                self.set_status(StatusKind::Success, message);
            }
        }

        self.last_report = Some(report);
    }

    pub fn ask_confirm(&mut self) {
        if self.can_delete() {
            self.view_mode = ViewMode::Confirm;
        }
    }

    pub fn dismiss_confirm(&mut self) {
        if self.view_mode == ViewMode::Confirm {
            self.view_mode = ViewMode::Results;
        }
    }

    pub fn begin_delete(&mut self, total: usize) {
        self.view_mode = ViewMode::Deleting;
        self.delete_processed = 0;
        self.delete_total = total;
        self.set_status(StatusKind::Info, "Deleting files...");
    }

    pub fn update_delete(&mut self, processed: usize, total: usize) {
        // Progress events never move backwards.
        self.delete_processed = self.delete_processed.max(processed);
        self.delete_total = total;
    }

    pub fn finish_delete(&mut self, report: &DeletionReport) {
        let outcome = &report.outcome;
        let mut message = match report.status {
            DeleteStatus::Cancelled => format!(
                "Deletion cancelled. Deleted {} files ({})",
                outcome.deleted_count,
                human_readable_size(outcome.deleted_size_bytes)
            ),
            DeleteStatus::Completed => format!(
                "Deleted {} files ({})",
                outcome.deleted_count,
                human_readable_size(outcome.deleted_size_bytes)
            ),
        };
        if report.skipped() > 0 {
            message.push_str(&format!(", {} skipped (see log)", report.skipped()));
        }
        let kind = if report.status == DeleteStatus::Completed && report.skipped() == 0 {
            StatusKind::Success
        } else {
            StatusKind::Warning
        };
        self.set_status(kind, message);

        // The lifecycle is over: clear the table.
        self.stats = ScanStatistics::default();
        self.rows.clear();
        self.last_report = None;
        self.selected_index = 0;
        self.list_offset = 0;
        self.view_mode = ViewMode::Results;
    }

    pub fn move_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            if self.selected_index < self.list_offset {
                self.list_offset = self.selected_index;
            }
        }
    }

    pub fn move_down(&mut self) {
        let count = self.rows.len();
        if count > 0 && self.selected_index < count - 1 {
            self.selected_index += 1;
        }
    }

    pub fn toggle_help(&mut self) {
        if self.view_mode == ViewMode::Help {
            self.view_mode = self.help_return;
        } else {
            self.help_return = self.view_mode;
            self.view_mode = ViewMode::Help;
        }
    }

    /// Whether a background phase is running for this state's generation.
    pub fn is_busy(&self) -> bool {
        matches!(self.view_mode, ViewMode::Scanning | ViewMode::Deleting)
            || (self.view_mode == ViewMode::Help
                && matches!(self.help_return, ViewMode::Scanning | ViewMode::Deleting))
    }
}
