use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::models::deletion::DeletionReport;
use crate::models::scan_result::{ScanReport, ScanStatistics};

/// Messages from the background scan/delete tasks to the front end.
///
/// `generation` identifies the scan lifecycle that produced the event, so a
/// listener can drop late events of a generation it already replaced.
#[derive(Debug, Clone)]
pub enum Event {
    // Scan phase
    ScanStarted { generation: u64, path: PathBuf },
    ScanProgress { generation: u64, stats: ScanStatistics },
    ScanCompleted { generation: u64, report: Arc<ScanReport> },

    // Delete phase
    DeleteStarted { generation: u64, total: usize },
    DeleteProgress { generation: u64, processed: usize, total: usize },
    DeleteCompleted { generation: u64, report: DeletionReport },
}

impl Event {
    pub fn generation(&self) -> u64 {
        match self {
            Event::ScanStarted { generation, .. }
            | Event::ScanProgress { generation, .. }
            | Event::ScanCompleted { generation, .. }
            | Event::DeleteStarted { generation, .. }
            | Event::DeleteProgress { generation, .. }
            | Event::DeleteCompleted { generation, .. } => *generation,
        }
    }
}

pub type EventSender = mpsc::UnboundedSender<Event>;
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

pub fn create_event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
