use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::session::Phase;
use crate::models::scan_result::ScanErrorType;

/// An entry the scanner could not visit. Terminal for the scan unless the
/// settings ask to continue past it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("cannot read {}: {message}", .path.display())]
pub struct TraversalError {
    pub path: PathBuf,
    pub error_type: ScanErrorType,
    pub message: String,
}

impl TraversalError {
    pub fn from_io(path: &Path, err: &std::io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            error_type: ScanErrorType::from(err.kind()),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no completed scan to delete from (session is {0:?})")]
    NotReady(Phase),

    #[error("the last scan found no unwanted files")]
    NothingToDelete,
}
