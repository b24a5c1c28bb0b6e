use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What the scanner does when an entry cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Stop the scan and report the entry as its terminal error.
    #[default]
    Abort,
    /// Log the entry, record it in the report and keep walking.
    Continue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub follow_symlinks: bool,
    /// Files between two progress callbacks inside one directory.
    pub progress_batch: u64,
    pub error_policy: ErrorPolicy,
    pub log_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            follow_symlinks: false,
            progress_batch: 100,
            error_policy: ErrorPolicy::Abort,
            log_dir: PathBuf::from("."),
        }
    }
}

impl Settings {
    /// Reads a JSON settings file. Missing fields take their defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)?;
        let mut settings: Settings = serde_json::from_slice(&bytes)?;
        settings.progress_batch = settings.progress_batch.max(1);
        Ok(settings)
    }

    pub fn log_file_name(timestamp: &chrono::DateTime<chrono::Local>) -> String {
        format!("mediasweep_{}.log", timestamp.format("%Y%m%d_%H%M%S"))
    }

    pub fn log_path(&self, timestamp: &chrono::DateTime<chrono::Local>) -> PathBuf {
        self.log_dir.join(Self::log_file_name(timestamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn log_file_name_is_timestamped() {
        let ts = chrono::Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(Settings::log_file_name(&ts), "mediasweep_20240309_070501.log");
    }

    #[test]
    fn partial_json_fills_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "error_policy": "continue" }"#).unwrap();
        assert_eq!(settings.error_policy, ErrorPolicy::Continue);
        assert_eq!(settings.progress_batch, 100);
        assert!(!settings.follow_symlinks);
    }
}
