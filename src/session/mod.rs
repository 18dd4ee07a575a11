//! Session theme log.
//!
//! Each saved theme is appended as one JSON line
//! (`{"timestamp": "<RFC 3339>", "label": "..."}`) to `session_themes.jsonl`.
//! Records are never rewritten or deleted.

pub mod error;
pub mod export;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub use error::SessionError;
pub use export::{default_export_file_name, export_range, render, ExportFormat};

/// One saved session theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub timestamp: DateTime<Local>,
    pub label: String,
}

impl SessionRecord {
    /// Creates a record stamped with the current local time.
    #[must_use]
    pub fn now(label: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            label: label.into(),
        }
    }
}

/// Append-only session theme log.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the log file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record. Blank labels are skipped.
    ///
    /// Returns true if a record was written.
    pub fn append(&self, record: &SessionRecord) -> Result<bool, SessionError> {
        if record.label.trim().is_empty() {
            return Ok(false);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SessionError::io(parent, e))?;
        }

        let line = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| SessionError::io(&self.path, e))?;
        writeln!(file, "{}", line).map_err(|e| SessionError::io(&self.path, e))?;

        Ok(true)
    }

    /// Reads every record, sorted by timestamp.
    ///
    /// A missing file is an empty log. Unreadable lines are skipped.
    pub fn records(&self) -> Result<Vec<SessionRecord>, SessionError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(SessionError::io(&self.path, e)),
        };

        let mut records: Vec<SessionRecord> = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match serde_json::from_str(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(line = index + 1, error = %e, "Skipping corrupt session record");
                    None
                }
            })
            .collect();

        records.sort_by_key(|r| r.timestamp);
        Ok(records)
    }

    /// Reads the records with `from <= timestamp <= to`, sorted by timestamp.
    pub fn records_between(
        &self,
        from: DateTime<Local>,
        to: DateTime<Local>,
    ) -> Result<Vec<SessionRecord>, SessionError> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| r.timestamp >= from && r.timestamp <= to)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(day: u32, label: &str) -> SessionRecord {
        SessionRecord {
            timestamp: Local.with_ymd_and_hms(2024, 5, day, 12, 0, 0).unwrap(),
            label: label.to_string(),
        }
    }

    #[test]
    fn test_missing_log_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("none.jsonl"));
        assert!(log.records().unwrap().is_empty());
    }

    #[test]
    fn test_append_and_read_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("nested").join("log.jsonl"));

        assert!(log.append(&record(3, "third")).unwrap());
        assert!(log.append(&record(1, "first")).unwrap());

        let labels: Vec<_> = log.records().unwrap().into_iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["first", "third"]);
    }

    #[test]
    fn test_blank_label_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("log.jsonl"));

        assert!(!log.append(&record(1, "   ")).unwrap());
        assert!(!log.path().exists());
    }

    #[test]
    fn test_records_between_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("log.jsonl"));
        for day in 1..=5 {
            log.append(&record(day, &format!("day {}", day))).unwrap();
        }

        let found = log
            .records_between(record(2, "").timestamp, record(4, "").timestamp)
            .unwrap();
        let labels: Vec<_> = found.into_iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["day 2", "day 3", "day 4"]);
    }

    #[test]
    fn test_corrupt_lines_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("log.jsonl"));
        log.append(&record(1, "good")).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
            writeln!(file, "{{ broken").unwrap();
            writeln!(file).unwrap();
        }
        log.append(&record(2, "also good")).unwrap();

        assert_eq!(log.records().unwrap().len(), 2);
    }

    #[test]
    fn test_record_serialization_is_rfc3339() {
        let json = serde_json::to_string(&record(1, "x")).unwrap();
        assert!(json.contains("\"timestamp\":\"2024-05-01T12:00:00"));
        assert!(json.contains("\"label\":\"x\""));
    }
}
