//! Export of session themes to CSV or Markdown.

use std::path::Path;

use chrono::{DateTime, Local};

use super::error::SessionError;
use super::{SessionLog, SessionRecord};

/// Timestamp layout used in exported rows.
pub const ROW_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Output table format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Markdown,
}

impl ExportFormat {
    /// Picks the format from the output extension: `.md` is Markdown,
    /// anything else CSV.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("md") => ExportFormat::Markdown,
            _ => ExportFormat::Csv,
        }
    }
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn markdown_cell(value: &str) -> String {
    value.replace('|', "\\|").replace(['\r', '\n'], " ")
}

/// Renders records as a two-column table (`timestamp`, `label`).
#[must_use]
pub fn render(records: &[SessionRecord], format: ExportFormat) -> String {
    let mut out = String::new();
    match format {
        ExportFormat::Csv => {
            out.push_str("timestamp,label\n");
            for record in records {
                out.push_str(&format!(
                    "{},{}\n",
                    record.timestamp.format(ROW_TIME_FORMAT),
                    csv_field(&record.label)
                ));
            }
        }
        ExportFormat::Markdown => {
            out.push_str("| timestamp | label |\n");
            out.push_str("| --- | --- |\n");
            for record in records {
                out.push_str(&format!(
                    "| {} | {} |\n",
                    record.timestamp.format(ROW_TIME_FORMAT),
                    markdown_cell(&record.label)
                ));
            }
        }
    }
    out
}

/// Writes the records in `[from, to]` to `output`. Returns the row count.
///
/// # Errors
///
/// Returns an error if the range is inverted, the log cannot be read or
/// the output cannot be written.
pub fn export_range(
    log: &SessionLog,
    from: DateTime<Local>,
    to: DateTime<Local>,
    output: &Path,
) -> Result<usize, SessionError> {
    if from > to {
        return Err(SessionError::InvalidRange {
            from: from.format(ROW_TIME_FORMAT).to_string(),
            to: to.format(ROW_TIME_FORMAT).to_string(),
        });
    }

    let records = log.records_between(from, to)?;
    let table = render(&records, ExportFormat::from_path(output));

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| SessionError::io(parent, e))?;
    }
    std::fs::write(output, table).map_err(|e| SessionError::io(output, e))?;

    tracing::info!(rows = records.len(), path = %output.display(), "Session themes exported");
    Ok(records.len())
}

/// Default export file name, e.g. `20240131-174502_note.md`.
#[must_use]
pub fn default_export_file_name(now: DateTime<Local>) -> String {
    format!("{}_note.md", now.format("%Y%m%d-%H%M%S"))
}
