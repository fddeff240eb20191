//! Exported post archive.
//!
//! The archive is a CSV file with a header row. `tweet_id` and
//! `timestamp` are required, `text` is optional and only used for logging;
//! other columns are ignored. The whole file is parsed and validated before
//! anything is selected, so a bad row aborts the run with no deletions.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::api::StatusId;

/// Errors reading an archive or its cutoff date.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Invalid date {0:?}: expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Cannot read archive {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Archive {} has no {column:?} column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("Archive {} line {line}: {reason}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },
}

/// One validated archive row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveRow {
    pub tweet_id: StatusId,
    /// Calendar date the post was written, timezone discarded.
    pub date: NaiveDate,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    tweet_id: String,
    timestamp: String,
    #[serde(default)]
    text: String,
}

const REQUIRED_COLUMNS: [&str; 2] = ["tweet_id", "timestamp"];

/// Parse a `YYYY-MM-DD` cutoff.
pub fn parse_cutoff(value: &str) -> Result<NaiveDate, ArchiveError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ArchiveError::InvalidDate(value.to_string()))
}

/// Date part of an archive timestamp.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, the same with a trailing
/// `+ZZZZ` offset, and RFC 3339. Offsets are dropped, not applied.
pub fn parse_timestamp(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.naive_local().date());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_local().date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Read and validate every row of the archive at `path`.
pub fn load_archive(path: &Path) -> Result<Vec<ArchiveRow>, ArchiveError> {
    let read_err = |source| ArchiveError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(read_err)?;

    let headers = reader.headers().map_err(read_err)?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(ArchiveError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_err)?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let malformed = |reason: String| ArchiveError::MalformedRow {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let raw: RawRow = record
            .deserialize(Some(&headers))
            .map_err(|e| malformed(e.to_string()))?;
        let tweet_id = raw
            .tweet_id
            .parse::<StatusId>()
            .map_err(|_| malformed(format!("invalid tweet_id {:?}", raw.tweet_id)))?;
        let date = parse_timestamp(&raw.timestamp)
            .ok_or_else(|| malformed(format!("invalid timestamp {:?}", raw.timestamp)))?;

        rows.push(ArchiveRow {
            tweet_id,
            date,
            text: raw.text.replace('\n', " "),
        });
    }

    debug!(path = %path.display(), rows = rows.len(), "Loaded archive");
    Ok(rows)
}

/// Rows dated strictly before `cutoff`, in file order.
pub fn select_before(rows: &[ArchiveRow], cutoff: NaiveDate) -> Vec<&ArchiveRow> {
    rows.iter().filter(|row| row.date < cutoff).collect()
}
