//! Error types shared across the crate.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Common result type for replay operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between an export file and a report.
///
/// Import failures always leave the previously published store untouched;
/// a rerun after fixing the input recovers. Queries against an empty store
/// are not errors and have no variant here.
#[derive(Error, Debug)]
pub enum Error {
    /// No input files matched, or every matched file held zero records.
    #[error("no streaming history to import: {0}")]
    EmptyInput(String),

    /// A record is missing a required field or carries an invalid value.
    /// One malformed record rejects the whole batch.
    #[error("malformed record in {} at index {index}: {reason}", .file.display())]
    MalformedRecord {
        file: PathBuf,
        index: usize,
        reason: String,
    },

    /// The store could not be opened, or stayed locked past the bounded wait.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A query filter with `start` after `end`.
    #[error("invalid time range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// Configuration loading or validation error
    #[error("configuration error: {0}")]
    Config(String),

    /// An export file that is not valid JSON.
    #[error("failed to parse {}", .file.display())]
    Json {
        file: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Database operation error (wraps rusqlite::Error)
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
