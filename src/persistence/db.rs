//! The on-disk event log ("db file").
//!
//! A db file is plain text with one [`Event`] per line, fields joined by
//! `" | "`:
//!
//! ```text
//! nightly | PASS | 1041
//! nightly | FAIL | 1042
//! ```
//!
//! Blank lines are ignored on read and not preserved. Every update rewrites
//! the whole file. There is no locking: callers updating the same path from
//! several processes must serialize those updates themselves.

use std::io;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument};

use super::atomic::replace_file;
use super::merge::{MergeOutcome, merge_events};
use crate::types::{Event, EventParseError};

/// Errors that can occur while reading or updating a db file.
#[derive(Debug, Error)]
pub enum DbError {
    /// A line did not split into exactly three fields.
    #[error("line {line_no} in wrong format: '{line}'")]
    Format { line_no: usize, line: String },

    /// A line's sequence number field is not an integer.
    #[error("line {line_no} has invalid sequence number '{value}': {source}")]
    InvalidSeqNumber {
        line_no: usize,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// Reading or writing the file failed.
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// `update_db_file` was given no events to merge.
    #[error("cannot merge an empty batch of events")]
    EmptyBatch,
}

impl DbError {
    fn io(path: &Path, source: io::Error) -> Self {
        DbError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn from_parse(line_no: usize, line: &str, err: EventParseError) -> Self {
        match err {
            EventParseError::WrongFieldCount { .. } => DbError::Format {
                line_no,
                line: line.to_string(),
            },
            EventParseError::InvalidSeqNumber { value, source } => DbError::InvalidSeqNumber {
                line_no,
                value,
                source,
            },
        }
    }

    /// Returns true for errors caused by malformed file content.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            DbError::Format { .. } | DbError::InvalidSeqNumber { .. }
        )
    }
}

/// Result type for db file operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// Parses the text of a db file.
///
/// A line is blank, and skipped, if it is empty after trimming whitespace.
/// Other lines are split as they are, minus the line terminator. Line numbers
/// in errors are 1-based and count blank lines.
pub fn parse_events(text: &str) -> Result<Vec<Event>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            Event::parse_line(line)
                .map_err(|e| DbError::from_parse(idx + 1, line.trim_end_matches('\r'), e))
        })
        .collect()
}

/// Renders events as db file text, one newline-terminated line per event.
pub fn render_events(events: &[Event]) -> String {
    events.iter().map(|event| format!("{event}\n")).collect()
}

/// Reads every event from the db file at `path`, in file order.
///
/// A missing file is an error; [`update_db_file`] checks for existence first.
pub fn read_db_file(path: &Path) -> Result<Vec<Event>> {
    let text = std::fs::read_to_string(path).map_err(|e| DbError::io(path, e))?;
    parse_events(&text)
}

/// Replaces the db file at `path` with exactly `events`.
///
/// The parent directory must exist. The old content is replaced atomically.
pub fn write_db_file(path: &Path, events: &[Event]) -> Result<()> {
    replace_file(path, render_events(events).as_bytes()).map_err(|e| DbError::io(path, e))
}

/// Merges `events` into the db file at `path` and rewrites it.
///
/// The first event of the batch anchors it against what is already recorded;
/// see [`merge_events`] for the rules. The file is created if it does not
/// exist and is rewritten even when nothing new was found.
#[instrument(skip_all, fields(path = %path.display(), batch = events.len()))]
pub fn update_db_file(path: &Path, events: &[Event]) -> Result<MergeOutcome> {
    if events.is_empty() {
        return Err(DbError::EmptyBatch);
    }

    let mut recorded = if path.exists() {
        read_db_file(path)?
    } else {
        debug!("No existing db file, starting empty");
        Vec::new()
    };

    let outcome = merge_events(&mut recorded, events);
    write_db_file(path, &recorded)?;

    debug!(?outcome, total = recorded.len(), "Updated db file");
    Ok(outcome)
}

/// A db file at a fixed path.
#[derive(Debug, Clone)]
pub struct EventDb {
    path: PathBuf,
}

impl EventDb {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        EventDb { path: path.into() }
    }

    /// Returns the path to the db file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns all recorded events, or none if the file does not exist yet.
    pub fn load(&self) -> Result<Vec<Event>> {
        if self.path.exists() {
            read_db_file(&self.path)
        } else {
            Ok(Vec::new())
        }
    }

    /// Merges a batch into the file. See [`update_db_file`].
    pub fn update(&self, events: &[Event]) -> Result<MergeOutcome> {
        update_db_file(&self.path, events)
    }
}
