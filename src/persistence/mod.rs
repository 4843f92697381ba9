//! Persistence layer for the event log.
//!
//! # File Layout
//!
//! A single text file per log, one event per line:
//!
//! ```text
//! <name> | <detail> | <seq>
//! ```
//!
//! # Update Cycle
//!
//! `update_db_file` loads the whole file, merges the incoming batch in memory
//! (`merge::merge_events`), and replaces the file in one step
//! (`atomic::replace_file`). A crash mid-update leaves the previous version
//! in place.

pub mod atomic;
pub mod db;
pub mod merge;

pub use atomic::replace_file;
pub use db::{
    DbError, EventDb, Result, parse_events, read_db_file, render_events, update_db_file,
    write_db_file,
};
pub use merge::{MergeOutcome, merge_events};
