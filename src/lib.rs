//! Support library for the bagger tool.
//!
//! Provides a shell command runner with normalized results ([`command`]) and
//! an append-only, human-readable event log with overlap-aware merging
//! ([`persistence`]).

pub mod command;
pub mod persistence;
pub mod types;

#[cfg(test)]
mod test_utils;
