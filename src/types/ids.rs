//! Newtype wrappers for event identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// The sequence number of a recorded event (e.g. a build or test run number).
///
/// Signed, because the log format accepts negative numbers. Values outside
/// the `i64` range fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeqNumber(pub i64);

impl fmt::Display for SeqNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SeqNumber {
    fn from(n: i64) -> Self {
        SeqNumber(n)
    }
}

impl FromStr for SeqNumber {
    type Err = ParseIntError;

    /// Parses a decimal integer, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(SeqNumber)
    }
}
