//! A single recorded event and its one-line text form.
//!
//! Each event is stored as its three fields joined by [`FIELD_SEP`]:
//!
//! ```text
//! nightly | PASS | 1042
//! ```
//!
//! Field values must not contain the separator themselves. This is not
//! checked on construction; such an event writes fine but fails to parse
//! back with the right field count.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use thiserror::Error;

use super::ids::SeqNumber;

/// Separator between the fields of a serialized event.
pub const FIELD_SEP: &str = " | ";

/// Number of fields in a serialized event.
pub const FIELD_COUNT: usize = 3;

/// Errors from parsing a single event line.
#[derive(Debug, Error)]
pub enum EventParseError {
    /// The line did not split into exactly [`FIELD_COUNT`] fields.
    #[error("expected 3 fields separated by \" | \", found {found}")]
    WrongFieldCount { found: usize },

    /// The sequence number field is not an integer.
    #[error("invalid sequence number '{value}': {source}")]
    InvalidSeqNumber {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// One logged occurrence: what it was, its outcome or detail, and where it
/// falls in the sequence.
///
/// Equality compares all three fields; the merge in
/// [`crate::persistence::merge`] relies on that.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    pub detail: String,
    pub seq: SeqNumber,
}

impl Event {
    pub fn new(
        name: impl Into<String>,
        detail: impl Into<String>,
        seq: impl Into<SeqNumber>,
    ) -> Self {
        Event {
            name: name.into(),
            detail: detail.into(),
            seq: seq.into(),
        }
    }

    /// Parses one non-blank line of an event log.
    ///
    /// Only the line terminator is stripped before splitting, so whitespace at
    /// the edges of `name` and `detail` survives. The sequence number field
    /// tolerates surrounding whitespace.
    pub fn parse_line(line: &str) -> Result<Self, EventParseError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let fields: Vec<&str> = line.split(FIELD_SEP).collect();
        let &[name, detail, seq] = fields.as_slice() else {
            return Err(EventParseError::WrongFieldCount {
                found: fields.len(),
            });
        };

        let seq = seq
            .parse::<SeqNumber>()
            .map_err(|source| EventParseError::InvalidSeqNumber {
                value: seq.to_string(),
                source,
            })?;

        Ok(Event::new(name, detail, seq))
    }
}

impl fmt::Display for Event {
    /// Formats the event as a log line, without the trailing newline.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{FIELD_SEP}{}{FIELD_SEP}{}",
            self.name, self.detail, self.seq
        )
    }
}

impl FromStr for Event {
    type Err = EventParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Event::parse_line(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::arb_event;
    use proptest::prelude::*;

    #[test]
    fn display_joins_fields_with_separator() {
        let event = Event::new("nightly", "PASS", 1042);
        assert_eq!(event.to_string(), "nightly | PASS | 1042");
    }

    #[test]
    fn parse_strips_line_terminator() {
        let event = Event::parse_line("nightly | FAIL | 7\n").unwrap();
        assert_eq!(event, Event::new("nightly", "FAIL", 7));
    }

    #[test]
    fn parse_strips_crlf_and_trailing_seq_whitespace() {
        let event = Event::parse_line("nightly | FAIL | 7   \r\n").unwrap();
        assert_eq!(event, Event::new("nightly", "FAIL", 7));
    }

    #[test]
    fn parse_keeps_leading_whitespace_in_name() {
        let event = Event::parse_line("   nightly | FAIL | 7\n").unwrap();
        assert_eq!(event.name, "   nightly");
    }

    #[test]
    fn empty_name_roundtrips() {
        let event = Event::new("", "PASS", 1);
        assert_eq!(event.to_string(), " | PASS | 1");
        assert_eq!(Event::parse_line(" | PASS | 1\n").unwrap(), event);
    }

    #[test]
    fn edge_spaces_in_fields_roundtrip() {
        let event = Event::new(" lead", "trail ", 1);
        assert_eq!(Event::parse_line(&event.to_string()).unwrap(), event);

        let event = Event::new("trail ", "", 2);
        assert_eq!(Event::parse_line(&event.to_string()).unwrap(), event);
    }

    #[test]
    fn parse_keeps_inner_spaces() {
        let event = Event::parse_line("unit tests | 3 failed, 2 skipped | 12").unwrap();
        assert_eq!(event.name, "unit tests");
        assert_eq!(event.detail, "3 failed, 2 skipped");
    }

    #[test]
    fn parse_allows_empty_detail() {
        let event = Event::parse_line("nightly |  | 3").unwrap();
        assert_eq!(event, Event::new("nightly", "", 3));
    }

    #[test]
    fn parse_rejects_two_fields() {
        let err = Event::parse_line("nightly | 7").unwrap_err();
        assert!(matches!(err, EventParseError::WrongFieldCount { found: 2 }));
    }

    #[test]
    fn parse_rejects_four_fields() {
        let err = Event::parse_line("a | b | c | 7").unwrap_err();
        assert!(matches!(err, EventParseError::WrongFieldCount { found: 4 }));
    }

    #[test]
    fn parse_requires_exact_separator() {
        // A bare pipe without surrounding spaces is not a separator.
        let err = Event::parse_line("a|b|7").unwrap_err();
        assert!(matches!(err, EventParseError::WrongFieldCount { found: 1 }));
    }

    #[test]
    fn parse_rejects_non_integer_seq() {
        let err = Event::parse_line("nightly | PASS | seven").unwrap_err();
        match err {
            EventParseError::InvalidSeqNumber { value, .. } => assert_eq!(value, "seven"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn separator_inside_field_breaks_roundtrip() {
        let event = Event::new("a | b", "c", 1);
        let err = Event::parse_line(&event.to_string()).unwrap_err();
        assert!(matches!(err, EventParseError::WrongFieldCount { found: 4 }));
    }

    proptest! {
        #[test]
        fn display_parse_roundtrip(event in arb_event()) {
            let parsed = Event::parse_line(&event.to_string()).unwrap();
            prop_assert_eq!(event, parsed);
        }
    }
}
