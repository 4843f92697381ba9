//! Core domain types for the event log.

pub mod event;
pub mod ids;

pub use event::{Event, EventParseError, FIELD_COUNT, FIELD_SEP};
pub use ids::SeqNumber;
