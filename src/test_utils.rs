//! Shared test utilities and arbitrary generators for property-based testing.

use crate::types::{Event, SeqNumber};
use proptest::prelude::*;
use std::io::{self, Write};
use std::ops::Range;
use std::sync::{Arc, Mutex};

/// Field text without pipes or line breaks. May be empty or start and end
/// with spaces.
const FIELD_PATTERN: &str = "[ a-zA-Z0-9_.:-]{0,16}";

pub fn arb_name() -> impl Strategy<Value = String> {
    FIELD_PATTERN.prop_map(String::from)
}

pub fn arb_detail() -> impl Strategy<Value = String> {
    FIELD_PATTERN.prop_map(String::from)
}

pub fn arb_seq_number() -> impl Strategy<Value = SeqNumber> {
    any::<i64>().prop_map(SeqNumber)
}

pub fn arb_event() -> impl Strategy<Value = Event> {
    (arb_name(), arb_detail(), arb_seq_number())
        .prop_map(|(name, detail, seq)| Event::new(name, detail, seq))
}

/// A chronological run of events with strictly increasing sequence numbers,
/// so every event in the run is distinct.
pub fn arb_event_run(len: Range<usize>) -> impl Strategy<Value = Vec<Event>> {
    (
        prop::collection::vec((arb_name(), arb_detail()), len),
        -1_000_000i64..1_000_000,
    )
        .prop_map(|(fields, first)| {
            fields
                .into_iter()
                .zip(first..)
                .map(|((name, detail), seq)| Event::new(name, detail, seq))
                .collect()
        })
}

/// Log output captured from a scoped tracing subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a thread-local subscriber and returns its result along with
/// everything logged at `debug` and above.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let out = tracing::subscriber::with_default(subscriber, f);
    (out, logs.contents())
}
