//! Overlap-aware merging of an incoming event batch into a recorded log.
//!
//! Producers re-deliver a sliding window of recent events. The first event of
//! each batch (the *anchor*) is expected to be something already recorded; the
//! log is extended only by whatever follows the part that overlaps.
//!
//! # Anchoring
//!
//! The anchor is looked up by full equality at its earliest position in the
//! log. Everything from that position to the end of the log is assumed to
//! reappear at the head of the batch, and the remainder of the batch is
//! appended. No attempt is made to verify that the overlapping region really
//! matches.
//!
//! If the anchor is absent there is no way to tell a fresh run from missing
//! history, so the whole batch is appended and a coverage gap is reported.
//! This can record duplicates.

use tracing::{info, warn};

use crate::types::Event;

/// What a merge did to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The batch was already fully recorded; nothing was appended.
    UpToDate,

    /// The anchor was found and `appended` events past the overlap were added.
    Extended { appended: usize },

    /// The anchor was not found, so the whole batch (`appended` events) was
    /// added after the existing log.
    Gap { appended: usize },
}

impl MergeOutcome {
    /// Returns the number of events added to the log.
    pub fn appended_count(&self) -> usize {
        match self {
            MergeOutcome::UpToDate => 0,
            MergeOutcome::Extended { appended } | MergeOutcome::Gap { appended } => *appended,
        }
    }

    /// Returns true if the anchor could not be located.
    pub fn is_gap(&self) -> bool {
        matches!(self, MergeOutcome::Gap { .. })
    }

    /// Returns true if the log gained at least one event.
    pub fn changed(&self) -> bool {
        self.appended_count() > 0
    }
}

/// Merges `batch` into `log`, appending only events not already covered.
///
/// `log` is only ever extended; existing entries are never removed or
/// reordered. An empty batch leaves the log untouched and reports
/// [`MergeOutcome::UpToDate`]; [`super::update_db_file`] rejects empty
/// batches before getting here.
pub fn merge_events(log: &mut Vec<Event>, batch: &[Event]) -> MergeOutcome {
    let Some(anchor) = batch.first() else {
        return MergeOutcome::UpToDate;
    };

    let Some(merge_idx) = log.iter().position(|event| event == anchor) else {
        warn!(
            anchor = %anchor,
            recorded = log.len(),
            batch = batch.len(),
            "Gap in coverage: first event of batch not found in log"
        );
        log.extend_from_slice(batch);
        return MergeOutcome::Gap {
            appended: batch.len(),
        };
    };

    let overlap = log.len() - merge_idx;
    let Some(num_new) = batch.len().checked_sub(overlap).filter(|n| *n > 0) else {
        return MergeOutcome::UpToDate;
    };

    for event in &batch[batch.len() - num_new..] {
        info!(event = %event, "Found new event");
        log.push(event.clone());
    }

    MergeOutcome::Extended { appended: num_new }
}
