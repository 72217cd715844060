//! Consultation observer port
//!
//! Defines the callbacks a host receives while a consultation runs. All
//! methods default to no-ops so implementations only override what they
//! display or persist.
//!
//! Callbacks are invoked after the engine has released its state lock, so
//! an observer may call back into
//! [`ConsultationControls`](crate::use_cases::run_consultation::ConsultationControls).

use consult_domain::{
    ConsultationSnapshot, EntryId, FinalSummary, Participant, Phase, TranscriptEntry, Vote,
};
use std::sync::Arc;

/// Callback for consultation progress
pub trait ConsultationObserver: Send + Sync {
    fn on_phase_change(&self, _from: Phase, _to: Phase) {}

    fn on_turn_started(&self, _participant: &Participant, _round: u32) {}

    fn on_turn_finished(&self, _participant: &Participant, _success: bool) {}

    fn on_entry_appended(&self, _entry: &TranscriptEntry) {}

    /// Only transient entries (typing placeholders) are ever removed
    fn on_entry_removed(&self, _id: EntryId) {}

    /// One revealed piece of a `doctor` entry
    fn on_stream_chunk(&self, _entry: EntryId, _chunk: &str) {}

    fn on_vote_cast(&self, _vote: &Vote) {}

    fn on_summary_changed(&self, _summary: &FinalSummary) {}

    fn on_pause_changed(&self, _paused: bool) {}

    /// Called after every committed coarse-grained change (not per streamed
    /// character); the persistence hook
    fn on_snapshot(&self, _snapshot: &ConsultationSnapshot) {}
}

/// No-op observer for when progress reporting is not needed
pub struct NoObserver;

impl ConsultationObserver for NoObserver {}

/// An observer that delegates to multiple inner observers.
///
/// ```text
/// RunConsultationUseCase
///          |
///   CompositeObserver
///     +----+----------------+
///     |                     |
/// ProgressReporter    JsonSnapshotWriter
/// ```
#[derive(Default)]
pub struct CompositeObserver {
    delegates: Vec<Arc<dyn ConsultationObserver>>,
}

impl CompositeObserver {
    pub fn new(delegates: Vec<Arc<dyn ConsultationObserver>>) -> Self {
        Self { delegates }
    }

    pub fn push(&mut self, observer: Arc<dyn ConsultationObserver>) {
        self.delegates.push(observer);
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

/// Delegate a method call to all inner observers.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        for d in &$self.delegates {
            d.$method($($arg),*);
        }
    };
}

impl ConsultationObserver for CompositeObserver {
    fn on_phase_change(&self, from: Phase, to: Phase) {
        delegate!(self, on_phase_change, from, to);
    }

    fn on_turn_started(&self, participant: &Participant, round: u32) {
        delegate!(self, on_turn_started, participant, round);
    }

    fn on_turn_finished(&self, participant: &Participant, success: bool) {
        delegate!(self, on_turn_finished, participant, success);
    }

    fn on_entry_appended(&self, entry: &TranscriptEntry) {
        delegate!(self, on_entry_appended, entry);
    }

    fn on_entry_removed(&self, id: EntryId) {
        delegate!(self, on_entry_removed, id);
    }

    fn on_stream_chunk(&self, entry: EntryId, chunk: &str) {
        delegate!(self, on_stream_chunk, entry, chunk);
    }

    fn on_vote_cast(&self, vote: &Vote) {
        delegate!(self, on_vote_cast, vote);
    }

    fn on_summary_changed(&self, summary: &FinalSummary) {
        delegate!(self, on_summary_changed, summary);
    }

    fn on_pause_changed(&self, paused: bool) {
        delegate!(self, on_pause_changed, paused);
    }

    fn on_snapshot(&self, snapshot: &ConsultationSnapshot) {
        delegate!(self, on_snapshot, snapshot);
    }
}
