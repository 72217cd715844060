//! Host-facing controls for a consultation

use super::shared::Shared;
use consult_domain::{ConsultationSnapshot, Phase, TranscriptEntry};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

/// Cloneable handle to a consultation's shared state.
///
/// Obtained from
/// [`RunConsultationUseCase::controls`](super::RunConsultationUseCase::controls);
/// every clone refers to the same consultation. Safe to use from other
/// tasks and from observer callbacks while the engine is running.
#[derive(Clone)]
pub struct ConsultationControls {
    shared: Arc<Shared>,
}

impl ConsultationControls {
    pub(crate) fn new(shared: Arc<Shared>) -> Self {
        Self { shared }
    }

    /// Suspend the engine at its next suspension point.
    ///
    /// An already issued provider call is not cancelled; its result is
    /// applied when it arrives.
    pub fn pause(&self) {
        self.set_paused(true);
    }

    pub fn resume(&self) {
        self.set_paused(false);
    }

    pub fn toggle_pause(&self) {
        self.set_paused(!self.shared.is_paused());
    }

    pub fn is_paused(&self) -> bool {
        self.shared.is_paused()
    }

    fn set_paused(&self, paused: bool) {
        if !self.shared.set_paused(paused) {
            return;
        }
        info!(paused, "Pause state changed");
        self.shared.observer.on_pause_changed(paused);
        let snapshot = self.snapshot();
        self.shared.observer.on_snapshot(&snapshot);
    }

    /// Append a patient supplement to the transcript.
    ///
    /// Accepted in every phase. Blank text is ignored and returns `None`.
    pub fn submit_supplement(&self, text: &str) -> Option<TranscriptEntry> {
        let (entry, snapshot) = {
            let mut state = self.shared.lock();
            let entry = state.add_supplement(text)?;
            (entry, state.clone())
        };

        self.shared.log(
            "supplement_added",
            json!({
                "phase": snapshot.phase().as_str(),
                "round": snapshot.current_round(),
                "entry": &entry,
            }),
        );
        self.shared.observer.on_entry_appended(&entry);
        self.shared.observer.on_snapshot(&snapshot);
        Some(entry)
    }

    /// Return to a fresh `setup` state.
    ///
    /// A running consultation is abandoned: outstanding provider calls are
    /// not awaited and their results are discarded.
    pub fn reset(&self) {
        let (previous, snapshot) = self.shared.reset();
        info!(from = %previous.phase(), "Consultation reset");

        if previous.phase() != Phase::Setup {
            self.shared
                .observer
                .on_phase_change(previous.phase(), Phase::Setup);
        }
        if previous.is_paused() {
            self.shared.observer.on_pause_changed(false);
        }
        self.shared.observer.on_snapshot(&snapshot);
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> ConsultationSnapshot {
        self.shared.lock().clone()
    }

    pub fn phase(&self) -> Phase {
        self.shared.lock().phase()
    }
}
