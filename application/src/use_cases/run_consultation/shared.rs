//! State shared between the running engine and its controls

use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::observer::ConsultationObserver;
use consult_domain::{Consultation, ConsultationSnapshot, DomainError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Why a running consultation stopped before finishing
#[derive(Debug)]
pub(crate) enum Interrupt {
    /// The consultation was reset; the run must not touch the new state
    Superseded,
    /// A domain rule was violated (indicates an engine bug)
    Domain(DomainError),
}

impl From<DomainError> for Interrupt {
    fn from(e: DomainError) -> Self {
        Interrupt::Domain(e)
    }
}

pub(crate) type StepResult<T> = Result<T, Interrupt>;

/// Authoritative consultation state plus the pause gate.
///
/// Every run captures the generation it started under. `reset` bumps the
/// generation while holding the state lock, so a run that resumes after a
/// reset fails its next [`Shared::read`]/[`Shared::update`] with
/// [`Interrupt::Superseded`] and leaves the fresh state alone.
pub(crate) struct Shared {
    state: Mutex<Consultation>,
    pause: watch::Sender<bool>,
    generation: AtomicU64,
    pub(crate) observer: Arc<dyn ConsultationObserver>,
    pub(crate) logger: Arc<dyn ConversationLogger>,
}

impl Shared {
    pub(crate) fn new(
        observer: Arc<dyn ConsultationObserver>,
        logger: Arc<dyn ConversationLogger>,
    ) -> Self {
        let (pause, _) = watch::channel(false);
        Self {
            state: Mutex::new(Consultation::new()),
            pause,
            generation: AtomicU64::new(0),
            observer,
            logger,
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Consultation> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn ensure_current(&self, generation: u64) -> StepResult<()> {
        if self.generation() != generation {
            return Err(Interrupt::Superseded);
        }
        Ok(())
    }

    /// Read from the state of the given generation
    pub(crate) fn read<T>(
        &self,
        generation: u64,
        f: impl FnOnce(&Consultation) -> T,
    ) -> StepResult<T> {
        let state = self.lock();
        self.ensure_current(generation)?;
        Ok(f(&state))
    }

    /// Mutate the state of the given generation without taking a snapshot
    pub(crate) fn mutate<T>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut Consultation) -> Result<T, DomainError>,
    ) -> StepResult<T> {
        let mut state = self.lock();
        self.ensure_current(generation)?;
        Ok(f(&mut state)?)
    }

    /// Mutate the state of the given generation and return the result
    /// together with a snapshot of the committed state
    pub(crate) fn update<T>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut Consultation) -> Result<T, DomainError>,
    ) -> StepResult<(T, ConsultationSnapshot)> {
        let mut state = self.lock();
        self.ensure_current(generation)?;
        let value = f(&mut state)?;
        Ok((value, state.clone()))
    }

    /// Replace the state with a fresh consultation and invalidate every
    /// running generation
    pub(crate) fn reset(&self) -> (Consultation, ConsultationSnapshot) {
        let mut state = self.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
        let previous = std::mem::take(&mut *state);
        self.pause.send_replace(false);
        (previous, state.clone())
    }

    pub(crate) fn is_paused(&self) -> bool {
        *self.pause.borrow()
    }

    /// Set the pause flag; returns whether it changed
    pub(crate) fn set_paused(&self, paused: bool) -> bool {
        let previous = self.pause.send_replace(paused);
        self.lock().set_paused(paused);
        previous != paused
    }

    /// Suspend while paused.
    ///
    /// Wakes as soon as the gate opens (resume or reset) instead of polling.
    pub(crate) async fn wait_while_paused(&self, generation: u64) -> StepResult<()> {
        let mut rx = self.pause.subscribe();
        if *rx.borrow() {
            tracing::debug!("Consultation paused, waiting for resume");
        }
        rx.wait_for(|paused| !*paused)
            .await
            .map_err(|_| Interrupt::Superseded)?;
        self.ensure_current(generation)
    }

    pub(crate) fn log(&self, event_type: &'static str, payload: serde_json::Value) {
        self.logger.log(ConversationEvent::new(event_type, payload));
    }
}
