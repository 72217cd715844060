//! Run Consultation use case
//!
//! Drives one consultation from `start` to `finished`:
//!
//! ```text
//! start ─▶ discussion round ─▶ voting round ─▶ tally ─┬─▶ next round
//!                                                      └─▶ finished ─▶ summary
//! ```
//!
//! Steps run strictly one after another. Suspension points (for pause) sit
//! before each turn, before each revealed character and before each vote.
//! Provider failures never abort the run; see the `discussion`, `voting`
//! and `summary` submodules for how each one is recovered.

mod controls;
mod discussion;
mod shared;
mod summary;
mod voting;

pub use controls::ConsultationControls;

use crate::config::Pacing;
use crate::ports::conversation_logger::{ConversationLogger, NoConversationLogger};
use crate::ports::observer::{ConsultationObserver, NoObserver};
use crate::ports::participant_gateway::ParticipantGateway;
use crate::ports::prompt_builder::{PromptBuilder, TemplatePromptBuilder};
use consult_domain::{
    ConsultationSetup, ConsultationSnapshot, DomainError, Phase, TerminationDecision,
    TranscriptEntry,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use shared::{Interrupt, Shared, StepResult};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tracing::{error, info};

/// Errors returned to the caller of [`RunConsultationUseCase::start`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsultationError {
    /// Missing case fields or an unusable roster; nothing was changed
    #[error("Validation failed: {0}")]
    Validation(DomainError),

    #[error("A consultation is already in progress (phase: {phase})")]
    AlreadyRunning { phase: Phase },

    /// An engine invariant was violated
    #[error("Consultation state error: {0}")]
    Domain(DomainError),
}

/// How a started consultation ended
#[derive(Debug, Clone)]
pub enum ConsultationOutcome {
    /// Reached `finished`; the final summary has resolved (or was skipped)
    Finished(Box<ConsultationSnapshot>),
    /// Reset while running; the run stopped without touching the new state
    Abandoned,
}

impl ConsultationOutcome {
    pub fn snapshot(&self) -> Option<&ConsultationSnapshot> {
        match self {
            ConsultationOutcome::Finished(snapshot) => Some(snapshot),
            ConsultationOutcome::Abandoned => None,
        }
    }
}

/// Use case for running a consultation
pub struct RunConsultationUseCase<G: ParticipantGateway + 'static> {
    gateway: Arc<G>,
    prompts: Arc<dyn PromptBuilder>,
    pacing: Pacing,
    rng: Mutex<StdRng>,
    shared: Arc<Shared>,
}

impl<G: ParticipantGateway + 'static> RunConsultationUseCase<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            prompts: Arc::new(TemplatePromptBuilder),
            pacing: Pacing::default(),
            rng: Mutex::new(StdRng::from_rng(&mut rand::rng())),
            shared: Arc::new(Shared::new(
                Arc::new(NoObserver),
                Arc::new(NoConversationLogger),
            )),
        }
    }

    pub fn with_prompt_builder(mut self, prompts: Arc<dyn PromptBuilder>) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Seed the turn-order shuffle (reproducible runs)
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// Set the observer. Must be called before [`Self::controls`].
    pub fn with_observer(mut self, observer: Arc<dyn ConsultationObserver>) -> Self {
        self.shared = Arc::new(Shared::new(observer, Arc::clone(&self.shared.logger)));
        self
    }

    /// Set the conversation logger. Must be called before [`Self::controls`].
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.shared = Arc::new(Shared::new(Arc::clone(&self.shared.observer), logger));
        self
    }

    /// Handle for pause/resume, supplements, reset and snapshots
    pub fn controls(&self) -> ConsultationControls {
        ConsultationControls::new(Arc::clone(&self.shared))
    }

    /// Start a consultation and drive it to completion.
    ///
    /// Validation failures return immediately without changing any state.
    /// Otherwise this resolves once the consultation has finished and its
    /// summary call has resolved, or once it has been abandoned by a reset.
    /// Hosts that need to keep interacting spawn this future.
    pub async fn start(
        &self,
        setup: ConsultationSetup,
    ) -> Result<ConsultationOutcome, ConsultationError> {
        let (generation, entry, snapshot) = {
            let mut state = self.shared.lock();
            if state.phase() != Phase::Setup {
                return Err(ConsultationError::AlreadyRunning {
                    phase: state.phase(),
                });
            }
            let entry = state.start(setup).map_err(|e| {
                if e.is_validation() {
                    ConsultationError::Validation(e)
                } else {
                    ConsultationError::Domain(e)
                }
            })?;
            (self.shared.generation(), entry, state.clone())
        };

        if self.shared.set_paused(false) {
            self.shared.observer.on_pause_changed(false);
        }

        info!(
            participants = snapshot.roster().len(),
            turn_order = %snapshot.settings().turn_order,
            max_rounds_without_elimination = snapshot.settings().max_rounds_without_elimination,
            "Consultation started"
        );
        self.shared.log(
            "consultation_started",
            json!({
                "name": snapshot.name(),
                "participants": snapshot.roster(),
                "settings": {
                    "turn_order": snapshot.settings().turn_order,
                    "max_rounds_without_elimination":
                        snapshot.settings().max_rounds_without_elimination,
                },
            }),
        );
        self.shared
            .observer
            .on_phase_change(Phase::Setup, Phase::Discussion);
        self.publish(&[entry], &snapshot);

        match self.run(generation).await {
            Ok(snapshot) => Ok(ConsultationOutcome::Finished(Box::new(snapshot))),
            Err(Interrupt::Superseded) => {
                info!("Consultation abandoned after reset");
                Ok(ConsultationOutcome::Abandoned)
            }
            Err(Interrupt::Domain(e)) => {
                error!("Consultation stopped on a state error: {}", e);
                Err(ConsultationError::Domain(e))
            }
        }
    }

    /// Round loop: discussion, voting, tally, termination check
    async fn run(&self, generation: u64) -> StepResult<ConsultationSnapshot> {
        let (_, snapshot) = self.shared.update(generation, |c| {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            Ok(c.schedule_turns(&mut *rng))
        })?;
        self.shared.observer.on_snapshot(&snapshot);

        loop {
            self.run_discussion(generation).await?;
            self.run_voting(generation).await?;

            let conclusion = self.conclude_round(generation)?;
            if let TerminationDecision::Continue = conclusion.decision {
                continue;
            }

            if let Some(summarizer) = conclusion.summarizer {
                self.generate_summary(generation, summarizer).await?;
            }
            return self.shared.read(generation, |c| c.clone());
        }
    }

    /// Notify the observer of appended entries and the committed snapshot
    fn publish(&self, entries: &[TranscriptEntry], snapshot: &ConsultationSnapshot) {
        for entry in entries {
            self.shared.observer.on_entry_appended(entry);
        }
        self.shared.observer.on_snapshot(snapshot);
    }
}
