//! Domain layer for consult-quorum
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Consultation
//!
//! Several doctors, each backed by a different model provider, discuss a
//! patient case in sequential turns. After every round each active doctor
//! votes for the least convincing answer:
//!
//! - **Elimination**: a unique, non-zero maximum sits out the rest of the
//!   consultation
//! - **Stagnation**: rounds without an elimination are counted; reaching the
//!   configured limit ends the consultation
//! - **Convergence**: when at most one doctor remains, that doctor's answer
//!   is adopted
//!
//! When the consultation ends a summarizer is asked for the final answer.

pub mod case;
pub mod config;
pub mod consultation;
pub mod core;
pub mod participant;
pub mod prompt;
pub mod quorum;
pub mod util;

// Re-export commonly used types
pub use case::{CaseRecord, ImageRecognition, LinkedConsultation, RecognitionStatus};
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use consultation::{
    Consultation, ConsultationSettings, ConsultationSetup, ConsultationSnapshot, EntryId,
    EntryKind, FinalSummary, Phase, RoundConclusion, SummaryStatus, TerminationDecision,
    Transcript, TranscriptEntry, TurnOrder, Workflow,
};
pub use core::error::DomainError;
pub use participant::{Participant, ParticipantId, ParticipantStatus, ProviderKind, Roster};
pub use prompt::{Message, PromptTemplate, Role};

// Re-export quorum types
pub use quorum::{ParsedVote, TallyOutcome, Vote, VoteDecision, decide_vote, parse_vote_response};
