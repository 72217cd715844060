//! Consultation domain
//!
//! The phase state machine of a multi-doctor consultation:
//!
//! ```text
//! setup ──start──▶ discussion ──queue exhausted──▶ voting
//!                      ▲                              │
//!                      └──────── next round ◀─────────┤
//!                                                     ▼
//!                                                 finished
//! ```

pub mod entities;
pub mod narration;
pub mod scheduler;
pub mod settings;
pub mod summary;
pub mod termination;
pub mod transcript;
pub mod workflow;

pub use entities::{
    Consultation, ConsultationSetup, ConsultationSnapshot, RoundConclusion, TurnResolution,
    TurnStart,
};
pub use scheduler::build_turn_queue;
pub use settings::{ConsultationSettings, TurnOrder};
pub use summary::{FinalSummary, SummaryStatus};
pub use termination::TerminationDecision;
pub use transcript::{EntryId, EntryKind, Transcript, TranscriptEntry};
pub use workflow::{Phase, Workflow};
