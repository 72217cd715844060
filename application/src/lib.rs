//! Application layer for consult-quorum
//!
//! This crate contains the consultation engine, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::Pacing;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    observer::{CompositeObserver, ConsultationObserver, NoObserver},
    participant_gateway::{GatewayError, ParticipantGateway},
    prompt_builder::{PromptBuilder, TemplatePromptBuilder},
};
pub use use_cases::run_consultation::{
    ConsultationControls, ConsultationError, ConsultationOutcome, RunConsultationUseCase,
};
