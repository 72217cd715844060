//! Participant domain
//!
//! The roster of consultation participants ("doctors"), each bound to one
//! external model provider, together with their per-consultation
//! eligibility (`active` / `eliminated`) and vote counters.

pub mod entities;
pub mod provider;
pub mod roster;

pub use entities::{Participant, ParticipantId, ParticipantStatus};
pub use provider::ProviderKind;
pub use roster::Roster;
