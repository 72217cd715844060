//! Chat history handed to providers alongside the prompt

use crate::consultation::{EntryKind, Transcript};
use crate::participant::ParticipantId;
use serde::{Deserialize, Serialize};

/// Role of a message in a provider conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// A message in a provider conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Map the transcript to chat messages from `participant`'s point of view.
///
/// The participant's own `doctor` entries become assistant messages; every
/// other entry becomes a user message prefixed with its speaker. Typing
/// placeholders and empty entries are left out.
pub fn provider_history(transcript: &Transcript, participant: &ParticipantId) -> Vec<Message> {
    transcript
        .iter()
        .filter(|entry| !entry.kind.is_transient())
        .filter_map(|entry| match &entry.kind {
            EntryKind::Doctor {
                doctor_id, content, ..
            } if doctor_id == participant => {
                (!content.is_empty()).then(|| Message::assistant(content.clone()))
            }
            _ => {
                let (speaker, text) = entry.speaker_and_text();
                (!text.is_empty()).then(|| Message::user(format!("[{speaker}] {text}")))
            }
        })
        .collect()
}
