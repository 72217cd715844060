//! Participant entities

use super::provider::ProviderKind;
use crate::util::non_blank;
use serde::{Deserialize, Serialize};

/// Stable, unique identifier of a participant
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Eligibility of a participant within one consultation
///
/// Only `Active -> Eliminated` happens during a consultation; everyone is
/// reset to `Active` when a consultation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    #[default]
    Active,
    Eliminated,
}

impl ParticipantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantStatus::Active => "active",
            ParticipantStatus::Eliminated => "eliminated",
        }
    }
}

/// A simulated deliberation agent bound to an external model provider (Entity)
///
/// Credential and endpoint fields are opaque to the consultation engine;
/// only their presence matters (see [`Participant::has_credential`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub provider: ProviderKind,
    pub model: String,
    /// Never written to snapshots
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Replaces the global system prompt for this participant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
    #[serde(default)]
    pub status: ParticipantStatus,
    #[serde(default)]
    pub votes: u32,
}

impl Participant {
    pub fn new(
        id: impl Into<ParticipantId>,
        name: impl Into<String>,
        provider: ProviderKind,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            provider,
            model: model.into(),
            api_key: None,
            base_url: None,
            custom_prompt: None,
            status: ParticipantStatus::Active,
            votes: 0,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_custom_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_prompt = Some(prompt.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == ParticipantStatus::Active
    }

    /// Whether the participant carries a usable credential.
    ///
    /// Participants without one vote for themselves (simulated mode).
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().and_then(non_blank).is_some()
    }

    /// Instructions used for this participant's prompts
    pub fn instructions<'a>(&'a self, global: &'a str) -> &'a str {
        self.custom_prompt
            .as_deref()
            .and_then(non_blank)
            .unwrap_or(global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctor() -> Participant {
        Participant::new("doc-1", "Dr. GPT", ProviderKind::OpenAi, "gpt-4o-mini")
    }

    #[test]
    fn test_new_participant_is_active() {
        let p = doctor();
        assert!(p.is_active());
        assert_eq!(p.votes, 0);
        assert_eq!(p.id.as_str(), "doc-1");
    }

    #[test]
    fn test_has_credential_ignores_blank_keys() {
        assert!(!doctor().has_credential());
        assert!(!doctor().with_api_key("   ").has_credential());
        assert!(doctor().with_api_key("sk-test").has_credential());
    }

    #[test]
    fn test_instructions_prefer_custom_prompt() {
        let p = doctor();
        assert_eq!(p.instructions("global"), "global");

        let p = doctor().with_custom_prompt("You are a cardiologist.");
        assert_eq!(p.instructions("global"), "You are a cardiologist.");

        let p = doctor().with_custom_prompt("  ");
        assert_eq!(p.instructions("global"), "global");
    }

    #[test]
    fn test_api_key_not_serialized() {
        let p = doctor().with_api_key("sk-secret");
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("sk-secret"));
        assert!(json.contains("\"status\":\"active\""));
    }

    #[test]
    fn test_deserialize_defaults_status_and_votes() {
        let json = r#"{"id":"doc-2","name":"Dr. Claude","provider":"anthropic","model":"claude-3-haiku","api_key":"k"}"#;
        let p: Participant = serde_json::from_str(json).unwrap();
        assert!(p.is_active());
        assert_eq!(p.votes, 0);
        assert!(p.has_credential());
        assert_eq!(p.provider, ProviderKind::Anthropic);
    }
}
