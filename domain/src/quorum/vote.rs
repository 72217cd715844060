//! Vote types for the elimination round
//!
//! Each active participant casts one vote per round for the participant
//! whose answer it finds least convincing.

use crate::participant::{Participant, ParticipantId};
use serde::{Deserialize, Serialize};

/// Reason used when a participant without credentials votes for itself
pub const SIMULATED_VOTE_REASON: &str =
    "Simulated mode: my own answer needs further support, so I mark myself.";

/// Reason used when a parsed vote carries no reason text
pub const DEFAULT_VOTE_REASON: &str = "Judgement after weighing the whole discussion.";

/// Reason used when the vote could not be resolved to an active participant
pub const UNRESOLVED_VOTE_REASON: &str = "Could not resolve a vote: defaulting to myself.";

/// A single recorded vote
///
/// # Example
///
/// ```
/// use consult_domain::participant::{Participant, ProviderKind};
/// use consult_domain::quorum::Vote;
///
/// let voter = Participant::new("doc-1", "Dr. GPT", ProviderKind::OpenAi, "gpt-4o-mini");
/// let target = Participant::new("doc-2", "Dr. Claude", ProviderKind::Anthropic, "claude-3-haiku");
///
/// let vote = Vote::new(2, &voter, &target, "Ignores the fever pattern.");
/// assert_eq!(vote.target_id.as_str(), "doc-2");
/// assert!(!vote.is_self_vote());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub round: u32,
    pub voter_id: ParticipantId,
    pub voter_name: String,
    pub target_id: ParticipantId,
    pub target_name: String,
    pub reason: String,
}

impl Vote {
    pub fn new(
        round: u32,
        voter: &Participant,
        target: &Participant,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            round,
            voter_id: voter.id.clone(),
            voter_name: voter.name.clone(),
            target_id: target.id.clone(),
            target_name: target.name.clone(),
            reason: reason.into(),
        }
    }

    pub fn is_self_vote(&self) -> bool {
        self.voter_id == self.target_id
    }
}

/// How a vote was decided before it is recorded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteDecision {
    /// Parsed from the participant's response and validated
    Resolved {
        target: ParticipantId,
        reason: String,
    },
    /// Participant has no credential and votes for itself
    Simulated,
    /// Call failed, response unparseable, or target not active
    Fallback,
}

impl VoteDecision {
    /// Target and reason for `voter`
    pub fn into_target(self, voter: &ParticipantId) -> (ParticipantId, String) {
        match self {
            VoteDecision::Resolved { target, reason } => (target, reason),
            VoteDecision::Simulated => (voter.clone(), SIMULATED_VOTE_REASON.to_string()),
            VoteDecision::Fallback => (voter.clone(), UNRESOLVED_VOTE_REASON.to_string()),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, VoteDecision::Fallback)
    }
}
