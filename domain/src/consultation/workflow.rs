//! Workflow state of a consultation

use crate::participant::ParticipantId;
use serde::{Deserialize, Serialize};

/// Externally observable phase of a consultation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Case and roster are being prepared
    #[default]
    Setup,
    /// Participants speak in turn
    Discussion,
    /// Participants vote for the least convincing answer
    Voting,
    /// Terminal for this consultation instance
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Setup => "setup",
            Phase::Discussion => "discussion",
            Phase::Voting => "voting",
            Phase::Finished => "finished",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Setup => "Setup",
            Phase::Discussion => "Discussion",
            Phase::Voting => "Voting",
            Phase::Finished => "Finished",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Phase::Discussion | Phase::Voting)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Round bookkeeping and the speaking schedule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub phase: Phase,
    pub current_round: u32,
    /// Consecutive rounds that ended without an elimination
    pub rounds_without_elimination: u32,
    /// Participant currently speaking, if any
    pub active_turn: Option<ParticipantId>,
    pub turn_queue: Vec<ParticipantId>,
    pub paused: bool,
}

impl Workflow {
    /// Fresh state for round 1 of a new consultation
    pub fn started() -> Self {
        Self {
            phase: Phase::Discussion,
            current_round: 1,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_workflow_is_setup() {
        let wf = Workflow::default();
        assert_eq!(wf.phase, Phase::Setup);
        assert_eq!(wf.current_round, 0);
        assert!(wf.active_turn.is_none());
        assert!(!wf.paused);
    }

    #[test]
    fn test_started_workflow() {
        let wf = Workflow::started();
        assert_eq!(wf.phase, Phase::Discussion);
        assert_eq!(wf.current_round, 1);
        assert_eq!(wf.rounds_without_elimination, 0);
    }

    #[test]
    fn test_phase_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Phase::Voting).unwrap(), "\"voting\"");
        assert!(Phase::Discussion.is_running());
        assert!(!Phase::Finished.is_running());
    }
}
