//! Participant roster with mutable eligibility state

use super::entities::{Participant, ParticipantId, ParticipantStatus};
use super::provider::ProviderKind;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered roster of participants in one consultation
///
/// List order is significant: it is the `custom` speaking order and the
/// voting order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    pub fn new(participants: Vec<Participant>) -> Self {
        Self { participants }
    }

    /// Built-in panel of three doctors on different providers, without keys
    pub fn default_panel() -> Self {
        Self::new(vec![
            Participant::new("doc-1", "GPT-4", ProviderKind::OpenAi, "gpt-4o-mini"),
            Participant::new(
                "doc-2",
                "Claude 3",
                ProviderKind::Anthropic,
                "claude-3-haiku-20240307",
            ),
            Participant::new("doc-3", "Gemini", ProviderKind::Gemini, "gemini-1.5-flash"),
        ])
    }

    /// Check that the roster can host a consultation
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.participants.is_empty() {
            return Err(DomainError::NoParticipants);
        }
        let mut seen = HashSet::new();
        for p in &self.participants {
            if !seen.insert(&p.id) {
                return Err(DomainError::DuplicateParticipant(p.id.to_string()));
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }

    pub fn first(&self) -> Option<&Participant> {
        self.participants.first()
    }

    /// Active participants in roster order
    pub fn active(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.is_active())
    }

    pub fn active_ids(&self) -> Vec<ParticipantId> {
        self.active().map(|p| p.id.clone()).collect()
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn is_active(&self, id: &ParticipantId) -> bool {
        self.get(id).is_some_and(|p| p.is_active())
    }

    /// Reset everyone to active with zero votes (consultation start)
    pub fn reset_for_start(&mut self) {
        for p in &mut self.participants {
            p.status = ParticipantStatus::Active;
            p.votes = 0;
        }
    }

    pub fn reset_votes(&mut self) {
        for p in &mut self.participants {
            p.votes = 0;
        }
    }

    /// Add one vote to the target's counter
    pub fn record_vote(&mut self, target: &ParticipantId) -> Result<u32, DomainError> {
        let p = self
            .participants
            .iter_mut()
            .find(|p| &p.id == target)
            .ok_or_else(|| DomainError::UnknownParticipant(target.to_string()))?;
        p.votes += 1;
        Ok(p.votes)
    }

    /// Mark an active participant as eliminated
    pub fn eliminate(&mut self, id: &ParticipantId) -> Result<(), DomainError> {
        let p = self
            .participants
            .iter_mut()
            .find(|p| &p.id == id && p.is_active())
            .ok_or_else(|| DomainError::UnknownParticipant(id.to_string()))?;
        p.status = ParticipantStatus::Eliminated;
        Ok(())
    }

    /// Sum of vote counters across all participants
    pub fn total_votes(&self) -> u32 {
        self.participants.iter().map(|p| p.votes).sum()
    }
}

impl From<Vec<Participant>> for Roster {
    fn from(participants: Vec<Participant>) -> Self {
        Self::new(participants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(ids: &[&str]) -> Roster {
        Roster::new(
            ids.iter()
                .map(|id| Participant::new(*id, format!("Dr. {id}"), ProviderKind::OpenAi, "m"))
                .collect(),
        )
    }

    #[test]
    fn test_default_panel() {
        let r = Roster::default_panel();
        assert_eq!(r.len(), 3);
        assert!(r.validate().is_ok());
        assert!(r.iter().all(|p| !p.has_credential()));
    }

    #[test]
    fn test_validate_empty_roster() {
        assert_eq!(Roster::default().validate(), Err(DomainError::NoParticipants));
    }

    #[test]
    fn test_validate_duplicate_ids() {
        let r = roster(&["a", "b", "a"]);
        assert_eq!(
            r.validate(),
            Err(DomainError::DuplicateParticipant("a".to_string()))
        );
    }

    #[test]
    fn test_active_filter_keeps_roster_order() {
        let mut r = roster(&["a", "b", "c"]);
        r.eliminate(&"b".into()).unwrap();
        assert_eq!(r.active_ids(), vec!["a".into(), "c".into()]);
        assert_eq!(r.active_count(), 2);
        assert!(!r.is_active(&"b".into()));
    }

    #[test]
    fn test_eliminate_twice_fails() {
        let mut r = roster(&["a", "b"]);
        r.eliminate(&"a".into()).unwrap();
        assert!(r.eliminate(&"a".into()).is_err());
    }

    #[test]
    fn test_record_vote_and_reset() {
        let mut r = roster(&["a", "b"]);
        assert_eq!(r.record_vote(&"a".into()).unwrap(), 1);
        assert_eq!(r.record_vote(&"a".into()).unwrap(), 2);
        assert_eq!(r.total_votes(), 2);
        assert!(r.record_vote(&"zzz".into()).is_err());

        r.reset_votes();
        assert_eq!(r.total_votes(), 0);
    }

    #[test]
    fn test_reset_for_start_reactivates() {
        let mut r = roster(&["a", "b"]);
        r.record_vote(&"b".into()).unwrap();
        r.eliminate(&"b".into()).unwrap();

        r.reset_for_start();
        assert_eq!(r.active_count(), 2);
        assert_eq!(r.total_votes(), 0);
    }
}
