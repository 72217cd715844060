//! Round tally

use crate::participant::{ParticipantId, Roster};

/// Result of tallying one round of votes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TallyOutcome {
    /// Exactly one active participant held the (non-zero) maximum
    Eliminated { id: ParticipantId, name: String },
    /// Tie for the maximum, or nobody received a vote
    NoElimination,
}

impl TallyOutcome {
    /// Narration appended to the transcript as the `vote_result` entry
    pub fn message(&self) -> String {
        match self {
            TallyOutcome::Eliminated { name, .. } => format!(
                "Evaluation finished: {name} was marked least convincing and sits out the rest of the discussion."
            ),
            TallyOutcome::NoElimination => {
                "Evaluation finished: opinions were split or unclear, nobody was marked this round."
                    .to_string()
            }
        }
    }

    pub fn eliminated(&self) -> Option<&ParticipantId> {
        match self {
            TallyOutcome::Eliminated { id, .. } => Some(id),
            TallyOutcome::NoElimination => None,
        }
    }
}

/// Tally the vote counters of active participants.
///
/// Does not mutate the roster; the caller applies the outcome.
pub fn tally(roster: &Roster) -> TallyOutcome {
    let max = roster.active().map(|p| p.votes).max().unwrap_or(0);
    if max == 0 {
        return TallyOutcome::NoElimination;
    }

    let mut top = roster.active().filter(|p| p.votes == max);
    match (top.next(), top.next()) {
        (Some(p), None) => TallyOutcome::Eliminated {
            id: p.id.clone(),
            name: p.name.clone(),
        },
        _ => TallyOutcome::NoElimination,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::{Participant, ProviderKind};

    fn roster_with_votes(votes: &[(&str, u32)]) -> Roster {
        let mut r = Roster::new(
            votes
                .iter()
                .map(|(id, _)| Participant::new(*id, format!("Dr. {id}"), ProviderKind::OpenAi, "m"))
                .collect(),
        );
        for (id, n) in votes {
            for _ in 0..*n {
                r.record_vote(&(*id).into()).unwrap();
            }
        }
        r
    }

    #[test]
    fn test_unique_max_is_eliminated() {
        let r = roster_with_votes(&[("a", 2), ("b", 1), ("c", 0)]);
        assert_eq!(
            tally(&r),
            TallyOutcome::Eliminated {
                id: "a".into(),
                name: "Dr. a".to_string()
            }
        );
    }

    #[test]
    fn test_tie_means_no_elimination() {
        let r = roster_with_votes(&[("a", 1), ("b", 1), ("c", 1)]);
        assert_eq!(tally(&r), TallyOutcome::NoElimination);
        let r = roster_with_votes(&[("a", 2), ("b", 2), ("c", 0)]);
        assert_eq!(tally(&r), TallyOutcome::NoElimination);
    }

    #[test]
    fn test_zero_votes_means_no_elimination() {
        let r = roster_with_votes(&[("a", 0), ("b", 0)]);
        assert_eq!(tally(&r), TallyOutcome::NoElimination);
    }

    #[test]
    fn test_eliminated_participants_do_not_count() {
        let mut r = roster_with_votes(&[("a", 3), ("b", 1), ("c", 0)]);
        r.eliminate(&"a".into()).unwrap();
        assert_eq!(tally(&r).eliminated(), Some(&"b".into()));
    }

    #[test]
    fn test_messages_name_the_participant() {
        let outcome = TallyOutcome::Eliminated {
            id: "a".into(),
            name: "Dr. House".to_string(),
        };
        assert!(outcome.message().contains("Dr. House"));
        assert!(TallyOutcome::NoElimination.message().contains("nobody"));
    }
}
