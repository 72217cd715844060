//! End-of-round termination policy

use crate::participant::{ParticipantId, Roster};

/// What happens after a round's tally
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationDecision {
    /// Start the next round
    Continue,
    /// Too many consecutive rounds without elimination
    Stagnated { summarizer: Option<ParticipantId> },
    /// At most one participant remains
    Converged { winner: Option<ParticipantId> },
}

impl TerminationDecision {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TerminationDecision::Continue)
    }

    pub fn summarizer(&self) -> Option<&ParticipantId> {
        match self {
            TerminationDecision::Continue => None,
            TerminationDecision::Stagnated { summarizer } => summarizer.as_ref(),
            TerminationDecision::Converged { winner } => winner.as_ref(),
        }
    }
}

/// Evaluate end conditions on post-tally state.
///
/// Stagnation is checked before convergence. A stagnated consultation is
/// summarized by the first active participant, or by the first participant
/// on the roster when nobody is active.
pub fn evaluate(
    roster: &Roster,
    rounds_without_elimination: u32,
    max_rounds_without_elimination: u32,
) -> TerminationDecision {
    if rounds_without_elimination >= max_rounds_without_elimination {
        let summarizer = roster
            .active()
            .next()
            .or_else(|| roster.first())
            .map(|p| p.id.clone());
        return TerminationDecision::Stagnated { summarizer };
    }

    if roster.active_count() <= 1 {
        let winner = roster.active().next().map(|p| p.id.clone());
        return TerminationDecision::Converged { winner };
    }

    TerminationDecision::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::{Participant, ProviderKind};

    fn roster(ids: &[&str]) -> Roster {
        Roster::new(
            ids.iter()
                .map(|id| Participant::new(*id, *id, ProviderKind::OpenAi, "m"))
                .collect(),
        )
    }

    #[test]
    fn test_continue_below_threshold() {
        let r = roster(&["a", "b", "c"]);
        assert_eq!(evaluate(&r, 2, 3), TerminationDecision::Continue);
    }

    #[test]
    fn test_stagnation_uses_first_active() {
        let mut r = roster(&["a", "b", "c"]);
        r.eliminate(&"a".into()).unwrap();
        assert_eq!(
            evaluate(&r, 3, 3),
            TerminationDecision::Stagnated {
                summarizer: Some("b".into())
            }
        );
    }

    #[test]
    fn test_stagnation_wins_over_convergence() {
        let mut r = roster(&["a", "b"]);
        r.eliminate(&"b".into()).unwrap();
        assert!(matches!(
            evaluate(&r, 1, 1),
            TerminationDecision::Stagnated { .. }
        ));
    }

    #[test]
    fn test_stagnation_with_nobody_active_falls_back_to_roster() {
        let mut r = roster(&["a"]);
        r.eliminate(&"a".into()).unwrap();
        assert_eq!(evaluate(&r, 3, 3).summarizer(), Some(&"a".into()));
    }

    #[test]
    fn test_converged_single_winner() {
        let mut r = roster(&["a", "b"]);
        r.eliminate(&"a".into()).unwrap();
        assert_eq!(
            evaluate(&r, 0, 3),
            TerminationDecision::Converged {
                winner: Some("b".into())
            }
        );
    }

    #[test]
    fn test_converged_nobody_left() {
        let mut r = roster(&["a"]);
        r.eliminate(&"a".into()).unwrap();
        let decision = evaluate(&r, 0, 3);
        assert_eq!(decision, TerminationDecision::Converged { winner: None });
        assert!(decision.is_terminal());
        assert!(decision.summarizer().is_none());
    }
}
