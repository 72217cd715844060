//! Turn scheduler
//!
//! Computes the speaking order of a round from the active roster.

use super::settings::TurnOrder;
use crate::participant::{ParticipantId, Roster};
use rand::Rng;

/// Build the turn queue for one round.
///
/// `Random` attaches a random sort key to every active id and orders by it;
/// `Custom` keeps roster order. Only participants active at call time are
/// scheduled.
pub fn build_turn_queue<R: Rng + ?Sized>(
    roster: &Roster,
    order: TurnOrder,
    rng: &mut R,
) -> Vec<ParticipantId> {
    let active = roster.active_ids();
    match order {
        TurnOrder::Custom => active,
        TurnOrder::Random => {
            let mut keyed: Vec<(u64, ParticipantId)> =
                active.into_iter().map(|id| (rng.random::<u64>(), id)).collect();
            keyed.sort_by_key(|(key, _)| *key);
            keyed.into_iter().map(|(_, id)| id).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::{Participant, ProviderKind};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn roster(ids: &[&str]) -> Roster {
        Roster::new(
            ids.iter()
                .map(|id| Participant::new(*id, format!("Dr. {id}"), ProviderKind::OpenAi, "m"))
                .collect(),
        )
    }

    #[test]
    fn test_custom_order_keeps_roster_order() {
        let mut r = roster(&["c", "a", "b"]);
        r.eliminate(&"a".into()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let queue = build_turn_queue(&r, TurnOrder::Custom, &mut rng);
        assert_eq!(queue, vec!["c".into(), "b".into()]);
    }

    #[test]
    fn test_random_order_is_permutation_of_active_ids() {
        let ids = ["d1", "d2", "d3", "d4", "d5", "d6"];
        for n in 1..=ids.len() {
            let mut r = roster(&ids[..n]);
            if n > 2 {
                r.eliminate(&"d2".into()).unwrap();
            }
            let expected: HashSet<ParticipantId> = r.active_ids().into_iter().collect();

            for seed in 0..50 {
                let mut rng = StdRng::seed_from_u64(seed);
                let queue = build_turn_queue(&r, TurnOrder::Random, &mut rng);
                let got: HashSet<ParticipantId> = queue.iter().cloned().collect();
                assert_eq!(queue.len(), expected.len());
                assert_eq!(got, expected);
            }
        }
    }

    #[test]
    fn test_random_order_varies_between_seeds() {
        let r = roster(&["a", "b", "c", "d", "e"]);
        let orders: HashSet<Vec<ParticipantId>> = (0..20)
            .map(|seed| build_turn_queue(&r, TurnOrder::Random, &mut StdRng::seed_from_u64(seed)))
            .collect();
        assert!(orders.len() > 1);
    }

    #[test]
    fn test_empty_when_nobody_active() {
        let mut r = roster(&["a"]);
        r.eliminate(&"a".into()).unwrap();
        let queue = build_turn_queue(&r, TurnOrder::Random, &mut StdRng::seed_from_u64(0));
        assert!(queue.is_empty());
    }
}
