//! Voting and elimination
//!
//! Every active participant votes once, in roster order. Participants
//! without a credential vote for themselves. For the others, anything that
//! does not resolve to an active participant (failed call, unparseable
//! reply, unknown target) becomes a self-vote with the fallback reason.

use super::RunConsultationUseCase;
use super::shared::StepResult;
use crate::config::pacing::pause_for;
use crate::ports::participant_gateway::ParticipantGateway;
use consult_domain::{
    Participant, ParticipantId, Phase, RoundConclusion, TerminationDecision, VoteDecision,
    decide_vote,
};
use serde_json::json;
use std::sync::PoisonError;
use tracing::{debug, info, warn};

impl<G: ParticipantGateway + 'static> RunConsultationUseCase<G> {
    pub(super) async fn run_voting(&self, generation: u64) -> StepResult<()> {
        let (voters, snapshot) = self.shared.update(generation, |c| c.begin_voting())?;
        self.shared.observer.on_snapshot(&snapshot);
        info!(
            round = snapshot.current_round(),
            voters = voters.len(),
            "Voting started"
        );

        for voter_id in voters {
            self.shared.wait_while_paused(generation).await?;

            let Some(voter) = self
                .shared
                .read(generation, |c| c.participant(&voter_id).cloned())?
            else {
                continue;
            };
            let decision = self.collect_vote(generation, &voter).await?;

            let ((vote, entry), snapshot) = self
                .shared
                .update(generation, |c| c.cast_vote(&voter_id, decision))?;
            debug!(
                voter = %vote.voter_id,
                target = %vote.target_id,
                "Vote cast"
            );
            self.shared.log("vote_cast", json!(&vote));
            self.shared.observer.on_vote_cast(&vote);
            self.publish(&[entry], &snapshot);

            pause_for(self.pacing.vote_delay).await;
        }

        pause_for(self.pacing.tally_delay).await;
        Ok(())
    }

    /// Ask `voter` for its vote and interpret the reply
    async fn collect_vote(&self, generation: u64, voter: &Participant) -> StepResult<VoteDecision> {
        if !voter.has_credential() {
            debug!(voter = %voter.id, "No credential, casting simulated self-vote");
            return Ok(VoteDecision::Simulated);
        }

        let (prompt, history, active_ids) = self.shared.read(generation, |c| {
            let active: Vec<Participant> = c.roster().active().cloned().collect();
            let instructions = voter.instructions(&c.settings().global_system_prompt);
            (
                self.prompts.vote_prompt(
                    instructions,
                    c.case(),
                    c.transcript(),
                    &active,
                    voter,
                    c.linked_consultations(),
                ),
                self.prompts.history(c.transcript(), &voter.id),
                active.into_iter().map(|p| p.id).collect::<Vec<ParticipantId>>(),
            )
        })?;

        let decision = match self.gateway.invoke(voter, &prompt, &history).await {
            Ok(reply) => decide_vote(&reply, &active_ids),
            Err(e) => {
                warn!(voter = %voter.id, "Vote request failed: {}", e);
                VoteDecision::Fallback
            }
        };
        if decision.is_fallback() {
            debug!(voter = %voter.id, "Vote could not be resolved, falling back to self-vote");
        }
        Ok(decision)
    }

    /// Tally, apply the outcome and decide whether to continue.
    ///
    /// On continue the next round's turn queue is generated in the same
    /// step. On termination the phase becomes `finished` and the summary
    /// becomes `pending` together.
    pub(super) fn conclude_round(&self, generation: u64) -> StepResult<RoundConclusion> {
        let (conclusion, snapshot) = self.shared.update(generation, |c| {
            let conclusion = c.conclude_round()?;
            if !conclusion.decision.is_terminal() {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                c.schedule_turns(&mut *rng);
            }
            Ok(conclusion)
        })?;

        match conclusion.outcome.eliminated() {
            Some(id) => info!(round = conclusion.round, eliminated = %id, "Round tallied"),
            None => info!(
                round = conclusion.round,
                rounds_without_elimination = snapshot.rounds_without_elimination(),
                "Round tallied without elimination"
            ),
        }
        self.shared.log(
            "round_tallied",
            json!({
                "round": conclusion.round,
                "eliminated": conclusion.outcome.eliminated(),
                "message": conclusion.outcome.message(),
                "votes": snapshot.last_round_votes(),
                "rounds_without_elimination": snapshot.rounds_without_elimination(),
                "active": snapshot.roster().active_ids(),
            }),
        );

        let next_phase = snapshot.phase();
        self.shared.observer.on_phase_change(Phase::Voting, next_phase);
        if next_phase == Phase::Finished {
            let reason = match &conclusion.decision {
                TerminationDecision::Stagnated { .. } => "stagnated",
                TerminationDecision::Converged { .. } => "converged",
                TerminationDecision::Continue => "continue",
            };
            info!(
                round = conclusion.round,
                reason,
                summarizer = conclusion.summarizer.as_ref().map(|p| p.id.as_str()),
                "Consultation finished"
            );
            self.shared.log(
                "consultation_finished",
                json!({
                    "round": conclusion.round,
                    "reason": reason,
                    "summarizer": conclusion.summarizer.as_ref().map(|p| &p.id),
                    "active": snapshot.roster().active_ids(),
                }),
            );
            self.shared
                .observer
                .on_summary_changed(snapshot.final_summary());
        }
        self.publish(&conclusion.entries, &snapshot);

        Ok(conclusion)
    }
}
