//! Discussion driver
//!
//! Invokes each scheduled participant in turn order. A successful reply is
//! revealed character by character into a fresh `doctor` entry; a failed
//! call becomes a `doctor` entry naming the failure. Either way the typing
//! placeholder is removed and the next participant follows. No retries.

use super::RunConsultationUseCase;
use super::shared::StepResult;
use crate::config::pacing::pause_for;
use crate::ports::participant_gateway::ParticipantGateway;
use consult_domain::{ConsultationSnapshot, EntryId, Participant, ParticipantId, Phase};
use serde_json::json;
use tracing::{debug, info, warn};

impl<G: ParticipantGateway + 'static> RunConsultationUseCase<G> {
    pub(super) async fn run_discussion(&self, generation: u64) -> StepResult<()> {
        let (queue, round) = self
            .shared
            .read(generation, |c| (c.turn_queue().to_vec(), c.current_round()))?;
        info!(round, speakers = queue.len(), "Discussion round started");

        for id in queue {
            if !self.shared.read(generation, |c| c.roster().is_active(&id))? {
                debug!(participant = %id, "Skipping inactive participant");
                continue;
            }
            self.shared.wait_while_paused(generation).await?;
            self.take_turn(generation, &id, round).await?;
        }

        let (entry, snapshot) = self.shared.update(generation, |c| c.finish_discussion())?;
        info!(round, "Discussion round ended, voting begins");
        self.shared
            .observer
            .on_phase_change(Phase::Discussion, Phase::Voting);
        self.publish(&[entry], &snapshot);
        Ok(())
    }

    async fn take_turn(&self, generation: u64, id: &ParticipantId, round: u32) -> StepResult<()> {
        let (turn, snapshot) = self.shared.update(generation, |c| c.begin_turn(id))?;
        let Some(turn) = turn else {
            return Ok(());
        };
        let participant = turn.participant;
        debug!(participant = %participant.id, round, "Turn started");
        self.shared.observer.on_turn_started(&participant, round);
        self.publish(&[turn.placeholder.clone()], &snapshot);

        let (prompt, history) = self.shared.read(generation, |c| {
            let instructions = participant.instructions(&c.settings().global_system_prompt);
            (
                self.prompts.discussion_prompt(
                    instructions,
                    c.case(),
                    c.transcript(),
                    &participant,
                    c.linked_consultations(),
                ),
                self.prompts.history(c.transcript(), &participant.id),
            )
        })?;

        let success = match self.gateway.invoke(&participant, &prompt, &history).await {
            Ok(reply) => {
                let (resolution, snapshot) = self.shared.update(generation, |c| {
                    c.open_reply(&participant, turn.placeholder.id)
                })?;
                if let Some(removed) = resolution.removed {
                    self.shared.observer.on_entry_removed(removed);
                }
                self.publish(&[resolution.entry.clone()], &snapshot);

                self.reveal(generation, resolution.entry.id, &reply).await?;
                self.shared.log(
                    "turn_completed",
                    json!({
                        "round": round,
                        "participant_id": participant.id,
                        "participant_name": participant.name,
                        "provider": participant.provider,
                        "model": participant.model,
                        "prompt": prompt,
                        "response": reply,
                        "bytes": reply.len(),
                    }),
                );
                true
            }
            Err(e) => {
                warn!(participant = %participant.id, round, "Turn failed: {}", e);
                let reason = e.to_string();
                let (resolution, snapshot) = self.shared.update(generation, |c| {
                    c.fail_turn(&participant, turn.placeholder.id, &reason)
                })?;
                if let Some(removed) = resolution.removed {
                    self.shared.observer.on_entry_removed(removed);
                }
                self.publish(&[resolution.entry], &snapshot);
                self.shared.log(
                    "turn_failed",
                    json!({
                        "round": round,
                        "participant_id": participant.id,
                        "participant_name": participant.name,
                        "provider": participant.provider,
                        "model": participant.model,
                        "error": reason,
                    }),
                );
                false
            }
        };

        let (_, snapshot) = self.shared.update(generation, |c| {
            c.end_turn();
            Ok(())
        })?;
        self.end_turn_notify(&participant, success, &snapshot);
        Ok(())
    }

    fn end_turn_notify(
        &self,
        participant: &Participant,
        success: bool,
        snapshot: &ConsultationSnapshot,
    ) {
        debug!(participant = %participant.id, success, "Turn finished");
        self.shared.observer.on_turn_finished(participant, success);
        self.shared.observer.on_snapshot(snapshot);
    }

    /// Reveal `reply` into `entry` one character at a time.
    ///
    /// The pause gate is checked before every character, so a pause freezes
    /// the visible content and a resume continues from the same offset.
    async fn reveal(&self, generation: u64, entry: EntryId, reply: &str) -> StepResult<()> {
        let mut buf = [0u8; 4];
        for ch in reply.chars() {
            self.shared.wait_while_paused(generation).await?;
            let chunk: &str = ch.encode_utf8(&mut buf);
            self.shared
                .mutate(generation, |c| c.append_stream(entry, chunk))?;
            self.shared.observer.on_stream_chunk(entry, chunk);
            pause_for(self.pacing.stream_delay).await;
        }

        let snapshot = self.shared.read(generation, |c| c.clone())?;
        self.shared.observer.on_snapshot(&snapshot);
        Ok(())
    }
}
