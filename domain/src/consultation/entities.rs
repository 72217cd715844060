//! Consultation aggregate
//!
//! Owns the case, roster, workflow, transcript, votes and final summary of
//! one consultation. Every state change goes through a method here; the
//! application layer sequences the calls and performs the external I/O in
//! between.

use super::narration;
use super::scheduler::build_turn_queue;
use super::settings::ConsultationSettings;
use super::summary::FinalSummary;
use super::termination::{self, TerminationDecision};
use super::transcript::{EntryId, EntryKind, Transcript, TranscriptEntry};
use super::workflow::{Phase, Workflow};
use crate::case::{CaseRecord, LinkedConsultation};
use crate::core::error::DomainError;
use crate::participant::{Participant, ParticipantId, Roster};
use crate::quorum::{TallyOutcome, Vote, VoteDecision, tally};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Everything needed to start a consultation
#[derive(Debug, Clone, Default)]
pub struct ConsultationSetup {
    pub name: String,
    pub case: CaseRecord,
    pub roster: Roster,
    pub settings: ConsultationSettings,
    pub linked_consultations: Vec<LinkedConsultation>,
}

impl ConsultationSetup {
    pub fn new(case: CaseRecord, roster: impl Into<Roster>) -> Self {
        Self {
            case,
            roster: roster.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_settings(mut self, settings: ConsultationSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_linked_consultations(mut self, linked: Vec<LinkedConsultation>) -> Self {
        self.linked_consultations = linked;
        self
    }
}

/// A turn that has just begun
#[derive(Debug, Clone)]
pub struct TurnStart {
    pub participant: Participant,
    /// Transient "is typing" entry
    pub placeholder: TranscriptEntry,
}

/// Transcript changes made when a turn resolves
#[derive(Debug, Clone)]
pub struct TurnResolution {
    pub removed: Option<EntryId>,
    pub entry: TranscriptEntry,
}

/// Everything that happened when a round was concluded
#[derive(Debug, Clone)]
pub struct RoundConclusion {
    pub round: u32,
    pub outcome: TallyOutcome,
    pub decision: TerminationDecision,
    /// Entries appended while concluding, in order
    pub entries: Vec<TranscriptEntry>,
    /// Participant asked for the final summary, if the consultation ended
    pub summarizer: Option<Participant>,
}

/// One consultation (Aggregate Root)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Consultation {
    name: String,
    settings: ConsultationSettings,
    case: CaseRecord,
    linked_consultations: Vec<LinkedConsultation>,
    roster: Roster,
    workflow: Workflow,
    transcript: Transcript,
    last_round_votes: Vec<Vote>,
    final_summary: FinalSummary,
}

/// Serialisable copy of the whole consultation state
pub type ConsultationSnapshot = Consultation;

impl Consultation {
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Read access ====================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> Phase {
        self.workflow.phase
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }

    pub fn current_round(&self) -> u32 {
        self.workflow.current_round
    }

    pub fn rounds_without_elimination(&self) -> u32 {
        self.workflow.rounds_without_elimination
    }

    pub fn active_turn(&self) -> Option<&ParticipantId> {
        self.workflow.active_turn.as_ref()
    }

    pub fn turn_queue(&self) -> &[ParticipantId] {
        &self.workflow.turn_queue
    }

    pub fn is_paused(&self) -> bool {
        self.workflow.paused
    }

    pub fn settings(&self) -> &ConsultationSettings {
        &self.settings
    }

    pub fn case(&self) -> &CaseRecord {
        &self.case
    }

    pub fn linked_consultations(&self) -> &[LinkedConsultation] {
        &self.linked_consultations
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.roster.get(id)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn last_round_votes(&self) -> &[Vote] {
        &self.last_round_votes
    }

    pub fn final_summary(&self) -> &FinalSummary {
        &self.final_summary
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), DomainError> {
        if self.workflow.phase != expected {
            return Err(DomainError::InvalidPhase {
                expected: expected.as_str(),
                actual: self.workflow.phase.as_str(),
            });
        }
        Ok(())
    }

    // ==================== Host operations ====================

    /// Start the consultation (`setup -> discussion`).
    ///
    /// Validation happens before any mutation, so a failed start leaves the
    /// consultation untouched. Entries added during setup (supplements) are
    /// kept.
    pub fn start(&mut self, setup: ConsultationSetup) -> Result<TranscriptEntry, DomainError> {
        self.expect_phase(Phase::Setup)?;
        setup.case.validate()?;
        setup.roster.validate()?;

        self.name = setup.name;
        self.case = setup.case;
        self.settings = setup.settings;
        self.linked_consultations = setup.linked_consultations;
        self.roster = setup.roster;
        self.roster.reset_for_start();
        self.workflow = Workflow::started();
        self.last_round_votes.clear();
        self.final_summary = FinalSummary::default();

        Ok(self
            .transcript
            .append_system(narration::round_started(self.workflow.current_round)))
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.workflow.paused = paused;
    }

    /// Append a patient supplement; blank text is ignored
    pub fn add_supplement(&mut self, text: &str) -> Option<TranscriptEntry> {
        let content = text.trim();
        if content.is_empty() {
            return None;
        }
        let author = self.case.patient_label();
        Some(self.transcript.append(EntryKind::Patient {
            author,
            content: content.to_string(),
        }))
    }

    // ==================== Discussion ====================

    /// Generate this round's speaking order
    pub fn schedule_turns<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<ParticipantId> {
        let queue = build_turn_queue(&self.roster, self.settings.turn_order, rng);
        self.workflow.turn_queue = queue.clone();
        queue
    }

    /// Begin a participant's turn.
    ///
    /// Returns `None` when the participant is no longer active.
    pub fn begin_turn(&mut self, id: &ParticipantId) -> Result<Option<TurnStart>, DomainError> {
        self.expect_phase(Phase::Discussion)?;
        let Some(participant) = self.roster.get(id).filter(|p| p.is_active()).cloned() else {
            return Ok(None);
        };

        self.workflow.active_turn = Some(id.clone());
        let placeholder = self
            .transcript
            .append_transient(narration::typing(&participant.name));
        Ok(Some(TurnStart {
            participant,
            placeholder,
        }))
    }

    /// Replace the typing placeholder with an empty `doctor` entry that the
    /// reply is revealed into
    pub fn open_reply(
        &mut self,
        participant: &Participant,
        placeholder: EntryId,
    ) -> Result<TurnResolution, DomainError> {
        self.expect_phase(Phase::Discussion)?;
        let removed = self.transcript.remove_transient(placeholder).map(|e| e.id);
        let entry = self.transcript.append(EntryKind::Doctor {
            doctor_id: participant.id.clone(),
            doctor_name: participant.name.clone(),
            content: String::new(),
        });
        Ok(TurnResolution { removed, entry })
    }

    /// Reveal the next piece of a reply
    pub fn append_stream(&mut self, entry: EntryId, chunk: &str) -> Result<(), DomainError> {
        self.transcript.extend_doctor_entry(entry, chunk)
    }

    /// Replace the typing placeholder with a failure entry
    pub fn fail_turn(
        &mut self,
        participant: &Participant,
        placeholder: EntryId,
        reason: &str,
    ) -> Result<TurnResolution, DomainError> {
        self.expect_phase(Phase::Discussion)?;
        let removed = self.transcript.remove_transient(placeholder).map(|e| e.id);
        let entry = self.transcript.append(EntryKind::Doctor {
            doctor_id: participant.id.clone(),
            doctor_name: participant.name.clone(),
            content: narration::turn_failed(&participant.name, reason),
        });
        Ok(TurnResolution { removed, entry })
    }

    pub fn end_turn(&mut self) {
        self.workflow.active_turn = None;
    }

    /// Close the discussion (`discussion -> voting`)
    pub fn finish_discussion(&mut self) -> Result<TranscriptEntry, DomainError> {
        self.expect_phase(Phase::Discussion)?;
        self.workflow.active_turn = None;
        self.workflow.phase = Phase::Voting;
        Ok(self.transcript.append_system(narration::discussion_ended()))
    }

    // ==================== Voting ====================

    /// Reset vote counters and the round's vote list; returns the voters in
    /// roster order
    pub fn begin_voting(&mut self) -> Result<Vec<ParticipantId>, DomainError> {
        self.expect_phase(Phase::Voting)?;
        self.roster.reset_votes();
        self.last_round_votes.clear();
        Ok(self.roster.active_ids())
    }

    /// Record one vote.
    ///
    /// A resolved target that is not active is treated as a fallback
    /// self-vote.
    pub fn cast_vote(
        &mut self,
        voter_id: &ParticipantId,
        decision: VoteDecision,
    ) -> Result<(Vote, TranscriptEntry), DomainError> {
        self.expect_phase(Phase::Voting)?;
        let voter = self
            .roster
            .get(voter_id)
            .cloned()
            .ok_or_else(|| DomainError::UnknownParticipant(voter_id.to_string()))?;

        let decision = match decision {
            VoteDecision::Resolved { ref target, .. } if !self.roster.is_active(target) => {
                VoteDecision::Fallback
            }
            other => other,
        };
        let (target_id, reason) = decision.into_target(&voter.id);
        let target = self
            .roster
            .get(&target_id)
            .cloned()
            .ok_or_else(|| DomainError::UnknownParticipant(target_id.to_string()))?;

        let vote = Vote::new(self.workflow.current_round, &voter, &target, reason);
        self.last_round_votes.push(vote.clone());
        let entry = self.transcript.append(EntryKind::VoteDetail {
            voter_id: vote.voter_id.clone(),
            voter_name: vote.voter_name.clone(),
            target_id: vote.target_id.clone(),
            target_name: vote.target_name.clone(),
            reason: vote.reason.clone(),
        });
        self.roster.record_vote(&target.id)?;
        Ok((vote, entry))
    }

    /// Tally the round and decide whether the consultation continues.
    ///
    /// On `Continue` the next round is opened (`voting -> discussion`) and
    /// the caller must call [`Consultation::schedule_turns`]. On termination
    /// the phase becomes `finished` and, when a summarizer exists, the final
    /// summary becomes `pending` in the same step.
    pub fn conclude_round(&mut self) -> Result<RoundConclusion, DomainError> {
        self.expect_phase(Phase::Voting)?;
        let round = self.workflow.current_round;
        let mut entries = Vec::new();

        let outcome = tally(&self.roster);
        match &outcome {
            TallyOutcome::Eliminated { id, .. } => {
                self.roster.eliminate(id)?;
                self.workflow.rounds_without_elimination = 0;
            }
            TallyOutcome::NoElimination => {
                self.workflow.rounds_without_elimination += 1;
            }
        }
        entries.push(self.transcript.append(EntryKind::VoteResult {
            content: outcome.message(),
        }));

        let decision = termination::evaluate(
            &self.roster,
            self.workflow.rounds_without_elimination,
            self.settings.max_rounds_without_elimination,
        );

        let summarizer = match &decision {
            TerminationDecision::Continue => {
                self.workflow.current_round += 1;
                self.roster.reset_votes();
                self.workflow.phase = Phase::Discussion;
                entries.push(
                    self.transcript
                        .append_system(narration::round_started(self.workflow.current_round)),
                );
                None
            }
            TerminationDecision::Stagnated { summarizer } => {
                self.workflow.phase = Phase::Finished;
                entries.push(self.transcript.append_system(narration::stagnation_reached()));
                summarizer.as_ref().and_then(|id| self.roster.get(id)).cloned()
            }
            TerminationDecision::Converged { winner } => {
                self.workflow.phase = Phase::Finished;
                let winner = winner.as_ref().and_then(|id| self.roster.get(id)).cloned();
                let message = match &winner {
                    Some(p) => narration::adopt_answer(&p.name),
                    None => narration::nobody_remains().to_string(),
                };
                entries.push(self.transcript.append_system(message));
                winner
            }
        };

        if let Some(summarizer) = &summarizer {
            self.final_summary =
                FinalSummary::pending(summarizer, self.settings.effective_summary_prompt());
        }

        Ok(RoundConclusion {
            round,
            outcome,
            decision,
            entries,
            summarizer,
        })
    }

    // ==================== Final summary ====================

    /// Store the summarizer's reply; ignored unless a summary is pending
    pub fn complete_summary(&mut self, content: impl Into<String>) -> bool {
        if !self.final_summary.is_pending() {
            return false;
        }
        self.final_summary.resolve_ready(content);
        true
    }

    /// Record a failed summary call; ignored unless a summary is pending
    pub fn fail_summary(&mut self, reason: &str) -> bool {
        if !self.final_summary.is_pending() {
            return false;
        }
        self.final_summary.resolve_error(reason);
        true
    }
}
