//! Prompt construction port
//!
//! Building the text sent to a provider is a pure transform of the case,
//! the transcript and the participant. The engine only depends on this
//! trait; [`TemplatePromptBuilder`] is the default.

use consult_domain::prompt::provider_history;
use consult_domain::{
    CaseRecord, LinkedConsultation, Message, Participant, ParticipantId, PromptTemplate,
    Transcript,
};

/// Builds prompts for discussion turns, votes and the final summary
pub trait PromptBuilder: Send + Sync {
    fn discussion_prompt(
        &self,
        instructions: &str,
        case: &CaseRecord,
        transcript: &Transcript,
        participant: &Participant,
        linked: &[LinkedConsultation],
    ) -> String;

    fn vote_prompt(
        &self,
        instructions: &str,
        case: &CaseRecord,
        transcript: &Transcript,
        active: &[Participant],
        voter: &Participant,
        linked: &[LinkedConsultation],
    ) -> String;

    fn summary_prompt(
        &self,
        instructions: &str,
        case: &CaseRecord,
        transcript: &Transcript,
        summarizer: &Participant,
        linked: &[LinkedConsultation],
    ) -> String;

    /// Prior conversation passed to the provider alongside the prompt
    fn history(&self, transcript: &Transcript, participant: &ParticipantId) -> Vec<Message> {
        provider_history(transcript, participant)
    }
}

/// Prompt builder backed by [`PromptTemplate`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplatePromptBuilder;

impl PromptBuilder for TemplatePromptBuilder {
    fn discussion_prompt(
        &self,
        instructions: &str,
        case: &CaseRecord,
        transcript: &Transcript,
        participant: &Participant,
        linked: &[LinkedConsultation],
    ) -> String {
        PromptTemplate::discussion_prompt(instructions, case, transcript, participant, linked)
    }

    fn vote_prompt(
        &self,
        instructions: &str,
        case: &CaseRecord,
        transcript: &Transcript,
        active: &[Participant],
        voter: &Participant,
        linked: &[LinkedConsultation],
    ) -> String {
        PromptTemplate::vote_prompt(instructions, case, transcript, active, voter, linked)
    }

    fn summary_prompt(
        &self,
        instructions: &str,
        case: &CaseRecord,
        transcript: &Transcript,
        summarizer: &Participant,
        linked: &[LinkedConsultation],
    ) -> String {
        PromptTemplate::summary_prompt(instructions, case, transcript, summarizer, linked)
    }
}
