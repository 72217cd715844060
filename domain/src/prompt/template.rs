//! Prompt templates for the consultation flow

use crate::case::{CaseRecord, LinkedConsultation};
use crate::consultation::Transcript;
use crate::participant::Participant;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Instructions for participants without a custom prompt
    pub fn default_system_prompt() -> &'static str {
        r#"You are a senior, highly experienced clinical diagnostician. Your task is to analyse and diagnose based on the patient record provided.

You are taking part in a multi-specialist consultation and will see the opinions of other doctors. Consider their analysis, which may inspire you, but keep your own independent professional judgement.

Follow these principles:
1. Rigour: base your analysis on medical knowledge and the patient record.
2. Independence: do not change your core position just to agree with others. If another doctor is right, say so and add to it; if you disagree, state it clearly with reasons.
3. Goal: the only goal of the consultation is the best solution for the patient.
4. Clarity: state your core diagnosis, analysis and recommendations directly.

Now give your opinion based on the record and the discussion so far."#
    }

    /// Instructions for the final summary
    pub fn default_summary_prompt() -> &'static str {
        "Based on the complete consultation, write the final summary in the voice of a clinician: core diagnosis, supporting evidence, differential diagnosis, recommended examinations, treatment plan, follow-up plan and risk warnings."
    }

    /// Render the patient case
    pub fn case_block(case: &CaseRecord) -> String {
        let mut block = String::from("## Patient record\n");
        block.push_str(&format!("Name: {}\n", case.name.trim()));
        if !case.gender.trim().is_empty() {
            block.push_str(&format!("Gender: {}\n", case.gender.trim()));
        }
        if let Some(age) = case.age {
            block.push_str(&format!("Age: {age}\n"));
        }
        if !case.past_history.trim().is_empty() {
            block.push_str(&format!("Past history: {}\n", case.past_history.trim()));
        }
        block.push_str(&format!("Current problem: {}\n", case.current_problem.trim()));
        if !case.image_recognition_result.trim().is_empty() {
            block.push_str(&format!(
                "Image findings:\n{}\n",
                case.image_recognition_result.trim()
            ));
        }
        block
    }

    /// Render earlier consultations; empty when there are none
    pub fn linked_block(linked: &[LinkedConsultation]) -> String {
        if linked.is_empty() {
            return String::new();
        }
        let mut block = String::from("## Earlier consultations for this patient\n");
        for item in linked {
            block.push_str(&format!("\n### {}\n", item.consultation_name));
            if !item.current_problem.trim().is_empty() {
                block.push_str(&format!("Problem: {}\n", item.current_problem.trim()));
            }
            if !item.final_summary.trim().is_empty() {
                block.push_str(&format!("Conclusion: {}\n", item.final_summary.trim()));
            }
        }
        block
    }

    /// Render the transcript as plain text, without typing placeholders
    pub fn transcript_block(transcript: &Transcript) -> String {
        let mut block = String::from("## Discussion so far\n");
        let mut any = false;
        for entry in transcript.iter().filter(|e| !e.kind.is_transient()) {
            let (speaker, text) = entry.speaker_and_text();
            block.push_str(&format!("\n--- {} ---\n{}\n", speaker, text));
            any = true;
        }
        if !any {
            block.push_str("\n(no discussion yet)\n");
        }
        block
    }

    fn context(
        instructions: &str,
        case: &CaseRecord,
        transcript: &Transcript,
        linked: &[LinkedConsultation],
    ) -> String {
        let mut prompt = format!("{}\n\n{}", instructions.trim(), Self::case_block(case));
        let linked = Self::linked_block(linked);
        if !linked.is_empty() {
            prompt.push('\n');
            prompt.push_str(&linked);
        }
        prompt.push('\n');
        prompt.push_str(&Self::transcript_block(transcript));
        prompt
    }

    /// Prompt for one discussion turn
    pub fn discussion_prompt(
        instructions: &str,
        case: &CaseRecord,
        transcript: &Transcript,
        participant: &Participant,
        linked: &[LinkedConsultation],
    ) -> String {
        let mut prompt = Self::context(instructions, case, transcript, linked);
        prompt.push_str(&format!(
            "\nYou are {}. Give your analysis and recommendations now.",
            participant.name
        ));
        prompt
    }

    /// Prompt asking `voter` to mark the least convincing participant
    pub fn vote_prompt(
        instructions: &str,
        case: &CaseRecord,
        transcript: &Transcript,
        active: &[Participant],
        voter: &Participant,
        linked: &[LinkedConsultation],
    ) -> String {
        let mut prompt = Self::context(instructions, case, transcript, linked);
        prompt.push_str("\n## Doctors still in the consultation\n");
        for p in active {
            prompt.push_str(&format!("- {}: {}\n", p.id, p.name));
        }
        prompt.push_str(&format!(
            r#"
You are {}. Pick the doctor whose answer is the least accurate or least convincing. You may pick yourself.
Reply with JSON only, in this exact shape:
{{"targetDoctorId": "<doctor id>", "reason": "<one sentence>"}}"#,
            voter.name
        ));
        prompt
    }

    /// Prompt asking the summarizer for the final answer
    pub fn summary_prompt(
        instructions: &str,
        case: &CaseRecord,
        transcript: &Transcript,
        summarizer: &Participant,
        linked: &[LinkedConsultation],
    ) -> String {
        let mut prompt = Self::context(instructions, case, transcript, linked);
        prompt.push_str(&format!(
            "\nYou are {}. Write the final summary of this consultation now.",
            summarizer.name
        ));
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consultation::EntryKind;
    use crate::participant::ProviderKind;

    fn case() -> CaseRecord {
        let mut case = CaseRecord::new("Li Lei", "Fever and sore throat for 3 days")
            .with_past_history("Penicillin allergy");
        case.age = Some(34);
        case
    }

    fn doctor(id: &str, name: &str) -> Participant {
        Participant::new(id, name, ProviderKind::OpenAi, "m")
    }

    #[test]
    fn test_case_block_skips_empty_fields() {
        let block = PromptTemplate::case_block(&case());
        assert!(block.contains("Name: Li Lei"));
        assert!(block.contains("Age: 34"));
        assert!(block.contains("Penicillin allergy"));
        assert!(!block.contains("Gender"));
        assert!(!block.contains("Image findings"));
    }

    #[test]
    fn test_transcript_block_omits_typing_placeholder() {
        let mut t = Transcript::new();
        t.append_system("Round 1 of the consultation begins");
        t.append_transient("Dr. GPT is typing...");
        let block = PromptTemplate::transcript_block(&t);
        assert!(block.contains("Round 1"));
        assert!(!block.contains("typing"));

        assert!(PromptTemplate::transcript_block(&Transcript::new()).contains("no discussion yet"));
    }

    #[test]
    fn test_discussion_prompt_addresses_participant() {
        let mut t = Transcript::new();
        t.append(EntryKind::Doctor {
            doctor_id: "doc-2".into(),
            doctor_name: "Dr. Claude".to_string(),
            content: "Probably strep throat.".to_string(),
        });
        let prompt = PromptTemplate::discussion_prompt(
            "Be precise.",
            &case(),
            &t,
            &doctor("doc-1", "Dr. GPT"),
            &[],
        );
        assert!(prompt.starts_with("Be precise."));
        assert!(prompt.contains("Probably strep throat."));
        assert!(prompt.ends_with("You are Dr. GPT. Give your analysis and recommendations now."));
        assert!(!prompt.contains("Earlier consultations"));
    }

    #[test]
    fn test_vote_prompt_lists_roster_and_json_shape() {
        let active = vec![doctor("doc-1", "Dr. GPT"), doctor("doc-3", "Dr. Gemini")];
        let prompt = PromptTemplate::vote_prompt(
            "x",
            &case(),
            &Transcript::new(),
            &active,
            &active[0],
            &[],
        );
        assert!(prompt.contains("- doc-1: Dr. GPT"));
        assert!(prompt.contains("- doc-3: Dr. Gemini"));
        assert!(prompt.contains(r#"{"targetDoctorId": "<doctor id>""#));
    }

    #[test]
    fn test_linked_block_renders_conclusions() {
        let linked = vec![LinkedConsultation {
            consultation_name: "January visit".to_string(),
            final_summary: "Iron deficiency anemia".to_string(),
            ..Default::default()
        }];
        let prompt = PromptTemplate::summary_prompt(
            PromptTemplate::default_summary_prompt(),
            &case(),
            &Transcript::new(),
            &doctor("doc-1", "Dr. GPT"),
            &linked,
        );
        assert!(prompt.contains("### January visit"));
        assert!(prompt.contains("Conclusion: Iron deficiency anemia"));
    }
}
