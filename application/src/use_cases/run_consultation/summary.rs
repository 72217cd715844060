//! Final summary generation
//!
//! Runs after `finished` is already visible. A failed call leaves the
//! summary in `error` with the failure embedded; it is not retried.

use super::RunConsultationUseCase;
use super::shared::StepResult;
use crate::ports::participant_gateway::ParticipantGateway;
use consult_domain::Participant;
use serde_json::json;
use tracing::{info, warn};

impl<G: ParticipantGateway + 'static> RunConsultationUseCase<G> {
    pub(super) async fn generate_summary(
        &self,
        generation: u64,
        summarizer: Participant,
    ) -> StepResult<()> {
        let (prompt, history) = self.shared.read(generation, |c| {
            (
                self.prompts.summary_prompt(
                    c.settings().effective_summary_prompt(),
                    c.case(),
                    c.transcript(),
                    &summarizer,
                    c.linked_consultations(),
                ),
                self.prompts.history(c.transcript(), &summarizer.id),
            )
        })?;
        info!(summarizer = %summarizer.id, "Requesting final summary");

        let result = self.gateway.invoke(&summarizer, &prompt, &history).await;
        let (_, snapshot) = match &result {
            Ok(content) => self.shared.update(generation, |c| {
                c.complete_summary(content.clone());
                Ok(())
            })?,
            Err(e) => {
                warn!(summarizer = %summarizer.id, "Summary generation failed: {}", e);
                let reason = e.to_string();
                self.shared.update(generation, |c| {
                    c.fail_summary(&reason);
                    Ok(())
                })?
            }
        };

        let summary = snapshot.final_summary();
        match &result {
            Ok(_) => self.shared.log(
                "summary_ready",
                json!({
                    "summarizer_id": summarizer.id,
                    "summarizer_name": summarizer.name,
                    "prompt": prompt,
                    "content": summary.content,
                }),
            ),
            Err(e) => self.shared.log(
                "summary_failed",
                json!({
                    "summarizer_id": summarizer.id,
                    "summarizer_name": summarizer.name,
                    "error": e.to_string(),
                }),
            ),
        }
        self.shared.observer.on_summary_changed(summary);
        self.shared.observer.on_snapshot(&snapshot);
        Ok(())
    }
}
