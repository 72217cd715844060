//! Final summary record

use crate::participant::{Participant, ParticipantId};
use serde::{Deserialize, Serialize};

/// Lifecycle of the final summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryStatus {
    #[default]
    Idle,
    Pending,
    Ready,
    Error,
}

impl SummaryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryStatus::Idle => "idle",
            SummaryStatus::Pending => "pending",
            SummaryStatus::Ready => "ready",
            SummaryStatus::Error => "error",
        }
    }
}

/// The consolidated final answer of a consultation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinalSummary {
    pub status: SummaryStatus,
    pub doctor_id: Option<ParticipantId>,
    pub doctor_name: String,
    pub content: String,
    /// Summary instructions the summarizer was given
    pub used_prompt: String,
}

impl FinalSummary {
    /// Pending summary assigned to `summarizer`
    pub fn pending(summarizer: &Participant, used_prompt: impl Into<String>) -> Self {
        Self {
            status: SummaryStatus::Pending,
            doctor_id: Some(summarizer.id.clone()),
            doctor_name: summarizer.name.clone(),
            content: String::new(),
            used_prompt: used_prompt.into(),
        }
    }

    pub fn resolve_ready(&mut self, content: impl Into<String>) {
        self.status = SummaryStatus::Ready;
        self.content = content.into();
    }

    pub fn resolve_error(&mut self, reason: &str) {
        self.status = SummaryStatus::Error;
        self.content = format!("Summary generation failed: {reason}");
    }

    pub fn is_pending(&self) -> bool {
        self.status == SummaryStatus::Pending
    }
}
