//! Offline gateway with canned replies
//!
//! Used with `--simulate` to run a full consultation without network
//! access or API keys. Replies are deterministic for a given call order.

use async_trait::async_trait;
use consult_application::{GatewayError, ParticipantGateway};
use consult_domain::{Message, Participant};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const OPINIONS: [&str; 5] = [
    "The presentation fits an acute infectious process. I would start with a complete blood count, CRP and a chest X-ray before deciding on antibiotics.",
    "I partly agree with the infectious hypothesis, but the history also warrants ruling out a cardiac cause. An ECG and troponin are cheap and fast.",
    "Given the reported course, I would not escalate treatment yet. Symptomatic care, hydration and a review in 48 hours are reasonable, with clear return precautions.",
    "The image findings deserve more weight. I suggest correlating them with the symptoms and repeating the imaging if the clinical picture changes.",
    "My main concern is medication safety. Before adding anything new, check renal function and current prescriptions for interactions.",
];

const SUMMARY: &str = "Final summary: the most likely diagnosis is an acute infectious process. \
Supporting evidence comes from the history and the examination findings. \
Differentials include cardiac and medication-related causes. \
Recommended: blood count, CRP, chest X-ray and ECG; symptomatic treatment; review in 48 hours or earlier if symptoms worsen.";

/// Gateway returning canned opinions, votes and summaries
#[derive(Debug, Default)]
pub struct SimulatedGateway {
    calls: AtomicUsize,
    latency: Duration,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait this long before every reply
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Vote for the first listed doctor other than the voter, rotating with
    /// the call counter so rounds differ
    fn vote(prompt: &str, voter: &Participant, call: usize) -> String {
        let candidates: Vec<&str> = prompt
            .lines()
            .skip_while(|line| !line.starts_with("## Doctors still in the consultation"))
            .skip(1)
            .map_while(|line| line.strip_prefix("- "))
            .filter_map(|line| line.split(':').next())
            .map(str::trim)
            .filter(|id| *id != voter.id.as_str())
            .collect();

        let target = if candidates.is_empty() {
            voter.id.as_str()
        } else {
            candidates[call % candidates.len()]
        };
        format!(
            r#"{{"targetDoctorId": "{target}", "reason": "Simulated vote: the analysis was the least specific."}}"#
        )
    }
}

#[async_trait]
impl ParticipantGateway for SimulatedGateway {
    async fn invoke(
        &self,
        participant: &Participant,
        prompt: &str,
        _history: &[Message],
    ) -> Result<String, GatewayError> {
        let call = self.calls.fetch_add(1, Ordering::Relaxed);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if prompt.contains("\"targetDoctorId\"") {
            return Ok(Self::vote(prompt, participant, call));
        }
        if prompt.contains("Write the final summary") {
            return Ok(SUMMARY.to_string());
        }
        Ok(format!(
            "As {}: {}",
            participant.name,
            OPINIONS[call % OPINIONS.len()]
        ))
    }
}
