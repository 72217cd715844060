//! Participant gateways
//!
//! [`HttpParticipantGateway`] talks to the real model providers over HTTP;
//! [`SimulatedGateway`] answers offline with canned opinions.
//!
//! ```text
//! HttpParticipantGateway::invoke(participant, prompt, history)
//!   ├─ openai / siliconflow / deepseek / openai-compatible ─▶ openai::complete
//!   ├─ anthropic ─▶ anthropic::complete
//!   └─ gemini    ─▶ gemini::complete
//! ```

mod anthropic;
mod gemini;
mod openai;
mod simulated;

pub use simulated::SimulatedGateway;

use async_trait::async_trait;
use consult_application::{GatewayError, ParticipantGateway};
use consult_domain::{Message, Participant, ProviderKind, Role};
use reqwest::Client;
use tracing::debug;

/// Default completion budget per call
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Gateway dispatching each call to the participant's provider
#[derive(Debug, Clone)]
pub struct HttpParticipantGateway {
    client: Client,
    max_tokens: u32,
}

impl Default for HttpParticipantGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpParticipantGateway {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl ParticipantGateway for HttpParticipantGateway {
    async fn invoke(
        &self,
        participant: &Participant,
        prompt: &str,
        history: &[Message],
    ) -> Result<String, GatewayError> {
        let Some(api_key) = participant
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
        else {
            return Err(GatewayError::MissingCredential(participant.name.clone()));
        };

        let mut messages = history.to_vec();
        messages.push(Message::user(prompt));
        let call = Call {
            client: &self.client,
            api_key,
            model: &participant.model,
            base_url: participant.base_url.as_deref().map(str::trim).filter(|u| !u.is_empty()),
            max_tokens: self.max_tokens,
        };
        debug!(
            participant = %participant.id,
            provider = %participant.provider,
            model = %participant.model,
            messages = messages.len(),
            "Invoking provider"
        );

        let reply = match &participant.provider {
            kind if kind.is_openai_compatible() => {
                let base = call
                    .base_url
                    .or_else(|| openai::default_base_url(kind))
                    .ok_or_else(|| {
                        GatewayError::Other(format!("provider '{kind}' requires a base_url"))
                    })?;
                openai::complete(&call, base, &messages).await?
            }
            ProviderKind::Anthropic => anthropic::complete(&call, &messages).await?,
            ProviderKind::Gemini => gemini::complete(&call, &messages).await?,
            other => return Err(GatewayError::UnsupportedProvider(other.to_string())),
        };

        let reply = reply.trim();
        if reply.is_empty() {
            return Err(GatewayError::InvalidResponse(format!(
                "{} returned an empty completion",
                participant.provider
            )));
        }
        Ok(reply.to_string())
    }
}

/// Per-call request parameters shared by the provider adapters
pub(crate) struct Call<'a> {
    pub client: &'a Client,
    pub api_key: &'a str,
    pub model: &'a str,
    pub base_url: Option<&'a str>,
    pub max_tokens: u32,
}

/// Send a JSON request and return the body of a successful response
pub(crate) async fn send_json(
    provider: &str,
    request: reqwest::RequestBuilder,
) -> Result<String, GatewayError> {
    let response = request
        .send()
        .await
        .map_err(|e| GatewayError::RequestFailed(format!("{provider} request failed: {e}")))?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if !status.is_success() {
        return Err(GatewayError::RequestFailed(format!(
            "{provider} API error: {status} - {body}"
        )));
    }
    Ok(body)
}

/// Split out system messages and merge consecutive messages of the same role.
///
/// Anthropic and Gemini require alternating user/assistant turns starting
/// with a user message; the transcript-derived history does not guarantee
/// either.
pub(crate) fn alternating(messages: &[Message]) -> (Option<String>, Vec<Message>) {
    let mut system: Vec<&str> = Vec::new();
    let mut turns: Vec<Message> = Vec::new();

    for message in messages {
        if message.role == Role::System {
            system.push(&message.content);
            continue;
        }
        match turns.last_mut() {
            Some(last) if last.role == message.role => {
                last.content.push_str("\n\n");
                last.content.push_str(&message.content);
            }
            _ => turns.push(message.clone()),
        }
    }

    if turns.first().is_some_and(|m| m.role == Role::Assistant) {
        turns.insert(0, Message::user("(consultation so far)"));
    }

    let system = (!system.is_empty()).then(|| system.join("\n\n"));
    (system, turns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternating_merges_and_splits_system() {
        let (system, turns) = alternating(&[
            Message::system("Be brief."),
            Message::user("[Patient] cough"),
            Message::user("[Dr. B] likely viral"),
            Message::assistant("I agree"),
            Message::user("Your turn"),
        ]);

        assert_eq!(system.as_deref(), Some("Be brief."));
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].content, "[Patient] cough\n\n[Dr. B] likely viral");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[2].role, Role::User);
    }

    #[test]
    fn test_alternating_starts_with_user() {
        let (system, turns) = alternating(&[Message::assistant("earlier"), Message::user("now")]);
        assert!(system.is_none());
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].content, "earlier");
    }

    #[tokio::test]
    async fn test_missing_credential_fails_without_request() {
        let gateway = HttpParticipantGateway::new();
        let participant = Participant::new("doc-1", "Dr. GPT", ProviderKind::OpenAi, "gpt-4o-mini");

        let err = gateway.invoke(&participant, "hello", &[]).await.unwrap_err();
        assert_eq!(err, GatewayError::MissingCredential("Dr. GPT".into()));
    }

    #[tokio::test]
    async fn test_unknown_provider_is_unsupported() {
        let gateway = HttpParticipantGateway::new();
        let participant = Participant::new("doc-1", "Dr. X", ProviderKind::Custom("ollama".into()), "m")
            .with_api_key("k");

        let err = gateway.invoke(&participant, "hello", &[]).await.unwrap_err();
        assert_eq!(err, GatewayError::UnsupportedProvider("ollama".into()));
    }

    #[tokio::test]
    async fn test_compatible_provider_needs_base_url() {
        let gateway = HttpParticipantGateway::new();
        let participant =
            Participant::new("doc-1", "Dr. Local", ProviderKind::OpenAiCompatible, "llama3")
                .with_api_key("k");

        let err = gateway.invoke(&participant, "hello", &[]).await.unwrap_err();
        assert!(matches!(err, GatewayError::Other(msg) if msg.contains("base_url")));
    }
}
