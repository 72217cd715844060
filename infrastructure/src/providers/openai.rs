//! OpenAI chat-completions protocol (also SiliconFlow, DeepSeek and any
//! compatible endpoint)

use super::{Call, send_json};
use consult_application::GatewayError;
use consult_domain::{Message, ProviderKind};
use serde::{Deserialize, Serialize};

pub(super) fn default_base_url(kind: &ProviderKind) -> Option<&'static str> {
    match kind {
        ProviderKind::OpenAi => Some("https://api.openai.com/v1"),
        ProviderKind::SiliconFlow => Some("https://api.siliconflow.cn/v1"),
        ProviderKind::DeepSeek => Some("https://api.deepseek.com/v1"),
        _ => None,
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

pub(super) async fn complete(
    call: &Call<'_>,
    base_url: &str,
    messages: &[Message],
) -> Result<String, GatewayError> {
    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
    let request = ChatRequest {
        model: call.model,
        messages: messages
            .iter()
            .map(|m| ChatMessage {
                role: m.role.as_str(),
                content: &m.content,
            })
            .collect(),
        max_tokens: call.max_tokens,
    };

    let body = send_json(
        "OpenAI",
        call.client
            .post(url)
            .bearer_auth(call.api_key)
            .json(&request),
    )
    .await?;
    parse_response(&body)
}

fn parse_response(body: &str) -> Result<String, GatewayError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(format!("malformed completion: {e}")))?;

    if let Some(error) = response.error {
        return Err(GatewayError::RequestFailed(error.message));
    }

    response
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| GatewayError::InvalidResponse("empty completion".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"Likely asthma."}}]}"#;
        assert_eq!(parse_response(body).unwrap(), "Likely asthma.");
    }

    #[test]
    fn test_parse_empty_choices() {
        let err = parse_response(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, GatewayError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_error_object() {
        let err = parse_response(r#"{"error":{"message":"invalid api key"}}"#).unwrap_err();
        assert_eq!(err, GatewayError::RequestFailed("invalid api key".into()));
    }

    #[test]
    fn test_default_base_urls() {
        assert!(default_base_url(&ProviderKind::DeepSeek).is_some());
        assert!(default_base_url(&ProviderKind::OpenAiCompatible).is_none());
    }
}
