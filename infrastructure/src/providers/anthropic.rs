//! Anthropic Messages API

use super::{Call, alternating, send_json};
use consult_application::GatewayError;
use consult_domain::Message;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

pub(super) async fn complete(call: &Call<'_>, messages: &[Message]) -> Result<String, GatewayError> {
    let (system, turns) = alternating(messages);
    let request = MessagesRequest {
        model: call.model,
        max_tokens: call.max_tokens,
        system,
        messages: turns
            .into_iter()
            .map(|m| AnthropicMessage {
                role: m.role.as_str(),
                content: m.content,
            })
            .collect(),
    };
    let url = format!(
        "{}/v1/messages",
        call.base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/')
    );

    let body = send_json(
        "Anthropic",
        call.client
            .post(url)
            .header("x-api-key", call.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request),
    )
    .await?;
    parse_response(&body)
}

fn parse_response(body: &str) -> Result<String, GatewayError> {
    let response: MessagesResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(format!("malformed message: {e}")))?;

    if let Some(error) = response.error {
        return Err(GatewayError::RequestFailed(error.message));
    }

    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .filter_map(|block| block.text)
        .collect();
    if text.trim().is_empty() {
        return Err(GatewayError::InvalidResponse("empty completion".to_string()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_joins_text_blocks() {
        let body = r#"{"content":[
            {"type":"text","text":"Consider "},
            {"type":"tool_use","id":"x"},
            {"type":"text","text":"pneumonia."}
        ]}"#;
        assert_eq!(parse_response(body).unwrap(), "Consider pneumonia.");
    }

    #[test]
    fn test_parse_error_object() {
        let err = parse_response(r#"{"type":"error","error":{"message":"overloaded"}}"#)
            .unwrap_err();
        assert_eq!(err, GatewayError::RequestFailed("overloaded".into()));
    }

    #[test]
    fn test_parse_not_json() {
        assert!(matches!(
            parse_response("<html>"),
            Err(GatewayError::InvalidResponse(_))
        ));
    }
}
