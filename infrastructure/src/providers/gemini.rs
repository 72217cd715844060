//! Gemini `generateContent` API

use super::{Call, alternating, send_json};
use consult_application::GatewayError;
use consult_domain::{Message, Role};
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<TextPart>,
}

#[derive(Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<TextPart>,
}

#[derive(Serialize, Deserialize)]
struct TextPart {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

pub(super) async fn complete(call: &Call<'_>, messages: &[Message]) -> Result<String, GatewayError> {
    let (system, turns) = alternating(messages);
    let request = GenerateRequest {
        contents: turns
            .into_iter()
            .map(|m| GeminiContent {
                role: if m.role == Role::Assistant { "model" } else { "user" },
                parts: vec![TextPart { text: m.content }],
            })
            .collect(),
        system_instruction: system.map(|text| GeminiSystemInstruction {
            parts: vec![TextPart { text }],
        }),
        generation_config: GenerationConfig {
            max_output_tokens: call.max_tokens,
        },
    };
    let url = format!(
        "{}/models/{}:generateContent",
        call.base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/'),
        call.model
    );

    let body = send_json(
        "Gemini",
        call.client
            .post(url)
            .header("x-goog-api-key", call.api_key)
            .json(&request),
    )
    .await?;
    parse_response(&body)
}

fn parse_response(body: &str) -> Result<String, GatewayError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::InvalidResponse(format!("malformed response: {e}")))?;

    if let Some(error) = response.error {
        return Err(GatewayError::RequestFailed(error.message));
    }

    let text: String = response
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(GatewayError::InvalidResponse(
            "no candidate text (possibly blocked by safety filters)".to_string(),
        ));
    }
    Ok(text)
}
