//! Vote response parsing
//!
//! Participants are asked to answer with a JSON object such as
//! `{"targetDoctorId": "doc-2", "reason": "..."}`, but replies are often
//! wrapped in prose or markdown. Parsing is best effort: anything that does
//! not resolve to a currently active participant becomes a
//! [`VoteDecision::Fallback`].

use super::vote::{DEFAULT_VOTE_REASON, VoteDecision};
use crate::participant::ParticipantId;
use serde_json::Value;

/// Target and reason as found in a vote response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVote {
    pub target_id: String,
    pub reason: String,
}

/// Extract the JSON object between the first `{` and the last `}`.
///
/// When the candidate is not valid JSON, single quotes are replaced with
/// double quotes and parsing is retried once.
fn extract_json_object(response: &str) -> Option<Value> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end <= start {
        return None;
    }
    let candidate = &response[start..=end];

    serde_json::from_str::<Value>(candidate)
        .or_else(|_| serde_json::from_str::<Value>(&candidate.replace('\'', "\"")))
        .ok()
}

/// Parse a vote response.
///
/// Returns `None` when no object with a string `targetDoctorId` is found.
/// A missing or blank reason is replaced with [`DEFAULT_VOTE_REASON`].
///
/// # Examples
///
/// ```
/// use consult_domain::quorum::parse_vote_response;
///
/// let vote = parse_vote_response(r#"I vote: {"targetDoctorId": "doc-2", "reason": "Too vague"}"#).unwrap();
/// assert_eq!(vote.target_id, "doc-2");
/// assert_eq!(vote.reason, "Too vague");
///
/// assert!(parse_vote_response("no structured answer").is_none());
/// ```
pub fn parse_vote_response(response: &str) -> Option<ParsedVote> {
    let value = extract_json_object(response)?;
    let target_id = value.get("targetDoctorId")?.as_str()?.to_string();

    let reason = match value.get("reason") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    let reason = if reason.is_empty() {
        DEFAULT_VOTE_REASON.to_string()
    } else {
        reason
    };

    Some(ParsedVote { target_id, reason })
}

/// Turn a raw response into a vote decision against the active roster
pub fn decide_vote(response: &str, active_ids: &[ParticipantId]) -> VoteDecision {
    match parse_vote_response(response) {
        Some(parsed) if active_ids.iter().any(|id| id.as_str() == parsed.target_id) => {
            VoteDecision::Resolved {
                target: ParticipantId::new(parsed.target_id),
                reason: parsed.reason,
            }
        }
        _ => VoteDecision::Fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active() -> Vec<ParticipantId> {
        vec!["doc-1".into(), "doc-2".into(), "doc-3".into()]
    }

    #[test]
    fn test_parse_plain_json() {
        let vote = parse_vote_response(r#"{"targetDoctorId":"doc-3","reason":"Missed anemia"}"#)
            .unwrap();
        assert_eq!(vote.target_id, "doc-3");
        assert_eq!(vote.reason, "Missed anemia");
    }

    #[test]
    fn test_parse_json_in_markdown_block() {
        let response = r#"
After reviewing the discussion:
```json
{"targetDoctorId": "doc-1", "reason": "Overlooks drug interaction"}
```
"#;
        assert_eq!(parse_vote_response(response).unwrap().target_id, "doc-1");
    }

    #[test]
    fn test_parse_single_quoted_json() {
        let vote = parse_vote_response("{'targetDoctorId': 'doc-2', 'reason': 'vague'}").unwrap();
        assert_eq!(vote.target_id, "doc-2");
        assert_eq!(vote.reason, "vague");
    }

    #[test]
    fn test_parse_missing_reason_uses_default() {
        let vote = parse_vote_response(r#"{"targetDoctorId":"doc-2","reason":"  "}"#).unwrap();
        assert_eq!(vote.reason, DEFAULT_VOTE_REASON);
        let vote = parse_vote_response(r#"{"targetDoctorId":"doc-2"}"#).unwrap();
        assert_eq!(vote.reason, DEFAULT_VOTE_REASON);
    }

    #[test]
    fn test_parse_failures() {
        assert!(parse_vote_response("").is_none());
        assert!(parse_vote_response("} before {").is_none());
        assert!(parse_vote_response("{not json at all}").is_none());
        assert!(parse_vote_response(r#"{"targetDoctorId": 2}"#).is_none());
        assert!(parse_vote_response(r#"{"target": "doc-1"}"#).is_none());
    }

    #[test]
    fn test_decide_vote_resolves_active_target() {
        let decision = decide_vote(r#"{"targetDoctorId":"doc-2","reason":"r"}"#, &active());
        assert_eq!(
            decision,
            VoteDecision::Resolved {
                target: "doc-2".into(),
                reason: "r".to_string()
            }
        );
    }

    #[test]
    fn test_decide_vote_falls_back_on_inactive_target() {
        let decision = decide_vote(r#"{"targetDoctorId":"doc-9","reason":"r"}"#, &active());
        assert!(decision.is_fallback());
    }

    #[test]
    fn test_decide_vote_falls_back_on_garbage() {
        assert!(decide_vote("I think doc-2 is wrong", &active()).is_fallback());
    }
}
