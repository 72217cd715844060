//! Configuration validation issues
//!
//! Loaded configuration is checked before a consultation starts. Problems
//! are reported as a list of issues with a severity rather than a hard
//! failure, so the CLI can print all of them at once.

use crate::participant::Roster;
use std::collections::HashSet;

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The configuration cannot work as written.
    Error,
    /// The configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    EmptyParticipantId,
    DuplicateParticipantId,
    UnknownProvider,
    /// No API key: the participant's calls fail and it votes for itself
    MissingCredential,
    /// `max_rounds_without_elimination = 0`; clamped to 1
    ZeroStagnationThreshold,
    /// `turn_order` is neither `random` nor `custom`
    InvalidTurnOrder,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Check a roster for problems that would surface during a consultation.
pub fn roster_issues(roster: &Roster) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for (idx, p) in roster.iter().enumerate() {
        if p.id.as_str().trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyParticipantId,
                format!("doctor #{} has an empty id", idx + 1),
            ));
        } else if !seen.insert(p.id.as_str()) {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::DuplicateParticipantId,
                format!("doctor id '{}' is used more than once", p.id),
            ));
        }

        if !p.provider.is_known() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::UnknownProvider,
                format!("doctor '{}' uses unknown provider '{}'", p.id, p.provider),
            ));
        }

        if !p.has_credential() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::MissingCredential,
                format!(
                    "doctor '{}' has no API key; its turns will fail and it will vote for itself",
                    p.id
                ),
            ));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::{Participant, ProviderKind};

    #[test]
    fn clean_roster_has_no_issues() {
        let roster = Roster::new(vec![
            Participant::new("doc-1", "Dr. GPT", ProviderKind::OpenAi, "m").with_api_key("k"),
            Participant::new("doc-2", "Dr. Claude", ProviderKind::Anthropic, "m").with_api_key("k"),
        ]);
        assert!(roster_issues(&roster).is_empty());
    }

    #[test]
    fn detects_duplicates_and_unknown_providers() {
        let roster = Roster::new(vec![
            Participant::new("doc-1", "A", ProviderKind::OpenAi, "m").with_api_key("k"),
            Participant::new("doc-1", "B", ProviderKind::Custom("ollama".into()), "m")
                .with_api_key("k"),
        ]);
        let codes: Vec<_> = roster_issues(&roster).into_iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![
                ConfigIssueCode::DuplicateParticipantId,
                ConfigIssueCode::UnknownProvider
            ]
        );
    }

    #[test]
    fn missing_credential_is_warning() {
        let roster = Roster::new(vec![Participant::new("", "A", ProviderKind::Gemini, "m")]);
        let issues = roster_issues(&roster);
        assert!(issues[0].is_error());
        assert_eq!(issues[0].code, ConfigIssueCode::EmptyParticipantId);
        assert_eq!(issues[1].severity, Severity::Warning);
    }
}
