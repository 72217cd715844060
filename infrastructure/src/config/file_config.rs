//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and converted to domain types with
//! [`FileConfig::settings`] and [`FileConfig::roster`].

use consult_application::Pacing;
use consult_domain::config::roster_issues;
use consult_domain::{
    ConfigIssue, ConfigIssueCode, ConsultationSettings, OutputFormat, Participant, PromptTemplate,
    ProviderKind, Roster, TurnOrder,
};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Consultation behaviour and pacing
    pub consultation: FileConsultationConfig,
    /// Doctor roster; empty means the built-in panel
    pub doctors: Vec<FileDoctorConfig>,
    /// Output settings
    pub output: FileOutputConfig,
}

/// `[consultation]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConsultationConfig {
    /// "random" or "custom"
    pub turn_order: String,
    pub max_rounds_without_elimination: u32,
    pub global_system_prompt: Option<String>,
    pub summary_prompt: Option<String>,
    pub stream_delay_ms: u64,
    pub vote_delay_ms: u64,
    pub tally_delay_ms: u64,
}

impl Default for FileConsultationConfig {
    fn default() -> Self {
        let pacing = Pacing::default();
        Self {
            turn_order: TurnOrder::default().as_str().to_string(),
            max_rounds_without_elimination: 3,
            global_system_prompt: None,
            summary_prompt: None,
            stream_delay_ms: pacing.stream_delay.as_millis() as u64,
            vote_delay_ms: pacing.vote_delay.as_millis() as u64,
            tally_delay_ms: pacing.tally_delay.as_millis() as u64,
        }
    }
}

impl FileConsultationConfig {
    /// Parse `turn_order`, falling back to random on an unknown value
    pub fn parse_turn_order(&self) -> (TurnOrder, Vec<ConfigIssue>) {
        match self.turn_order.parse::<TurnOrder>() {
            Ok(order) => (order, Vec::new()),
            Err(_) => (
                TurnOrder::Random,
                vec![ConfigIssue::warning(
                    ConfigIssueCode::InvalidTurnOrder,
                    format!(
                        "consultation.turn_order: unknown value '{}', falling back to 'random'",
                        self.turn_order
                    ),
                )],
            ),
        }
    }

    pub fn pacing(&self) -> Pacing {
        Pacing::from_millis(self.stream_delay_ms, self.vote_delay_ms, self.tally_delay_ms)
    }
}

/// One `[[doctors]]` entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDoctorConfig {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub model: String,
    /// Direct API key (prefer `api_key_env`)
    pub api_key: Option<String>,
    /// Environment variable read when `api_key` is empty
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub custom_prompt: Option<String>,
}

impl FileDoctorConfig {
    /// Resolve the API key, consulting `api_key_env` when needed
    pub fn resolve_api_key(&self) -> Option<String> {
        let direct = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());
        if let Some(key) = direct {
            return Some(key.to_string());
        }
        let var = self.api_key_env.as_deref()?.trim();
        if var.is_empty() {
            return None;
        }
        std::env::var(var).ok().filter(|k| !k.trim().is_empty())
    }

    pub fn to_participant(&self) -> Participant {
        let Ok(provider) = self.provider.parse::<ProviderKind>();
        let name = if self.name.trim().is_empty() {
            self.id.clone()
        } else {
            self.name.clone()
        };
        Participant {
            api_key: self.resolve_api_key(),
            base_url: self.base_url.clone().filter(|u| !u.trim().is_empty()),
            custom_prompt: self.custom_prompt.clone().filter(|p| !p.trim().is_empty()),
            ..Participant::new(self.id.trim(), name, provider, self.model.clone())
        }
    }
}

/// `[output]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    pub format: Option<OutputFormat>,
    /// Colored console output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

impl FileConfig {
    /// Consultation settings with built-in prompts where none are configured
    pub fn settings(&self) -> ConsultationSettings {
        let c = &self.consultation;
        let mut settings = ConsultationSettings::default()
            .with_turn_order(c.parse_turn_order().0)
            .with_max_rounds_without_elimination(c.max_rounds_without_elimination);
        if let Some(prompt) = c.global_system_prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            settings.global_system_prompt = prompt.to_string();
        }
        settings.summary_prompt = c
            .summary_prompt
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| PromptTemplate::default_summary_prompt().to_string());
        settings
    }

    /// Configured roster, or the built-in panel when none is configured
    pub fn roster(&self) -> Roster {
        if self.doctors.is_empty() {
            return Roster::default_panel();
        }
        Roster::new(self.doctors.iter().map(FileDoctorConfig::to_participant).collect())
    }

    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.consultation.parse_turn_order().1);

        if self.consultation.max_rounds_without_elimination == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroStagnationThreshold,
                "consultation.max_rounds_without_elimination is 0, using 1",
            ));
        }

        issues.extend(roster_issues(&self.roster()));
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[consultation]
turn_order = "custom"
max_rounds_without_elimination = 5
summary_prompt = "Summarize for a general practitioner."
stream_delay_ms = 0

[[doctors]]
id = "gp"
name = "Dr. House"
provider = "deepseek"
model = "deepseek-chat"
api_key = "sk-test"

[[doctors]]
id = "cardio"
provider = "anthropic"
model = "claude-3-haiku-20240307"
custom_prompt = "You are a cardiologist."

[output]
format = "full"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let settings = config.settings();
        assert_eq!(settings.turn_order, TurnOrder::Custom);
        assert_eq!(settings.max_rounds_without_elimination, 5);
        assert_eq!(settings.summary_prompt, "Summarize for a general practitioner.");
        assert_eq!(config.consultation.pacing().stream_delay, Duration::ZERO);
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert!(!config.output.color);

        let roster = config.roster();
        assert_eq!(roster.len(), 2);
        let gp = roster.first().unwrap();
        assert_eq!(gp.provider, ProviderKind::DeepSeek);
        assert!(gp.has_credential());
        let cardio = roster.get(&"cardio".into()).unwrap();
        // Name falls back to the id
        assert_eq!(cardio.name, "cardio");
        assert_eq!(cardio.custom_prompt.as_deref(), Some("You are a cardiologist."));
        assert!(!cardio.has_credential());
    }

    #[test]
    fn test_defaults_use_builtin_panel() {
        let config = FileConfig::default();
        let roster = config.roster();
        assert_eq!(roster.len(), 3);
        assert_eq!(config.settings().max_rounds_without_elimination, 3);
        assert_eq!(config.consultation.pacing(), Pacing::default());
        assert!(config.output.color);
    }

    #[test]
    fn test_invalid_turn_order_warns() {
        let config: FileConfig = toml::from_str(
            r#"
[consultation]
turn_order = "alphabetical"
max_rounds_without_elimination = 0
"#,
        )
        .unwrap();

        assert_eq!(config.settings().turn_order, TurnOrder::Random);
        assert_eq!(config.settings().max_rounds_without_elimination, 1);
        let codes: Vec<_> = config.validate().into_iter().map(|i| i.code).collect();
        assert!(codes.contains(&ConfigIssueCode::InvalidTurnOrder));
        assert!(codes.contains(&ConfigIssueCode::ZeroStagnationThreshold));
    }

    #[test]
    fn test_validate_reports_roster_problems() {
        let config: FileConfig = toml::from_str(
            r#"
[[doctors]]
id = "a"
provider = "openai"
model = "gpt-4o-mini"
api_key = "k"

[[doctors]]
id = "a"
provider = "mistral"
model = "m"
api_key = "k"
"#,
        )
        .unwrap();

        let issues = config.validate();
        assert!(issues.iter().all(|i| i.is_error()));
        let codes: Vec<_> = issues.into_iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![
                ConfigIssueCode::DuplicateParticipantId,
                ConfigIssueCode::UnknownProvider
            ]
        );
    }

    #[test]
    fn test_blank_api_key_is_no_credential() {
        let doctor = FileDoctorConfig {
            id: "x".into(),
            provider: "openai".into(),
            api_key: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(doctor.resolve_api_key(), None);
        assert!(!doctor.to_participant().has_credential());
    }
}
