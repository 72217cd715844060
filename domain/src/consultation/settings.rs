//! Consultation settings

use crate::prompt::PromptTemplate;
use serde::{Deserialize, Serialize};

/// How the speaking order of a round is produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnOrder {
    /// Uniformly shuffled every round
    #[default]
    Random,
    /// Roster order, filtered to active participants
    Custom,
}

impl TurnOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnOrder::Random => "random",
            TurnOrder::Custom => "custom",
        }
    }
}

impl std::fmt::Display for TurnOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TurnOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "random" => Ok(TurnOrder::Random),
            "custom" | "roster" => Ok(TurnOrder::Custom),
            other => Err(format!("unknown turn order: {other}")),
        }
    }
}

/// Per-consultation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsultationSettings {
    pub turn_order: TurnOrder,
    /// Stagnation threshold; the consultation ends when this many
    /// consecutive rounds pass without an elimination
    pub max_rounds_without_elimination: u32,
    /// Instructions for participants without a custom prompt
    pub global_system_prompt: String,
    /// Instructions for the final summary
    pub summary_prompt: String,
}

impl Default for ConsultationSettings {
    fn default() -> Self {
        Self {
            turn_order: TurnOrder::Random,
            max_rounds_without_elimination: 3,
            global_system_prompt: PromptTemplate::default_system_prompt().to_string(),
            summary_prompt: PromptTemplate::default_summary_prompt().to_string(),
        }
    }
}

impl ConsultationSettings {
    pub fn with_turn_order(mut self, order: TurnOrder) -> Self {
        self.turn_order = order;
        self
    }

    /// Set the stagnation threshold (at least 1)
    pub fn with_max_rounds_without_elimination(mut self, rounds: u32) -> Self {
        self.max_rounds_without_elimination = rounds.max(1);
        self
    }

    /// Summary instructions, falling back to the built-in text when blank
    pub fn effective_summary_prompt(&self) -> &str {
        if self.summary_prompt.trim().is_empty() {
            PromptTemplate::default_summary_prompt()
        } else {
            &self.summary_prompt
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = ConsultationSettings::default();
        assert_eq!(s.turn_order, TurnOrder::Random);
        assert_eq!(s.max_rounds_without_elimination, 3);
        assert!(!s.global_system_prompt.is_empty());
    }

    #[test]
    fn test_threshold_minimum_is_one() {
        let s = ConsultationSettings::default().with_max_rounds_without_elimination(0);
        assert_eq!(s.max_rounds_without_elimination, 1);
    }

    #[test]
    fn test_turn_order_parse() {
        assert_eq!("Random".parse::<TurnOrder>(), Ok(TurnOrder::Random));
        assert_eq!("custom".parse::<TurnOrder>(), Ok(TurnOrder::Custom));
        assert!("alphabetical".parse::<TurnOrder>().is_err());
    }

    #[test]
    fn test_blank_summary_prompt_falls_back() {
        let s = ConsultationSettings {
            summary_prompt: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(s.effective_summary_prompt(), PromptTemplate::default_summary_prompt());
    }
}
