//! Provider value object identifying the external model vendor behind a participant

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Known model providers (Value Object)
///
/// Unknown provider names are preserved as [`ProviderKind::Custom`] so that
/// configuration round-trips without loss; adapters decide whether they can
/// serve them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Gemini,
    SiliconFlow,
    DeepSeek,
    /// Any endpoint speaking the OpenAI chat-completions protocol
    OpenAiCompatible,
    Custom(String),
}

impl ProviderKind {
    /// Get the string identifier for this provider
    pub fn as_str(&self) -> &str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Gemini => "gemini",
            ProviderKind::SiliconFlow => "siliconflow",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::OpenAiCompatible => "openai-compatible",
            ProviderKind::Custom(s) => s,
        }
    }

    /// Whether requests to this provider use the OpenAI chat-completions wire format
    pub fn is_openai_compatible(&self) -> bool {
        matches!(
            self,
            ProviderKind::OpenAi
                | ProviderKind::SiliconFlow
                | ProviderKind::DeepSeek
                | ProviderKind::OpenAiCompatible
        )
    }

    /// Whether this is a provider the built-in adapters know about
    pub fn is_known(&self) -> bool {
        !matches!(self, ProviderKind::Custom(_))
    }
}

impl Default for ProviderKind {
    fn default() -> Self {
        ProviderKind::OpenAi
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "openai" => ProviderKind::OpenAi,
            "anthropic" | "claude" => ProviderKind::Anthropic,
            "gemini" | "google" => ProviderKind::Gemini,
            "siliconflow" => ProviderKind::SiliconFlow,
            "deepseek" => ProviderKind::DeepSeek,
            "openai-compatible" | "openai_compatible" | "compatible" => {
                ProviderKind::OpenAiCompatible
            }
            _ => ProviderKind::Custom(s.trim().to_string()),
        })
    }
}

impl Serialize for ProviderKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ProviderKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let Ok(kind) = s.parse::<ProviderKind>();
        Ok(kind)
    }
}
