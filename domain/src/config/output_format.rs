//! Output format value object

use serde::{Deserialize, Serialize};

/// How a finished consultation is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Transcript, votes and summary
    Full,
    /// Only the final summary (default)
    #[default]
    Summary,
    /// JSON snapshot of the consultation
    Json,
}
