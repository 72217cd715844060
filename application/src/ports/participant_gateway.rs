//! Participant gateway port
//!
//! Defines the interface for invoking the model provider behind a
//! participant.

use async_trait::async_trait;
use consult_domain::{Message, Participant};
use thiserror::Error;

/// Errors that can occur when invoking a participant's provider.
///
/// Every variant is recovered locally by the consultation engine: a failed
/// turn becomes a transcript entry, a failed vote becomes a self-vote and a
/// failed summary becomes an `error` summary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("No API key configured for {0}")]
    MissingCredential(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for participant invocations
///
/// This port defines how the application layer talks to model providers.
/// Implementations (adapters) live in the infrastructure layer. No retries
/// or timeouts are expected from implementations.
#[async_trait]
pub trait ParticipantGateway: Send + Sync {
    /// Send `prompt` with the prior conversation and return the reply text
    async fn invoke(
        &self,
        participant: &Participant,
        prompt: &str,
        history: &[Message],
    ) -> Result<String, GatewayError>;
}
