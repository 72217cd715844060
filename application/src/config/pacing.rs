//! Pacing parameters for perceived responsiveness.
//!
//! [`Pacing`] groups the fixed delays the engine inserts between steps.
//! They only shape how a consultation looks while it runs; the resulting
//! transcript is identical with zero delays.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Inter-step delays of the consultation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacing {
    /// Delay between two revealed characters of a reply.
    pub stream_delay: Duration,
    /// Delay after each cast vote.
    pub vote_delay: Duration,
    /// Delay between the last vote and the tally.
    pub tally_delay: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            stream_delay: Duration::from_millis(15),
            vote_delay: Duration::from_millis(50),
            tally_delay: Duration::from_millis(200),
        }
    }
}

impl Pacing {
    /// No delays at all (tests, `--fast`).
    pub fn instant() -> Self {
        Self {
            stream_delay: Duration::ZERO,
            vote_delay: Duration::ZERO,
            tally_delay: Duration::ZERO,
        }
    }

    pub fn from_millis(stream_ms: u64, vote_ms: u64, tally_ms: u64) -> Self {
        Self {
            stream_delay: Duration::from_millis(stream_ms),
            vote_delay: Duration::from_millis(vote_ms),
            tally_delay: Duration::from_millis(tally_ms),
        }
    }

    // ==================== Builder Methods ====================

    pub fn with_stream_delay(mut self, delay: Duration) -> Self {
        self.stream_delay = delay;
        self
    }

    pub fn with_vote_delay(mut self, delay: Duration) -> Self {
        self.vote_delay = delay;
        self
    }

    pub fn with_tally_delay(mut self, delay: Duration) -> Self {
        self.tally_delay = delay;
        self
    }
}

/// Sleep for `delay`, skipping the timer entirely when it is zero.
pub(crate) async fn pause_for(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let pacing = Pacing::default();
        assert_eq!(pacing.stream_delay, Duration::from_millis(15));
        assert_eq!(pacing.vote_delay, Duration::from_millis(50));
        assert_eq!(pacing.tally_delay, Duration::from_millis(200));
    }

    #[test]
    fn test_builder() {
        let pacing = Pacing::instant().with_vote_delay(Duration::from_millis(5));
        assert!(pacing.stream_delay.is_zero());
        assert_eq!(pacing.vote_delay, Duration::from_millis(5));
        assert_eq!(Pacing::from_millis(15, 50, 200), Pacing::default());
    }
}
