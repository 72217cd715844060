//! Voting and elimination domain
//!
//! After every discussion round each active participant votes for the
//! answer it finds least convincing. A unique, non-zero maximum is
//! eliminated; anything else counts as a round without elimination.
//!
//! ```text
//! response ──parse_vote_response──▶ ParsedVote
//!          ──decide_vote──────────▶ VoteDecision ──▶ Vote (recorded)
//! roster votes ──tally───────────▶ TallyOutcome
//! ```

pub mod parsing;
pub mod tally;
pub mod vote;

pub use parsing::{ParsedVote, decide_vote, parse_vote_response};
pub use tally::{TallyOutcome, tally};
pub use vote::{
    DEFAULT_VOTE_REASON, SIMULATED_VOTE_REASON, UNRESOLVED_VOTE_REASON, Vote, VoteDecision,
};
