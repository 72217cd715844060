//! Application-level configuration.
//!
//! - [`Pacing`]: delays between engine steps (streaming reveal, votes, tally)

pub mod pacing;

pub use pacing::Pacing;
