//! Prompt domain
//!
//! Templates for the discussion, vote and summary prompts, and the mapping
//! of the transcript to provider chat history.

pub mod history;
mod template;

pub use history::{Message, Role, provider_history};
pub use template::PromptTemplate;
