//! Presentation layer for consult-quorum
//!
//! This crate contains the CLI definition, the live progress observers,
//! the final report formatter and the interactive stdin controls.

pub mod cli;
pub mod control;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, OutputFormat, TurnOrderArg};
pub use control::{ControlCommand, ControlExit, run_control_loop, stdin_lines};
pub use output::{console::ConsoleFormatter, set_color_enabled};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
