//! Final report rendering

pub mod console;

/// Turn ANSI colors on or off for everything this crate prints
pub fn set_color_enabled(enabled: bool) {
    colored::control::set_override(enabled);
}
