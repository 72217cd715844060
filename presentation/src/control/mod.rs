//! Interactive stdin controls
//!
//! While a consultation runs with `--interactive`, each line typed on stdin
//! is one command:
//!
//! | Line | Effect |
//! |------|--------|
//! | `p` | pause |
//! | `r` | resume |
//! | `t` | toggle pause |
//! | `q` | reset the consultation and stop reading |
//! | anything else | patient supplement |
//!
//! Stdin is read on a plain thread so a pending read never keeps the
//! runtime alive after the consultation has finished.

use consult_application::ConsultationControls;
use tokio::sync::mpsc;
use tracing::debug;

/// One parsed control line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    TogglePause,
    Quit,
    Supplement(String),
    Empty,
}

impl ControlCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "" => ControlCommand::Empty,
            "p" | "pause" => ControlCommand::Pause,
            "r" | "resume" => ControlCommand::Resume,
            "t" | "toggle" => ControlCommand::TogglePause,
            "q" | "quit" => ControlCommand::Quit,
            _ => ControlCommand::Supplement(line.to_string()),
        }
    }
}

/// Why [`run_control_loop`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlExit {
    /// `q` was entered; the consultation has been reset
    Quit,
    /// Stdin was closed
    EndOfInput,
}

/// Forward stdin lines to a channel from a detached reader thread
pub fn stdin_lines() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Apply control lines to `controls` until `q` or the end of input
pub async fn run_control_loop(
    controls: &ConsultationControls,
    mut lines: mpsc::UnboundedReceiver<String>,
) -> ControlExit {
    while let Some(line) = lines.recv().await {
        let command = ControlCommand::parse(&line);
        debug!(?command, "Control command");
        match command {
            ControlCommand::Pause => controls.pause(),
            ControlCommand::Resume => controls.resume(),
            ControlCommand::TogglePause => controls.toggle_pause(),
            ControlCommand::Quit => {
                controls.reset();
                return ControlExit::Quit;
            }
            ControlCommand::Supplement(text) => {
                controls.submit_supplement(&text);
            }
            ControlCommand::Empty => {}
        }
    }
    ControlExit::EndOfInput
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use consult_application::{GatewayError, ParticipantGateway, RunConsultationUseCase};
    use consult_domain::{EntryKind, Message, Participant, Phase};
    use std::sync::Arc;

    struct SilentGateway;

    #[async_trait]
    impl ParticipantGateway for SilentGateway {
        async fn invoke(
            &self,
            _participant: &Participant,
            _prompt: &str,
            _history: &[Message],
        ) -> Result<String, GatewayError> {
            Ok("ok".to_string())
        }
    }

    fn send_all(lines: &[&str]) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        for line in lines {
            tx.send(line.to_string()).unwrap();
        }
        rx
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ControlCommand::parse(" p "), ControlCommand::Pause);
        assert_eq!(ControlCommand::parse("Resume"), ControlCommand::Resume);
        assert_eq!(ControlCommand::parse("t"), ControlCommand::TogglePause);
        assert_eq!(ControlCommand::parse("q"), ControlCommand::Quit);
        assert_eq!(ControlCommand::parse("   "), ControlCommand::Empty);
        assert_eq!(
            ControlCommand::parse("  Fever rose to 39C  "),
            ControlCommand::Supplement("Fever rose to 39C".to_string())
        );
    }

    #[tokio::test]
    async fn test_loop_applies_commands_until_end_of_input() {
        let use_case = RunConsultationUseCase::new(Arc::new(SilentGateway));
        let controls = use_case.controls();

        let exit = run_control_loop(&controls, send_all(&["p", "", "Cough is worse at night"])).await;

        assert_eq!(exit, ControlExit::EndOfInput);
        assert!(controls.is_paused());
        let snapshot = controls.snapshot();
        let last = snapshot.transcript().last().unwrap();
        assert!(matches!(
            &last.kind,
            EntryKind::Patient { content, .. } if content == "Cough is worse at night"
        ));
    }

    #[tokio::test]
    async fn test_toggle_then_quit_resets() {
        let use_case = RunConsultationUseCase::new(Arc::new(SilentGateway));
        let controls = use_case.controls();

        let exit = run_control_loop(&controls, send_all(&["t", "q", "p"])).await;

        assert_eq!(exit, ControlExit::Quit);
        assert!(!controls.is_paused());
        assert_eq!(controls.phase(), Phase::Setup);
        assert!(controls.snapshot().transcript().is_empty());
    }
}
