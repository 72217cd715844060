//! Live progress reporting for a running consultation

use colored::Colorize;
use consult_application::ConsultationObserver;
use consult_domain::util::truncate_str;
use consult_domain::{
    EntryId, EntryKind, FinalSummary, Participant, Phase, SummaryStatus, TranscriptEntry, Vote,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Shows the consultation as it happens: a typing spinner per turn, replies
/// revealed character by character, votes and eliminations.
pub struct ProgressReporter {
    spinner: Mutex<Option<ProgressBar>>,
    /// Entry currently being revealed on stdout
    streaming: Mutex<Option<EntryId>>,
    votes_cast: Mutex<usize>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            spinner: Mutex::new(None),
            streaming: Mutex::new(None),
            votes_cast: Mutex::new(0),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn start_spinner(&self, prefix: String, message: String) {
        self.clear_spinner();
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(prefix);
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        *Self::lock(&self.spinner) = Some(pb);
    }

    fn clear_spinner(&self) {
        if let Some(pb) = Self::lock(&self.spinner).take() {
            pb.finish_and_clear();
        }
    }

    /// Print a full line, keeping any active spinner below it
    fn print_line(&self, line: String) {
        self.end_stream();
        match Self::lock(&self.spinner).as_ref() {
            Some(pb) => pb.println(line),
            None => println!("{}", line),
        }
    }

    fn end_stream(&self) {
        if Self::lock(&self.streaming).take().is_some() {
            println!();
        }
    }

    fn phase_title(phase: Phase) -> &'static str {
        match phase {
            Phase::Setup => "Setup",
            Phase::Discussion => "Discussion",
            Phase::Voting => "Voting: least convincing answer",
            Phase::Finished => "Consultation finished",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsultationObserver for ProgressReporter {
    fn on_phase_change(&self, _from: Phase, to: Phase) {
        self.clear_spinner();
        self.end_stream();
        if to == Phase::Voting {
            *Self::lock(&self.votes_cast) = 0;
        }
        let title = Self::phase_title(to);
        let title = if to == Phase::Finished {
            title.green().bold()
        } else {
            title.cyan().bold()
        };
        println!("\n{} {}", "->".cyan(), title);
    }

    fn on_turn_started(&self, participant: &Participant, round: u32) {
        self.start_spinner(
            format!("Round {}", round),
            format!("{} is typing...", participant.name),
        );
    }

    fn on_turn_finished(&self, participant: &Participant, success: bool) {
        self.clear_spinner();
        self.end_stream();
        if !success {
            println!("  {} {} (failed)", "x".red(), participant.name);
        }
    }

    fn on_entry_appended(&self, entry: &TranscriptEntry) {
        match &entry.kind {
            // Covered by the typing spinner
            EntryKind::System { transient: true, .. } => {}
            EntryKind::System { content, .. } => self.print_line(content.dimmed().to_string()),
            EntryKind::Doctor {
                doctor_name,
                content,
                ..
            } => {
                self.clear_spinner();
                self.end_stream();
                println!("\n{}", format!("── {} ──", doctor_name).yellow().bold());
                print!("{}", content);
                let _ = std::io::stdout().flush();
                *Self::lock(&self.streaming) = Some(entry.id);
            }
            EntryKind::Patient { author, content } => self.print_line(format!(
                "{} {}",
                format!("[{}]", author).magenta().bold(),
                content
            )),
            // Rendered from on_vote_cast
            EntryKind::VoteDetail { .. } => {}
            EntryKind::VoteResult { content } => {
                self.clear_spinner();
                self.print_line(content.yellow().bold().to_string());
            }
        }
    }

    fn on_stream_chunk(&self, entry: EntryId, chunk: &str) {
        if *Self::lock(&self.streaming) == Some(entry) {
            print!("{}", chunk);
            let _ = std::io::stdout().flush();
        }
    }

    fn on_vote_cast(&self, vote: &Vote) {
        let count = {
            let mut votes = Self::lock(&self.votes_cast);
            *votes += 1;
            *votes
        };
        self.print_line(format!(
            "  {} {} {} {}",
            "v".green(),
            vote.voter_name.bold(),
            "->".dimmed(),
            vote.target_name.red()
        ));
        self.print_line(format!("    {}", truncate_str(&vote.reason, 160).dimmed()));
        self.start_spinner("Voting".to_string(), format!("{} votes cast", count));
    }

    fn on_summary_changed(&self, summary: &FinalSummary) {
        match summary.status {
            SummaryStatus::Pending => self.start_spinner(
                "Summary".to_string(),
                format!("{} is writing the final summary...", summary.doctor_name),
            ),
            SummaryStatus::Ready => {
                self.clear_spinner();
                self.print_line(format!(
                    "{} Final summary ready ({})",
                    "v".green(),
                    summary.doctor_name
                ));
            }
            SummaryStatus::Error => {
                self.clear_spinner();
                self.print_line(format!("{} {}", "x".red(), summary.content.red()));
            }
            SummaryStatus::Idle => self.clear_spinner(),
        }
    }

    fn on_pause_changed(&self, paused: bool) {
        if paused {
            self.print_line(format!("{}", "|| Paused (r to resume)".yellow().bold()));
        } else {
            self.print_line(format!("{}", "> Resumed".green()));
        }
    }
}

/// Line-based progress on stderr, for when stdout carries the report
pub struct SimpleProgress;

impl ConsultationObserver for SimpleProgress {
    fn on_phase_change(&self, _from: Phase, to: Phase) {
        eprintln!("{} {}", "->".cyan(), ProgressReporter::phase_title(to).bold());
    }

    fn on_turn_finished(&self, participant: &Participant, success: bool) {
        if success {
            eprintln!("  {} {}", "v".green(), participant.name);
        } else {
            eprintln!("  {} {} (failed)", "x".red(), participant.name);
        }
    }

    fn on_vote_cast(&self, vote: &Vote) {
        eprintln!("  {} -> {}", vote.voter_name, vote.target_name);
    }

    fn on_entry_appended(&self, entry: &TranscriptEntry) {
        if let EntryKind::VoteResult { content } = &entry.kind {
            eprintln!("  {}", content.yellow());
        }
    }

    fn on_summary_changed(&self, summary: &FinalSummary) {
        match summary.status {
            SummaryStatus::Ready => eprintln!("  {} summary by {}", "v".green(), summary.doctor_name),
            SummaryStatus::Error => eprintln!("  {} {}", "x".red(), summary.content),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consult_domain::{ParticipantId, Transcript};

    fn doctor_entry() -> TranscriptEntry {
        let mut transcript = Transcript::new();
        transcript.append(EntryKind::Doctor {
            doctor_id: ParticipantId::new("doc-1"),
            doctor_name: "Dr. GPT".to_string(),
            content: String::new(),
        })
    }

    #[test]
    fn test_stream_follows_open_doctor_entry() {
        let reporter = ProgressReporter::new();
        let entry = doctor_entry();

        reporter.on_entry_appended(&entry);
        assert_eq!(*ProgressReporter::lock(&reporter.streaming), Some(entry.id));

        reporter.on_turn_finished(
            &Participant::new("doc-1", "Dr. GPT", consult_domain::ProviderKind::OpenAi, "m"),
            true,
        );
        assert!(ProgressReporter::lock(&reporter.streaming).is_none());
    }

    #[test]
    fn test_vote_counter_resets_per_voting_phase() {
        let reporter = ProgressReporter::new();
        let a = Participant::new("doc-1", "A", consult_domain::ProviderKind::OpenAi, "m");
        let b = Participant::new("doc-2", "B", consult_domain::ProviderKind::OpenAi, "m");

        reporter.on_phase_change(Phase::Discussion, Phase::Voting);
        reporter.on_vote_cast(&Vote::new(1, &a, &b, "vague"));
        reporter.on_vote_cast(&Vote::new(1, &b, &a, "vague"));
        assert_eq!(*ProgressReporter::lock(&reporter.votes_cast), 2);

        reporter.on_phase_change(Phase::Voting, Phase::Voting);
        assert_eq!(*ProgressReporter::lock(&reporter.votes_cast), 0);
        reporter.clear_spinner();
    }
}
