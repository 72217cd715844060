//! Console output formatter for finished consultations

use colored::Colorize;
use consult_domain::util::non_blank;
use consult_domain::{
    CaseRecord, ConsultationSnapshot, EntryKind, FinalSummary, OutputFormat, ParticipantStatus,
    SummaryStatus,
};

/// Formats consultation reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render `snapshot` in the requested format
    pub fn render(snapshot: &ConsultationSnapshot, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(snapshot),
            OutputFormat::Summary => Self::format_summary_only(snapshot),
            OutputFormat::Json => Self::format_json(snapshot),
        }
    }

    /// Format the complete consultation: case, panel, transcript and summary
    pub fn format(snapshot: &ConsultationSnapshot) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Consultation Report"));
        output.push('\n');

        let case = snapshot.case();
        output.push_str(&format!(
            "{} {}\n",
            "Patient:".cyan().bold(),
            Self::patient(case)
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Problem:".cyan().bold(),
            case.current_problem
        ));
        if !case.past_history.trim().is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "History:".cyan().bold(),
                case.past_history
            ));
        }
        output.push_str(&format!(
            "{} {}\n",
            "Rounds:".cyan().bold(),
            snapshot.current_round()
        ));

        output.push_str(&Self::section_header("Panel"));
        for p in snapshot.roster().iter() {
            let line = format!("{} ({} / {})", p.name, p.provider, p.model);
            match p.status {
                ParticipantStatus::Active => {
                    output.push_str(&format!("  {} {}\n", "v".green(), line));
                }
                ParticipantStatus::Eliminated => {
                    output.push_str(&format!("  {} {}\n", "x".red(), line.dimmed()));
                }
            }
        }

        output.push_str(&Self::section_header("Transcript"));
        for entry in snapshot.transcript().iter() {
            match &entry.kind {
                EntryKind::System { transient: true, .. } => {}
                EntryKind::System { content, .. } => {
                    output.push_str(&format!("\n{}\n", content.dimmed()));
                }
                EntryKind::Doctor {
                    doctor_name,
                    content,
                    ..
                } => {
                    output.push_str(&format!(
                        "\n{}\n{}\n",
                        format!("── {} ──", doctor_name).yellow().bold(),
                        content
                    ));
                }
                EntryKind::Patient { author, content } => {
                    output.push_str(&format!(
                        "\n{}\n{}\n",
                        format!("── {} ──", author).magenta().bold(),
                        content
                    ));
                }
                EntryKind::VoteDetail {
                    voter_name,
                    target_name,
                    reason,
                    ..
                } => {
                    output.push_str(&format!(
                        "  {} {} {}\n{}\n",
                        voter_name.bold(),
                        "->".dimmed(),
                        target_name.red(),
                        Self::indent(reason, "     ")
                    ));
                }
                EntryKind::VoteResult { content } => {
                    output.push_str(&format!("\n{}\n", content.yellow().bold()));
                }
            }
        }

        output.push_str(&Self::section_header("Final Summary"));
        output.push_str(&Self::summary_block(snapshot.final_summary()));

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(snapshot: &ConsultationSnapshot) -> String {
        serde_json::to_string_pretty(snapshot).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final summary only (concise output)
    pub fn format_summary_only(snapshot: &ConsultationSnapshot) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n\n",
            "=== Consultation Conclusion ===".cyan().bold()
        ));

        output.push_str(&format!(
            "{} {}\n\n",
            "Patient:".bold(),
            Self::patient(snapshot.case())
        ));

        let remaining: Vec<&str> = snapshot
            .roster()
            .active()
            .map(|p| p.name.as_str())
            .collect();
        if !remaining.is_empty() {
            output.push_str(&format!(
                "{} {}\n\n",
                "Remaining doctors:".dimmed(),
                remaining.join(", ")
            ));
        }

        output.push_str(&Self::summary_block(snapshot.final_summary()));

        output
    }

    fn summary_block(summary: &FinalSummary) -> String {
        match summary.status {
            SummaryStatus::Ready => format!(
                "{}\n\n{}\n",
                format!("Written by {}", summary.doctor_name).yellow().bold(),
                summary.content
            ),
            SummaryStatus::Error => format!("{}\n", summary.content.red()),
            SummaryStatus::Pending => format!(
                "{}\n",
                format!("{} is still writing the summary", summary.doctor_name).dimmed()
            ),
            SummaryStatus::Idle => format!("{}\n", "No final summary was produced.".dimmed()),
        }
    }

    fn patient(case: &CaseRecord) -> String {
        let mut label = non_blank(&case.name).unwrap_or("(unnamed)").to_string();
        let details: Vec<String> = non_blank(&case.gender)
            .map(str::to_string)
            .into_iter()
            .chain(case.age.map(|age| format!("{age} y")))
            .collect();
        if !details.is_empty() {
            label.push_str(&format!(", {}", details.join(", ")));
        }
        label
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consult_domain::{Consultation, ConsultationSetup, Participant, Phase, ProviderKind};

    fn started() -> Consultation {
        let roster = vec![
            Participant::new("doc-1", "Dr. GPT", ProviderKind::OpenAi, "gpt-4o-mini"),
            Participant::new("doc-2", "Dr. Claude", ProviderKind::Anthropic, "claude-3-haiku"),
        ];
        let mut consultation = Consultation::new();
        consultation
            .start(ConsultationSetup::new(
                CaseRecord::new("Li Lei", "Fever for three days"),
                roster,
            ))
            .unwrap();
        consultation
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }

    #[test]
    fn test_full_report_lists_panel_and_case() {
        colored::control::set_override(false);
        let report = ConsoleFormatter::format(&started());
        assert!(report.contains("Consultation Report"));
        assert!(report.contains("Patient: Li Lei"));
        assert!(report.contains("Problem: Fever for three days"));
        assert!(report.contains("Dr. GPT (openai / gpt-4o-mini)"));
        assert!(report.contains("No final summary was produced."));
    }

    #[test]
    fn test_summary_only_is_short() {
        colored::control::set_override(false);
        let consultation = started();
        let summary = ConsoleFormatter::format_summary_only(&consultation);
        assert!(summary.contains("Remaining doctors: Dr. GPT, Dr. Claude"));
        assert!(!summary.contains("Transcript"));
    }

    #[test]
    fn test_json_is_the_snapshot() {
        let consultation = started();
        let json = ConsoleFormatter::render(&consultation, OutputFormat::Json);
        let restored: Consultation = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.phase(), Phase::Discussion);
    }

    #[test]
    fn test_ready_summary_names_author() {
        colored::control::set_override(false);
        let doctor = Participant::new("doc-1", "Dr. GPT", ProviderKind::OpenAi, "m");
        let mut summary = FinalSummary::pending(&doctor, "Summarize");
        summary.resolve_ready("Likely viral pneumonia.");
        let block = ConsoleFormatter::summary_block(&summary);
        assert!(block.starts_with("Written by Dr. GPT"));
        assert!(block.contains("Likely viral pneumonia."));
    }
}
