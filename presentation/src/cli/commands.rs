//! CLI command definitions

use clap::{Parser, ValueEnum};
use consult_domain::TurnOrder;
use std::path::PathBuf;

/// Output format for the final report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Transcript, votes and summary
    Full,
    /// Only the final summary
    Summary,
    /// JSON snapshot of the finished consultation
    Json,
}

impl From<OutputFormat> for consult_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => consult_domain::OutputFormat::Full,
            OutputFormat::Summary => consult_domain::OutputFormat::Summary,
            OutputFormat::Json => consult_domain::OutputFormat::Json,
        }
    }
}

/// Speaking order of each round
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TurnOrderArg {
    /// Shuffled every round
    Random,
    /// Configured roster order
    Custom,
}

impl From<TurnOrderArg> for TurnOrder {
    fn from(order: TurnOrderArg) -> Self {
        match order {
            TurnOrderArg::Random => TurnOrder::Random,
            TurnOrderArg::Custom => TurnOrder::Custom,
        }
    }
}

/// CLI arguments for consult-quorum
#[derive(Parser, Debug)]
#[command(name = "consult-quorum")]
#[command(author, version, about = "Multi-doctor consultation - several models discuss a patient case")]
#[command(long_about = r#"
Consult Quorum runs a panel of doctors, each backed by a different model
provider, through a structured discussion of a patient case.

Every round has two steps:
1. Discussion: each active doctor speaks once, in turn
2. Voting: each active doctor marks the least convincing answer;
   a unique leader is eliminated

The consultation ends when at most one doctor remains or when too many
rounds pass without an elimination. A final summary is then written.

Configuration files are loaded from (in priority order):
1. CONSULT_* environment variables
2. --config <path>     Explicit config file
3. ./consult.toml      Project-level config
4. ~/.config/consult-quorum/config.toml   Global config

Interactive controls (--interactive), one command per line:
  p  pause      r  resume      t  toggle pause      q  reset and quit
  anything else is added to the case as a patient supplement

Example:
  consult-quorum --simulate --name "Li Lei" --problem "Fever and cough for three days"
  consult-quorum --case case.toml --output full --snapshot state.json
"#)]
pub struct Cli {
    /// Case file (TOML or JSON)
    #[arg(long, value_name = "PATH")]
    pub case: Option<PathBuf>,

    /// Patient name (overrides the case file)
    #[arg(long)]
    pub name: Option<String>,

    /// Current problem (overrides the case file)
    #[arg(long)]
    pub problem: Option<String>,

    /// Past medical history (overrides the case file)
    #[arg(long)]
    pub history: Option<String>,

    /// Speaking order of each round
    #[arg(long, value_enum)]
    pub turn_order: Option<TurnOrderArg>,

    /// End the consultation after this many rounds without an elimination
    #[arg(long, value_name = "N")]
    pub max_stale_rounds: Option<u32>,

    /// Use canned offline replies instead of calling providers
    #[arg(long)]
    pub simulate: bool,

    /// Disable streaming and voting delays
    #[arg(long)]
    pub fast: bool,

    /// Output format (defaults to the configured format, else summary)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Append conversation events to a JSONL file
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,

    /// Keep the latest consultation snapshot in a JSON file
    #[arg(long, value_name = "PATH")]
    pub snapshot: Option<PathBuf>,

    /// Write diagnostic logs to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress live progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Read pause/resume/supplement commands from stdin while running
    #[arg(short, long)]
    pub interactive: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_invocation() {
        let cli = Cli::try_parse_from(["consult-quorum", "--name", "Li Lei", "--problem", "Cough"])
            .unwrap();
        assert_eq!(cli.name.as_deref(), Some("Li Lei"));
        assert_eq!(cli.problem.as_deref(), Some("Cough"));
        assert!(cli.output.is_none());
        assert!(!cli.simulate);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_full_invocation() {
        let cli = Cli::try_parse_from([
            "consult-quorum",
            "--case",
            "case.toml",
            "--turn-order",
            "custom",
            "--max-stale-rounds",
            "5",
            "--simulate",
            "--fast",
            "-o",
            "json",
            "--snapshot",
            "state.json",
            "-vv",
            "-i",
        ])
        .unwrap();
        assert_eq!(cli.case, Some(PathBuf::from("case.toml")));
        assert_eq!(cli.turn_order, Some(TurnOrderArg::Custom));
        assert_eq!(cli.max_stale_rounds, Some(5));
        assert!(cli.simulate && cli.fast && cli.interactive);
        assert_eq!(cli.output, Some(OutputFormat::Json));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_rejects_unknown_turn_order() {
        assert!(Cli::try_parse_from(["consult-quorum", "--turn-order", "alphabetical"]).is_err());
    }

    #[test]
    fn test_format_conversion() {
        assert_eq!(
            consult_domain::OutputFormat::from(OutputFormat::Summary),
            consult_domain::OutputFormat::Summary
        );
        assert_eq!(TurnOrder::from(TurnOrderArg::Random), TurnOrder::Random);
    }
}
