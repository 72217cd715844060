//! CLI entrypoint for Consult Quorum
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result};
use clap::Parser;
use consult_application::{
    CompositeObserver, ConsultationObserver, ConsultationOutcome, ConversationLogger, NoObserver,
    Pacing, ParticipantGateway, RunConsultationUseCase,
};
use consult_domain::{CaseRecord, ConsultationSetup, LinkedConsultation, OutputFormat};
use consult_infrastructure::{
    ConfigLoader, FileConfig, HttpParticipantGateway, JsonSnapshotWriter,
    JsonlConversationLogger, SimulatedGateway, load_case_file,
};
use consult_presentation::{
    Cli, ConsoleFormatter, ControlExit, ProgressReporter, SimpleProgress, run_control_loop,
    set_color_enabled, stdin_lines,
};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Reply latency of the offline gateway, so the typing indicator is visible
const SIMULATED_LATENCY: Duration = Duration::from_millis(600);

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_tracing(&cli)?;

    info!("Starting Consult Quorum");

    if cli.show_config {
        for line in ConfigLoader::describe_sources(cli.config.as_deref()) {
            println!("{}", line);
        }
        return Ok(());
    }

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };
    for issue in config.validate() {
        warn!(code = ?issue.code, "Configuration issue: {}", issue.message);
        if !cli.quiet {
            let label = if issue.is_error() { "error" } else { "warning" };
            eprintln!("config {}: {}", label, issue.message);
        }
    }
    if !config.output.color {
        set_color_enabled(false);
    }

    let format: OutputFormat = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();
    let setup = build_setup(&cli, &config)?;
    let pacing = if cli.fast {
        Pacing::instant()
    } else {
        config.consultation.pacing()
    };

    // === Observers ===
    let mut composite = CompositeObserver::default();
    if !cli.quiet {
        let progress: Arc<dyn ConsultationObserver> = if format == OutputFormat::Json {
            Arc::new(SimpleProgress)
        } else {
            Arc::new(ProgressReporter::new())
        };
        composite.push(progress);
    }
    if let Some(path) = &cli.snapshot {
        composite.push(Arc::new(JsonSnapshotWriter::new(path)));
    }
    let observer: Arc<dyn ConsultationObserver> = if composite.is_empty() {
        Arc::new(NoObserver)
    } else {
        Arc::new(composite)
    };

    let logger: Option<Arc<dyn ConversationLogger>> =
        cli.conversation_log.as_deref().and_then(|path| {
            let logger = JsonlConversationLogger::new(path)?;
            info!("Conversation log: {}", logger.path().display());
            Some(Arc::new(logger) as Arc<dyn ConversationLogger>)
        });

    if !cli.quiet && format != OutputFormat::Json {
        print_header(&setup);
    }

    // === Dependency Injection ===
    let outcome = if cli.simulate {
        let latency = if cli.fast {
            Duration::ZERO
        } else {
            SIMULATED_LATENCY
        };
        let gateway = Arc::new(SimulatedGateway::new().with_latency(latency));
        run(gateway, setup, pacing, observer, logger, cli.interactive).await?
    } else {
        let gateway = Arc::new(HttpParticipantGateway::new());
        run(gateway, setup, pacing, observer, logger, cli.interactive).await?
    };

    // Output results
    match outcome {
        ConsultationOutcome::Finished(snapshot) => {
            println!("\n{}", ConsoleFormatter::render(&snapshot, format));
        }
        ConsultationOutcome::Abandoned => {
            eprintln!("Consultation was reset before it finished.");
        }
    }

    Ok(())
}

/// Initialize logging based on verbosity level; `RUST_LOG` takes precedence
fn init_tracing(cli: &Cli) -> Result<Option<WorkerGuard>> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let Some(path) = &cli.log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .with_context(|| format!("--log-file {} does not name a file", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

/// Case from the case file with command-line overrides, roster and
/// settings from the configuration
fn build_setup(cli: &Cli, config: &FileConfig) -> Result<ConsultationSetup> {
    let (mut case, linked): (CaseRecord, Vec<LinkedConsultation>) = match &cli.case {
        Some(path) => load_case_file(path)?.into_parts(),
        None => (CaseRecord::default(), Vec::new()),
    };
    if let Some(name) = &cli.name {
        case.name = name.clone();
    }
    if let Some(problem) = &cli.problem {
        case.current_problem = problem.clone();
    }
    if let Some(history) = &cli.history {
        case.past_history = history.clone();
    }

    let mut settings = config.settings();
    if let Some(order) = cli.turn_order {
        settings = settings.with_turn_order(order.into());
    }
    if let Some(rounds) = cli.max_stale_rounds {
        settings = settings.with_max_rounds_without_elimination(rounds);
    }

    Ok(ConsultationSetup::new(case, config.roster())
        .with_settings(settings)
        .with_linked_consultations(linked))
}

fn print_header(setup: &ConsultationSetup) {
    println!();
    println!("+============================================================+");
    println!("|           Consult Quorum - Multi-Doctor Consultation       |");
    println!("+============================================================+");
    println!();
    println!("Patient: {}", setup.case.name);
    println!("Problem: {}", setup.case.current_problem);
    println!(
        "Doctors: {}",
        setup
            .roster
            .iter()
            .map(|p| format!("{} ({})", p.name, p.model))
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();
}

/// Run one consultation, optionally reading controls from stdin
async fn run<G: ParticipantGateway + 'static>(
    gateway: Arc<G>,
    setup: ConsultationSetup,
    pacing: Pacing,
    observer: Arc<dyn ConsultationObserver>,
    logger: Option<Arc<dyn ConversationLogger>>,
    interactive: bool,
) -> Result<ConsultationOutcome> {
    let mut use_case = RunConsultationUseCase::new(gateway)
        .with_pacing(pacing)
        .with_observer(observer);
    if let Some(logger) = logger {
        use_case = use_case.with_conversation_logger(logger);
    }

    if !interactive {
        return Ok(use_case.start(setup).await?);
    }

    let controls = use_case.controls();
    eprintln!("Controls: p pause | r resume | t toggle | q quit | other text adds a patient note");
    let run = use_case.start(setup);
    tokio::pin!(run);

    let outcome = tokio::select! {
        outcome = &mut run => outcome?,
        exit = run_control_loop(&controls, stdin_lines()) => {
            if exit == ControlExit::Quit {
                info!("Quit requested");
            }
            run.await?
        }
    };
    Ok(outcome)
}
