//! # tsxcraft CLI
//!
//! Command-line interface for the HTML to TSX styling agents.
//!
//! Usage:
//!   tsxcraft run <request.json> [--project DIR] [--write-back]
//!   tsxcraft analyze <request.json>
//!   tsxcraft style --session <id>
//!   tsxcraft read <session> <path>
//!
//! Examples:
//!   tsxcraft run request.json --project ../shop --write-back
//!   tsxcraft -s price analyze request.json --project ../shop
//!   tsxcraft -s price scratch-pad
//!   tsxcraft -s price style --project ../shop --write-back

use clap::{Parser, Subcommand};
use std::path::{Component, Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use tsxcraft_agent::{AgentConfig, AgentOutcome, AgentRole, Crew};
use tsxcraft_core::error::{self, Result};
use tsxcraft_core::{
    ChatModel, ModelRegistry, Session, SessionManager, StylingRequest, VirtualFs,
    DEFAULT_READ_LIMIT,
};

#[derive(Parser)]
#[command(name = "tsxcraft")]
#[command(author, version, about = "tsxcraft - turn HTML design snippets into TSX component edits")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Session ID for persistent state across runs
    #[arg(short, long, global = true)]
    session: Option<String>,

    /// Directory holding saved sessions
    #[arg(long, global = true, env = "TSXCRAFT_SESSION_DIR", default_value = ".tsxcraft_sessions")]
    session_dir: PathBuf,

    /// Model for the orchestrator (registry name or provider:model)
    #[arg(long, global = true, env = "TSXCRAFT_ORCHESTRATOR_MODEL")]
    orchestrator_model: Option<String>,

    /// Model for the HTML analyser
    #[arg(long, global = true, env = "TSXCRAFT_ANALYZER_MODEL")]
    analyzer_model: Option<String>,

    /// Model for the TSX styling agent
    #[arg(long, global = true, env = "TSXCRAFT_STYLING_MODEL")]
    styling_model: Option<String>,

    /// Model turns allowed per agent
    #[arg(long, global = true, env = "TSXCRAFT_MAX_STEPS", default_value_t = 40)]
    max_steps: usize,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - only warnings and the final answer
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the orchestrator on a styling request
    Run {
        /// Path to the request JSON
        request: PathBuf,

        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Run only the HTML analyser and show the scratch pad it produced
    Analyze {
        /// Path to the request JSON
        request: PathBuf,

        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Run only the TSX styling agent against a saved session's scratch pad
    Style {
        /// Instructions for the styling agent
        #[arg(short, long, default_value = "Apply every diff recorded on the scratch pad.")]
        message: String,

        #[command(flatten)]
        project: ProjectArgs,
    },
    /// List the model registry
    Models,
    /// List saved sessions
    Sessions,
    /// Read a file from a saved session's file store
    Read {
        session: String,
        path: String,

        /// 0-based line to start from
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Maximum lines to print
        #[arg(long, default_value_t = DEFAULT_READ_LIMIT)]
        limit: usize,
    },
    /// Print a saved session's scratch pad
    ScratchPad { session: String },
}

#[derive(clap::Args)]
struct ProjectArgs {
    /// Project root used to load component files
    #[arg(short, long, default_value = ".")]
    project: PathBuf,

    /// Write changed files back into the project
    #[arg(short, long)]
    write_back: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Run { request, project } => run(&cli, request, project).await,
        Commands::Analyze { request, project } => analyze(&cli, request, project).await,
        Commands::Style { message, project } => style(&cli, message, project).await,
        Commands::Models => {
            list_models();
            Ok(())
        }
        Commands::Sessions => list_sessions(&cli),
        Commands::Read {
            session,
            path,
            offset,
            limit,
        } => read_file(&cli, session, path, *offset, *limit),
        Commands::ScratchPad { session } => show_scratch_pad(&cli, session),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            eprintln!("Error: {}", e.message());
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

// =============================================================================
// Agent commands
// =============================================================================

async fn run(cli: &Cli, request_path: &Path, project: &ProjectArgs) -> Result<()> {
    let request = StylingRequest::from_path(request_path)?;
    let manager = SessionManager::new(&cli.session_dir)?;
    let mut session = open_session(cli, &manager, &request.summary())?;
    let seeded = seed_files(&mut session, &request, &project.project);

    let crew = build_crew(cli)?;
    let outcome = crew.run(&mut session, &request.to_prompt()?).await;
    finish(cli, &manager, &session, &seeded, project, outcome)
}

async fn analyze(cli: &Cli, request_path: &Path, project: &ProjectArgs) -> Result<()> {
    let request = StylingRequest::from_path(request_path)?;
    let manager = SessionManager::new(&cli.session_dir)?;
    let mut session = open_session(cli, &manager, &request.summary())?;
    let seeded = seed_files(&mut session, &request, &project.project);

    let crew = build_crew(cli)?;
    let outcome = crew.run_analyzer(&mut session, &request.to_prompt()?).await;
    finish(cli, &manager, &session, &seeded, project, outcome)?;

    println!("\n{}", session.scratch_pad.read());
    Ok(())
}

async fn style(cli: &Cli, message: &str, project: &ProjectArgs) -> Result<()> {
    let session_id = cli.session.as_deref().ok_or_else(|| {
        error::invalid_argument("style needs --session <id> naming a session with a scratch pad")
    })?;
    let manager = SessionManager::new(&cli.session_dir)?;
    let mut session = manager.load_session(session_id)?;
    if session.scratch_pad.is_empty() {
        return Err(error::invalid_argument(format!(
            "session '{}' has an empty scratch pad; run analyze first",
            session_id
        )));
    }
    let seeded = session.files.clone();

    let crew = build_crew(cli)?;
    let outcome = crew.run_styling(&mut session, message).await;
    finish(cli, &manager, &session, &seeded, project, outcome)
}

fn build_crew(cli: &Cli) -> Result<Crew<ChatModel>> {
    let registry = ModelRegistry::new();
    let connect = |role: AgentRole, choice: &Option<String>| {
        let name = choice.as_deref().unwrap_or(role.default_model());
        tracing::info!(role = role.name(), model = name, "using model");
        registry.connect(name)
    };

    let config = AgentConfig {
        max_steps: cli.max_steps,
        ..AgentConfig::default()
    };
    Ok(Crew::with_config(
        connect(AgentRole::Orchestrator, &cli.orchestrator_model)?,
        connect(AgentRole::HtmlAnalyser, &cli.analyzer_model)?,
        connect(AgentRole::TsxStyling, &cli.styling_model)?,
        config,
    ))
}

fn open_session(cli: &Cli, manager: &SessionManager, task: &str) -> Result<Session> {
    match &cli.session {
        Some(id) => {
            let session = manager.load_or_create(id, task)?;
            tracing::info!(session = id.as_str(), files = session.files.len(), "session opened");
            Ok(session)
        }
        None => Ok(Session::new(Session::generate_id(), task)),
    }
}

/// Load the request's files from disk; returns the store as seeded
fn seed_files(session: &mut Session, request: &StylingRequest, project: &Path) -> VirtualFs {
    for path in request.files_to_seed() {
        if session.files.contains(path) {
            continue;
        }
        let Some(full) = project_path(project, path) else {
            tracing::warn!(path, "skipping path outside the project");
            continue;
        };
        match std::fs::read_to_string(&full) {
            Ok(content) => {
                tracing::debug!(path, "loaded file");
                session.files.write(path, content);
            }
            Err(e) => tracing::warn!(path, error = %e, "skipping unreadable file"),
        }
    }
    session.files.clone()
}

fn finish(
    cli: &Cli,
    manager: &SessionManager,
    session: &Session,
    seeded: &VirtualFs,
    project: &ProjectArgs,
    outcome: Result<AgentOutcome>,
) -> Result<()> {
    if cli.session.is_some() {
        manager.save_session(session)?;
        tracing::info!(session = session.id(), "session saved");
    }

    let outcome = outcome?;
    tracing::info!(
        steps = outcome.steps,
        llm_calls = outcome.usage.total_calls,
        tokens = outcome.usage.total_tokens(),
        "run finished"
    );
    println!("{}", outcome.reply);

    let changed = changed_files(seeded, &session.files);
    if changed.is_empty() {
        return Ok(());
    }
    if !project.write_back {
        if !cli.quiet {
            println!("\nChanged files (use --write-back to save): {}", changed.join(", "));
        }
        return Ok(());
    }
    write_back(&project.project, &session.files, &changed)
}

/// Paths whose content differs from what was seeded
fn changed_files<'a>(seeded: &VirtualFs, current: &'a VirtualFs) -> Vec<&'a str> {
    current
        .iter()
        .filter(|(path, content)| seeded.get(path) != Some(*content))
        .map(|(path, _)| path)
        .collect()
}

/// Every path is checked before anything touches the disk
fn write_back(project: &Path, files: &VirtualFs, changed: &[&str]) -> Result<()> {
    let targets = changed
        .iter()
        .map(|path| {
            project_path(project, path)
                .map(|full| (full, files.get(path).unwrap_or_default()))
                .ok_or_else(|| {
                    error::invalid_argument(format!("refusing to write outside the project: {}", path))
                })
        })
        .collect::<Result<Vec<_>>>()?;

    for (full, content) in targets {
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| error::io_error(format!("Failed to create {}: {}", parent.display(), e)))?;
        }
        std::fs::write(&full, content)
            .map_err(|e| error::io_error(format!("Failed to write {}: {}", full.display(), e)))?;
        println!("wrote {}", full.display());
    }
    Ok(())
}

/// Join a store path onto the project root, rejecting absolute and parent paths
fn project_path(project: &Path, path: &str) -> Option<PathBuf> {
    let relative = Path::new(path);
    let safe = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    safe.then(|| project.join(relative))
}

// =============================================================================
// Inspection commands
// =============================================================================

fn list_models() {
    let registry = ModelRegistry::new();
    println!("Models:");
    for (name, value) in registry.list() {
        println!("  {:<14} {}", name, value);
    }
    println!("\nRole defaults:");
    for role in [AgentRole::Orchestrator, AgentRole::HtmlAnalyser, AgentRole::TsxStyling] {
        println!("  {:<18} {}", role.name(), role.default_model());
    }
}

fn list_sessions(cli: &Cli) -> Result<()> {
    if !cli.session_dir.exists() {
        println!("No sessions directory found.");
        return Ok(());
    }

    let manager = SessionManager::new(&cli.session_dir)?;
    let sessions = manager.list_sessions()?;
    println!("Sessions in {}:", cli.session_dir.display());
    if sessions.is_empty() {
        println!("  (no sessions found)");
    }
    for id in sessions {
        match manager.get_session_info(&id) {
            Ok(info) => println!(
                "  - {} [{:?}] {} ({} llm calls)",
                id, info.status, info.task, info.llm_calls
            ),
            Err(e) => println!("  - {} (unreadable: {})", id, e.message()),
        }
    }
    Ok(())
}

fn read_file(cli: &Cli, session_id: &str, path: &str, offset: usize, limit: usize) -> Result<()> {
    let manager = SessionManager::new(&cli.session_dir)?;
    let session = manager.load_session(session_id)?;
    let view = session.files.read(path, offset, limit)?;
    println!("{}", view);
    Ok(())
}

fn show_scratch_pad(cli: &Cli, session_id: &str) -> Result<()> {
    let manager = SessionManager::new(&cli.session_dir)?;
    let session = manager.load_session(session_id)?;
    println!("{}", session.scratch_pad.read());
    if !session.scratch_pad.is_empty() {
        println!("\n{}", session.scratch_pad.verification_report(&session.files));
    }
    Ok(())
}
