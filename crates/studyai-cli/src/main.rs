//! StudyAI CLI
//!
//! `studyai serve` runs the artifact API. `studyai study` generates one
//! artifact and works through it at an interactive prompt.

mod command;
mod render;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use studyai_core::{
    ArtifactKind, ArtifactSource, ContentGenerator, Difficulty, EssayLength, EssayType,
    ExplanationLevel, GenerationRequest, GuideFormat, InSessionSource, PersistingSource, Phase,
    PlaceholderGenerator, QuestionTypeChoice, RequestOptions, SessionController,
};
use studyai_server::{build_state, open_store, serve, Config};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::command::{StudyCommand, HELP};

/// StudyAI - study material generator
///
/// Generates quizzes, flashcards, study guides, practice tests, essays, and
/// concept explanations, and serves stored artifacts over HTTP.
#[derive(Parser, Debug)]
#[command(name = "studyai")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file (default: studyai.json in current directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API server
    Serve(ServeArgs),
    /// Generate an artifact and study it at an interactive prompt
    Study(StudyArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Port for the HTTP API server
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite connection string
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,
}

#[derive(Args, Debug)]
struct StudyArgs {
    /// Tool: quiz, flashcards, studyguide, test, essay, or concept
    #[arg(value_name = "TOOL")]
    tool: ArtifactKind,

    /// Topic, essay subject, concept, or source text
    #[arg(value_name = "SUBJECT")]
    subject: Vec<String>,

    /// Open a stored artifact instead of generating one
    #[arg(long, value_name = "ID", conflicts_with = "subject")]
    open: Option<Uuid>,

    /// Quiz difficulty (easy, medium, hard)
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Quiz question type (mixed, multiple-choice, true-false, open-ended)
    #[arg(long)]
    question_type: Option<QuestionTypeChoice>,

    /// Number of questions for quizzes and practice tests
    #[arg(short = 'n', long = "questions")]
    num_questions: Option<u32>,

    /// Study guide format (outline, summary, both)
    #[arg(long)]
    format: Option<GuideFormat>,

    /// Practice test time limit in minutes
    #[arg(long)]
    minutes: Option<u32>,

    /// Essay type
    #[arg(long)]
    essay_type: Option<EssayType>,

    /// Essay length (short, medium, long, extended)
    #[arg(long)]
    length: Option<EssayLength>,

    /// Explanation level (beginner, intermediate, advanced)
    #[arg(long)]
    level: Option<ExplanationLevel>,

    /// SQLite connection string for stored kinds
    #[arg(long, value_name = "URL")]
    database_url: Option<String>,
}

impl StudyArgs {
    /// Options for `tool`, with defaults for anything not given.
    fn request_options(&self) -> RequestOptions {
        let mut options = RequestOptions::defaults_for(self.tool);
        match &mut options {
            RequestOptions::Quiz {
                difficulty,
                question_type,
                num_questions,
            } => {
                *difficulty = self.difficulty.unwrap_or(*difficulty);
                *question_type = self.question_type.unwrap_or(*question_type);
                *num_questions = self.num_questions.unwrap_or(*num_questions);
            }
            RequestOptions::StudyGuide { format } => {
                *format = self.format.unwrap_or(*format);
            }
            RequestOptions::PracticeTest {
                time_limit_minutes,
                num_questions,
            } => {
                *time_limit_minutes = self.minutes.unwrap_or(*time_limit_minutes);
                *num_questions = self.num_questions.unwrap_or(*num_questions);
            }
            RequestOptions::Essay { essay_type, length } => {
                *essay_type = self.essay_type.unwrap_or(*essay_type);
                *length = self.length.unwrap_or(*length);
            }
            RequestOptions::ConceptExplanation { level } => {
                *level = self.level.unwrap_or(*level);
            }
            RequestOptions::FlashcardSet => {}
        }
        options
    }

    fn request(&self, subject: String) -> GenerationRequest {
        GenerationRequest::new(subject, self.request_options())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env"),
    }

    let result = match cli.command {
        Command::Serve(args) => run_serve(cli.config.as_deref(), args).await,
        Command::Study(args) => run_study(cli.config.as_deref(), args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Loads the config file, then applies environment and flag overrides.
fn load_config(config_path: Option<&str>, database_url: Option<&str>) -> anyhow::Result<Config> {
    let mut config = match config_path {
        Some(path_str) => {
            let path = Path::new(path_str);
            if !path.exists() {
                anyhow::bail!(
                    "Config file not found: '{}'\n\nSuggestion: Check the path or remove the --config flag to use defaults",
                    path.display()
                );
            }
            Config::load_from_file(path)?
        }
        None => Config::load()?,
    };

    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    if let Some(url) = database_url {
        config.database_url = url.to_string();
    }
    config.validate()?;
    Ok(config)
}

// ============================================================================
// serve
// ============================================================================

async fn run_serve(config_path: Option<&str>, args: ServeArgs) -> anyhow::Result<()> {
    let mut config = load_config(config_path, args.database_url.as_deref())?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    config.validate()?;

    let addr = config.socket_addr()?;
    println!("Configuration loaded:");
    println!("  Database: {}", config.database_url);
    println!("  Flashcards per set: {}", config.flashcard_count);

    let state = build_state(&config).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to open artifact store: {e}\n\nSuggestion: Check DATABASE_URL or --database-url"
        )
    })?;

    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {addr}: {e}\n\nSuggestion: Try a different port with --port"
        )
    })?;

    println!("StudyAI API running on http://{addr}");
    println!("Press Ctrl+C to stop");

    serve(listener, state, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received Ctrl+C, shutting down"),
        Err(e) => tracing::warn!(error = %e, "Cannot listen for Ctrl+C"),
    }
}

// ============================================================================
// study
// ============================================================================

async fn run_study(config_path: Option<&str>, args: StudyArgs) -> anyhow::Result<()> {
    let config = load_config(config_path, args.database_url.as_deref())?;
    let generator: Arc<dyn ContentGenerator> =
        Arc::new(PlaceholderGenerator::new().with_flashcard_count(config.flashcard_count));

    let source: Arc<dyn ArtifactSource> = if args.tool.is_persisted() {
        let store = open_store(&config).await?;
        Arc::new(PersistingSource::new(Arc::new(store), generator))
    } else {
        if args.open.is_some() {
            anyhow::bail!(
                "{} artifacts are not stored and cannot be opened by id",
                args.tool
            );
        }
        Arc::new(InSessionSource::new(generator))
    };

    let controller = SessionController::new(args.tool, source);
    let mut events = controller.subscribe();

    println!("Generating {}...", args.tool.label().to_lowercase());
    let loaded = match args.open {
        Some(id) => controller.open(id).await,
        None => controller.submit(args.request(args.subject.join(" "))).await,
    };
    match loaded {
        Ok(Some(artifact)) => {
            print!("{}", render::overview(&artifact));
            print_current(&controller).await;
        }
        Ok(None) => anyhow::bail!("Generation was cancelled"),
        Err(e) => return Err(anyhow::anyhow!("{}", render::notice(&e))),
    }

    println!("Type 'help' for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Ok(()) = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl+C, leaving study session");
                controller.reset().await;
                break;
            }
            event = events.recv() => match event {
                Ok(event) => {
                    if let Some(line) = render::event_line(&event) {
                        println!("{line}");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "Event subscriber lagged");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.parse::<StudyCommand>() {
                    Ok(StudyCommand::Quit) => {
                        controller.reset().await;
                        break;
                    }
                    Ok(cmd) => execute(&controller, &args, cmd).await,
                    Err(message) if message.is_empty() => {}
                    Err(message) => println!("{message}"),
                }
            }
        }
    }

    Ok(())
}

/// Runs one prompt command, printing the outcome or the notice.
async fn execute(controller: &SessionController, args: &StudyArgs, cmd: StudyCommand) {
    let outcome = match cmd {
        StudyCommand::Start => controller.start().await.map(|()| true),
        StudyCommand::Next => controller.next().await.map(|_| true),
        StudyCommand::Prev => controller.prev().await.map(|_| true),
        StudyCommand::Goto(index) => controller.jump(index).await.map(|_| true),
        StudyCommand::Flip => controller.flip().await.map(|_| true),
        StudyCommand::Answer(value) => controller.answer_current(value).await.map(|_| true),
        StudyCommand::Submit => match controller.finish().await {
            Ok(Some(report)) => {
                let time_taken = controller.snapshot().await.time_taken_secs;
                print!("{}", render::score_summary(&report, time_taken));
                Ok(false)
            }
            Ok(None) => {
                println!("Done.");
                Ok(false)
            }
            Err(e) => Err(e),
        },
        StudyCommand::Review => {
            match render::results(&controller.snapshot().await) {
                Some(text) => print!("{text}"),
                None => println!("Nothing to review yet. Type 'submit' when you are done."),
            }
            Ok(false)
        }
        StudyCommand::Show => {
            if let Some(artifact) = controller.snapshot().await.artifact {
                print!("{}", render::overview(&artifact));
            }
            Ok(true)
        }
        StudyCommand::Reset => {
            controller.reset().await;
            println!("Session cleared. Type 'new SUBJECT' to generate another.");
            Ok(false)
        }
        StudyCommand::New(subject) => {
            println!("Generating {}...", args.tool.label().to_lowercase());
            match controller.submit(args.request(subject)).await {
                Ok(Some(artifact)) => {
                    print!("{}", render::overview(&artifact));
                    Ok(true)
                }
                Ok(None) => Ok(false),
                Err(e) => Err(e),
            }
        }
        StudyCommand::Help => {
            println!("{HELP}");
            Ok(false)
        }
        StudyCommand::Quit => Ok(false),
    };

    match outcome {
        Ok(true) => print_current(controller).await,
        Ok(false) => {}
        Err(e) => {
            println!("{}", render::notice(&e));
            if controller.phase().await == Phase::Idle {
                controller.dismiss_notice().await;
            }
        }
    }
}

async fn print_current(controller: &SessionController) {
    if let Some(item) = render::current_item(&controller.snapshot().await) {
        print!("{item}");
    }
}
