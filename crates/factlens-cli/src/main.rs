//! FactLens CLI
//!
//! Main entry point for analyzing claims, playing Fact or Fake, and running
//! the session server.

use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use factlens_core::{
    create_router, AnalysisBackend, AnalyzeSession, AppState, Config, DragOutcome, GameSession,
    GameSummary, HttpAnalysisClient, ImageUpload, Notifier, OutputFormat, QuestionBank,
    ResultView, SwipeDirection, API_URL_ENV, DRAG_THRESHOLD,
};
use factlens_report::{json::JsonGenerator, AnalysisReport, MarkdownGenerator, Report};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

/// FactLens - Misinformation Detection
///
/// Checks claims, links, and images against the FactLens analysis service,
/// and trains your instincts with the Fact or Fake swipe game.
#[derive(Parser, Debug)]
#[command(name = "factlens")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (default: factlens.json in current directory)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Base URL of the analysis service (overrides config and FACTLENS_API_URL)
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a claim, a link, or an image
    Analyze {
        /// Claim text or URL to analyze
        #[arg(value_name = "TEXT")]
        text: Option<String>,

        /// Image file to analyze instead of the text
        #[arg(short, long, value_name = "PATH")]
        image: Option<PathBuf>,

        /// Output format: text, markdown, or json (default from config)
        #[arg(short, long, value_name = "FORMAT")]
        format: Option<OutputFormat>,

        /// Write the rendered result to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Play Fact or Fake in the terminal
    Play {
        /// Stop after this many answers
        #[arg(short, long, value_name = "N")]
        rounds: Option<u32>,

        /// Format of the end-of-game report: text, markdown, or json (default from config)
        #[arg(short, long, value_name = "FORMAT")]
        format: Option<OutputFormat>,

        /// Write the end-of-game report to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Run the session server
    Serve {
        /// Port for the HTTP API server (default from config)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    tracing::debug!(config = ?args.config, api_url = ?args.api_url, "Starting FactLens");

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(1)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(
        args.config.as_deref(),
        std::env::var(API_URL_ENV).ok(),
        args.api_url,
    )?;

    match args.command {
        Command::Analyze {
            text,
            image,
            format,
            output,
        } => {
            let format = format.unwrap_or(config.output_format);
            run_analyze(&config, text, image.as_deref(), format, output.as_deref()).await
        }
        Command::Play {
            rounds,
            format,
            output,
        } => {
            let format = format.unwrap_or(config.output_format);
            run_play(&config, rounds, format, output.as_deref())
        }
        Command::Serve { port } => run_serve(config, port).await,
    }
}

/// Loads configuration from the specified path or default location, then
/// applies the URL overrides.
///
/// Priority: `--api-url` > `FACTLENS_API_URL` > config file > default.
fn load_config(
    config_path: Option<&str>,
    env_api_url: Option<String>,
    api_url: Option<String>,
) -> anyhow::Result<Config> {
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

    config.apply_env_override(env_api_url);
    config.apply_env_override(api_url);
    // Re-validate after overrides
    config.validate()?;

    tracing::debug!(api_base_url = %config.api_base_url, "Configuration loaded");
    Ok(config)
}

// ============================================================================
// analyze
// ============================================================================

/// Prints notifications to stderr.
struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn show_error(&self, message: &str) {
        eprintln!("\u{2716} {message}");
    }
}

async fn run_analyze(
    config: &Config,
    text: Option<String>,
    image: Option<&Path>,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let client = HttpAnalysisClient::from_config(config);
    let mut session = AnalyzeSession::new();

    if let Some(text) = text {
        session.set_input_text(text);
    }
    if let Some(path) = image {
        session.attach_image(ImageUpload::from_path(path)?);
    }

    let request = session.begin()?;
    tracing::info!(kind = request.kind(), base_url = %client.base_url(), "Submitting for analysis");

    let outcome = client.dispatch(&request).await;
    let result = session
        .finish(outcome, &StderrNotifier)
        .map_err(|e| {
            anyhow::anyhow!(
                "Analysis failed: {}\n\nSuggestion: Check that the analysis service is reachable at {} (set --api-url or {})",
                e.user_message(),
                client.base_url(),
                factlens_core::API_URL_ENV
            )
        })?
        .clone();

    let report = Report::builder()
        .analysis(AnalysisReport::new(&request, result))
        .try_build()?;

    emit_report(&report, format, output)
}

// ============================================================================
// Report output
// ============================================================================

/// Renders a report in the requested format.
fn render_report(report: &Report, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => render_report_text(report),
        OutputFormat::Markdown => MarkdownGenerator::new(report).generate(),
        OutputFormat::Json => JsonGenerator::new(report).generate_pretty()? + "\n",
    })
}

/// Prints the rendered report, or writes it to `output`.
fn emit_report(report: &Report, format: OutputFormat, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) if format == OutputFormat::Json => {
            JsonGenerator::new(report)
                .write_to_file(path, true)
                .map_err(|e| anyhow::anyhow!("Failed to write '{}': {e}", path.display()))?;
            println!("Report written to {}", path.display());
        }
        Some(path) => {
            std::fs::write(path, render_report(report, format)?).map_err(|e| {
                anyhow::anyhow!("Failed to write '{}': {e}", path.display())
            })?;
            println!("Report written to {}", path.display());
        }
        None => print!("{}", render_report(report, format)?),
    }
    Ok(())
}

/// Renders every section of a report as plain text.
fn render_report_text(report: &Report) -> String {
    let mut out = String::new();
    if let Some(analysis) = &report.analysis {
        out.push_str(&render_text(&analysis.view));
    }
    if let Some(game) = &report.game {
        out.push_str(&render_game_text(game, report.accuracy_percent()));
    }
    out
}

/// Renders a result view as plain text.
fn render_text(view: &ResultView) -> String {
    let mut out = format!("{} ({})\n", view.verdict, view.variant);
    for point in &view.summary_points {
        out.push_str("  ");
        out.push_str(point);
        out.push('\n');
    }
    if view.has_evidence() {
        out.push_str("Supporting evidence:\n");
        for (i, item) in view.evidence.iter().enumerate() {
            out.push_str(&format!("  {}. {item}\n", i + 1));
        }
    }
    out
}

// ============================================================================
// play
// ============================================================================

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PlayInput {
    Swipe(SwipeDirection),
    Drag(f64),
    Quit,
    Unknown,
}

fn parse_play_input(line: &str) -> PlayInput {
    let line = line.trim().to_lowercase();
    match line.as_str() {
        "f" | "r" | "fact" | "right" => PlayInput::Swipe(SwipeDirection::Right),
        "k" | "l" | "fake" | "left" => PlayInput::Swipe(SwipeDirection::Left),
        "q" | "quit" | "exit" => PlayInput::Quit,
        other => other.parse().map_or(PlayInput::Unknown, PlayInput::Drag),
    }
}

fn run_play(
    config: &Config,
    rounds: Option<u32>,
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let bank = QuestionBank::from_config(config)?;
    let mut game = GameSession::new(bank);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!("Fact or Fake");
    println!("  f/r = FACT, k/l = FAKE, a number = drag offset (past \u{b1}{DRAG_THRESHOLD} decides), q = quit");

    loop {
        if rounds.is_some_and(|max| game.summary().answered >= max) {
            break;
        }

        print_card(&game);
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        let reveal = match parse_play_input(&line) {
            PlayInput::Quit => break,
            PlayInput::Unknown => {
                println!("Type f or r for FACT, k or l for FAKE, a drag offset, or q to quit.");
                continue;
            }
            PlayInput::Swipe(direction) => game.decide(direction)?.clone(),
            PlayInput::Drag(offset) => match game.drag_end(offset)? {
                DragOutcome::SnapBack => {
                    println!("The card snaps back.");
                    continue;
                }
                DragOutcome::Decided(reveal) => reveal,
            },
        };

        println!();
        println!("[{}] {}", reveal.tag(), reveal.title());
        if let Some(explanation) = &reveal.explanation {
            println!("  {explanation}");
        }
        game.advance()?;
    }

    let report = Report::builder().game(game.summary()).try_build()?;
    println!();
    emit_report(&report, format, output)
}

fn print_card(game: &GameSession) {
    println!();
    let mut header = format!("{} | XP {}", game.league().label(), game.xp());
    if game.shows_streak() {
        header.push_str(&format!(" | Streak {}", game.streak()));
    }
    println!("{header}");
    println!("Question {}", game.question_number());
    println!("  {}", game.current_question().text);
    let [left, right] = GameSession::hints();
    println!("  \u{2190} {left}   {right} \u{2192}");
}

/// Renders the end-of-game summary as plain text.
fn render_game_text(summary: &GameSummary, accuracy: Option<u32>) -> String {
    let correct = match accuracy {
        Some(pct) => format!("{} ({pct}%)", summary.correct),
        None => summary.correct.to_string(),
    };
    format!(
        "Game over\n  Answered: {}\n  Correct: {correct}\n  XP: {}\n  Best streak: {}\n  League: {}\n",
        summary.answered, summary.xp, summary.best_streak, summary.league
    )
}

// ============================================================================
// serve
// ============================================================================

async fn run_serve(config: Config, port: Option<u16>) -> anyhow::Result<()> {
    let port = port.unwrap_or(config.server.port);
    let api_base_url = config.api_base_url.clone();
    let state = AppState::from_config(config)?;
    let router = create_router(state);

    let addr: SocketAddr = ([127, 0, 0, 1], port).into();
    let listener = TcpListener::bind(addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {addr}: {e}\n\nSuggestion: Try a different port with --port"
        )
    })?;

    println!("FactLens session server running on http://{addr}");
    println!("  Analysis service: {api_base_url}");
    println!("Press Ctrl+C to stop");
    tracing::info!(%addr, "Session server started");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Received Ctrl+C, shutting down");
        })
        .await?;

    Ok(())
}
