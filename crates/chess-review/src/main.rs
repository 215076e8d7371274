use anyhow::{bail, Context, Result};
use chess_analysis::{
    analyze_position, locate_engine, AnalysisEvent, AnalysisTask, Classification,
    EvaluationPipeline, Limit, Oracle, UciOracle,
};
use chess_game::{Color, Ply};
use chess_review::{AnalysisFile, ReviewConfig, ReviewSession};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;

#[derive(Parser)]
#[command(name = "chess-review")]
#[command(about = "Review chess games with a UCI engine")]
struct Cli {
    /// Configuration file (defaults to review.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse every move of a game and save the results
    Analyze {
        /// PGN file or analysis file
        input: PathBuf,
        /// Analysis file to write (defaults to the input with a .json extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Milliseconds per position, overriding the config
        #[arg(short, long)]
        time: Option<u64>,
    },
    /// Print a game with its classifications, notes and summary
    Show {
        input: PathBuf,
    },
    /// Show the engine's best lines after a ply
    Position {
        input: PathBuf,
        /// Number of plies played before the analysed position
        #[arg(short, long, default_value = "0")]
        ply: usize,
        /// Number of lines, overriding the config
        #[arg(short, long)]
        lines: Option<usize>,
    },
    /// Write the game as PGN with classifications and notes
    Export {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Name the opening of a game
    Opening {
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ReviewConfig::load(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Analyze {
            input,
            output,
            time,
        } => analyze(&config, &input, output, time).await,
        Commands::Show { input } => {
            let session = load_session(&input)?;
            print_game(&session);
            print_summary(&session);
            Ok(())
        }
        Commands::Position { input, ply, lines } => position(&config, &input, ply, lines),
        Commands::Export { input, output } => {
            let session = load_session(&input)?;
            let text = session.export_pgn();
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", text),
            }
            Ok(())
        }
        Commands::Opening { input } => {
            let mut session = load_session(&input)?;
            let service = config.openings.service()?;
            match session.detect_opening(&service)? {
                Some(found) => println!("{} {}", found.eco, found.name),
                None => println!("Unknown opening"),
            }
            Ok(())
        }
    }
}

/// Reads a PGN file, or an analysis file when the extension is `.json`.
fn load_session(path: &Path) -> Result<ReviewSession> {
    let is_json = path.extension().is_some_and(|ext| ext == "json");
    let session = if is_json {
        ReviewSession::from_analysis(&AnalysisFile::read(path)?)?
    } else {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        ReviewSession::from_pgn(&text)?
    };
    Ok(session)
}

fn start_engine(config: &ReviewConfig) -> Result<UciOracle> {
    let path = locate_engine(config.engine.path.as_deref())
        .context("Stockfish not found; set [engine] path in review.toml")?;
    let mut oracle = UciOracle::spawn(&path)?;
    oracle.configure(&config.engine.options)?;
    tracing::info!("Using {} ({})", oracle.name(), path.display());
    Ok(oracle)
}

async fn analyze(
    config: &ReviewConfig,
    input: &Path,
    output: Option<PathBuf>,
    time: Option<u64>,
) -> Result<()> {
    let mut session = load_session(input)?;
    if session.game().is_empty() {
        bail!("{} has no moves", input.display());
    }

    match config.openings.service() {
        Ok(service) => {
            if let Err(e) = session.detect_opening(&service) {
                tracing::warn!("Opening lookup failed: {}", e);
            }
        }
        Err(e) => tracing::warn!("Opening table unavailable: {}", e),
    }

    let mut oracle = start_engine(config)?;
    oracle.new_game()?;
    let limit = time.map_or_else(|| config.analysis.game_limit(), Limit::millis);
    let pipeline = EvaluationPipeline::new(config.scoring.clone());
    let mut task = AnalysisTask::spawn(pipeline, session.plies(), oracle, limit);

    let cancel = task.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nStopping after the current move...");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    let mut outcome = None;
    while let Some(event) = task.next_event().await {
        match event {
            AnalysisEvent::Progress(p) => eprint!("\rAnalysing move {}/{}", p.done, p.total),
            AnalysisEvent::Finished(result) => {
                outcome = Some(result);
                break;
            }
        }
    }
    eprintln!();
    let outcome = outcome.context("Analysis ended without a result")?;
    let cancelled = outcome.cancelled;
    session.apply_analysis(outcome);

    let output = output.unwrap_or_else(|| input.with_extension("json"));
    session.save_analysis(&output)?;
    if cancelled {
        println!(
            "Cancelled after {} of {} plies; partial results saved to {}",
            session.records().len(),
            session.game().len(),
            output.display()
        );
    } else {
        println!("Saved analysis to {}", output.display());
    }
    print_summary(&session);
    Ok(())
}

fn position(
    config: &ReviewConfig,
    input: &Path,
    ply: usize,
    lines: Option<usize>,
) -> Result<()> {
    let mut session = load_session(input)?;
    session.goto_index(ply)?;
    let history: Vec<Ply> = session.game().current_path().into_iter().cloned().collect();

    let mut oracle = start_engine(config)?;
    let found = analyze_position(
        &history,
        &mut oracle,
        config.analysis.position_limit(),
        lines.unwrap_or(config.analysis.lines),
    )?;

    println!("{}", session.game().fen());
    if found.is_empty() {
        println!("No legal moves ({:?})", session.game().status());
    }
    for line in found {
        println!("{}", line);
    }
    Ok(())
}

fn print_game(session: &ReviewSession) {
    let headers = session.headers();
    println!(
        "{} vs {} ({})",
        headers.white().unwrap_or("?"),
        headers.black().unwrap_or("?"),
        headers.result()
    );
    if let Some(opening) = session.opening() {
        println!("{} {}", opening.eco, opening.name);
    }
    println!();

    for (i, ply) in session.game().mainline().into_iter().enumerate() {
        let number = if i % 2 == 0 {
            format!("{}.", i / 2 + 1)
        } else {
            format!("{}...", i / 2 + 1)
        };
        let (symbol, eval) = match session.record(i) {
            Some(record) => (
                record.classification.symbol(),
                record
                    .centipawns
                    .map(|cp| format!("{:+.2}", cp as f64 / 100.0))
                    .unwrap_or_default(),
            ),
            None => ("", String::new()),
        };
        let note = session.note(i).unwrap_or("");
        println!("{:>6} {:<8} {:<3} {:>7}  {}", number, ply.san(), symbol, eval, note);
    }
}

fn print_summary(session: &ReviewSession) {
    let summary = session.summary();
    println!();
    println!("{:<14} {:>6} {:>6}", "", "White", "Black");
    println!(
        "{:<14} {:>5.1}% {:>5.1}%",
        "Accuracy",
        summary.accuracy(Color::White),
        summary.accuracy(Color::Black)
    );
    for class in Classification::ALL {
        let white = summary.count(class, Color::White);
        let black = summary.count(class, Color::Black);
        if class == Classification::Unclassified && white + black == 0 {
            continue;
        }
        println!(
            "{:<14} {:>6} {:>6}",
            format!("{} {}", class.symbol(), class.label()),
            white,
            black
        );
    }
}
