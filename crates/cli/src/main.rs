//! CLI that answers a question with the best matching slide of a deck.

mod acquire;
mod render;

use acquire::Source;
use anyhow::{Context, Result};
use clap::Parser;
use slideqa_core::{Error, QaEngine, SlideExtractor};
use slideqa_embed::{EmbedderConfig, FastEmbedder, ModelChoice};
use slideqa_pptx::PptxParser;
use std::path::PathBuf;
use std::process::ExitCode;

/// Exit code for missing or empty inputs.
const EXIT_INVALID_INPUT: u8 = 2;

/// How a run ended, when it did not fail.
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    Done,
    InvalidInput,
}

/// Find the slide of a PowerPoint deck that best answers a question.
#[derive(Parser, Debug)]
#[command(name = "slide-qa")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Slide deck (.pptx): a local path or a shareable http(s) link
    input: Option<String>,

    /// Question to answer from the slides
    #[arg(short, long)]
    question: Option<String>,

    /// Number of matching slides to show, best first
    #[arg(short = 'n', long, default_value = "1")]
    top: usize,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Print the extracted slide text and exit without loading the model
    #[arg(short, long)]
    list: bool,

    /// Sentence-embedding model
    #[arg(short, long, env = "SLIDEQA_MODEL", default_value_t = ModelChoice::default())]
    model: ModelChoice,

    /// Directory for downloaded model weights
    #[arg(long, env = "SLIDEQA_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Also write the acquired deck to this file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match run(&args) {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::InvalidInput) => ExitCode::from(EXIT_INVALID_INPUT),
        Err(e) => {
            match e.downcast_ref::<Error>() {
                Some(core) if core.is_validation() => {
                    eprintln!("Warning: {}", core);
                    return ExitCode::from(EXIT_INVALID_INPUT);
                }
                _ => eprintln!("Error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<Outcome> {
    let Some(input) = args.input.as_deref().filter(|i| !i.trim().is_empty()) else {
        eprintln!("Warning: Please provide a slide deck (path or link) and a question.");
        return Ok(Outcome::InvalidInput);
    };

    let question = args.question.as_deref().unwrap_or("").trim();
    if question.is_empty() && !args.list {
        eprintln!("Warning: Please provide a slide deck (path or link) and a question.");
        return Ok(Outcome::InvalidInput);
    }

    if args.list {
        let deck = Source::parse(input).acquire()?;
        stage(&deck, args)?;
        let document = PptxParser::new().extract_checked(&deck.bytes, &deck.name)?;
        print!("{}", render::render_document(&document));
        return Ok(Outcome::Done);
    }

    // The model is loaded before any input is fetched; a broken model stops here.
    let mut config = EmbedderConfig::new(args.model).with_download_progress(args.verbose);
    if let Some(dir) = &args.cache_dir {
        config = config.with_cache_dir(dir);
    }
    let embedder = FastEmbedder::load(&config).context("Could not start")?;
    let engine = QaEngine::new(PptxParser::new(), &embedder);

    let deck = Source::parse(input).acquire()?;
    stage(&deck, args)?;

    if args.verbose {
        eprintln!("Processing: {} ({} bytes)", deck.name, deck.bytes.len());
    }

    let document = engine.extract(&deck.bytes, &deck.name)?;
    if args.verbose {
        eprintln!(
            "  Found {} slides, {} with text",
            document.slide_count,
            document.len()
        );
    }

    let results = engine.score_document(&document, question, args.top)?;

    if args.json {
        println!("{}", render::render_json(&results)?);
    } else {
        print!("{}", render::render_matches(&results));
    }

    Ok(Outcome::Done)
}

/// Write the acquired deck to `--save` when given.
fn stage(deck: &acquire::AcquiredDeck, args: &Args) -> Result<()> {
    if let Some(path) = &args.save {
        deck.save(path)?;
        log::debug!("Saved deck to {}", path.display());
    }
    Ok(())
}
