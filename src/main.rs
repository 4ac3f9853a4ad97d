//! Sonnet Search - find lines in Shakespeare's sonnets
//!
//! Loads the sonnets from the local cache (or PoetryDB on first use) and
//! prints every line containing the query.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sonnet_search::cli::Cli;
use sonnet_search::data::PoetryDbClient;
use sonnet_search::search::search_terms;
use sonnet_search::{load_corpus, search, CorpusOrigin, SonnetSource};

/// Initialize the tracing subscriber for logging
///
/// Use the RUST_LOG env var to control the log level (e.g., RUST_LOG=debug).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.to_config()?;

    let client = PoetryDbClient::new();
    let corpus = load_corpus(&config, &client)?;
    let origin = match corpus.origin {
        CorpusOrigin::Cache => corpus.origin.to_string(),
        CorpusOrigin::Remote => client.name().to_string(),
    };
    println!(
        "Loaded {} sonnets from {} in {:.2} ms.",
        corpus.sonnets.len(),
        origin,
        corpus.elapsed_seconds * 1000.0
    );

    let result = match config.search_mode() {
        Some(mode) => search_terms(&corpus.sonnets, config.query(), mode),
        None => search(&corpus.sonnets, config.query()),
    };
    println!(
        "{} out of {} sonnets contain \"{}\". Your query took {:.2} ms.",
        result.matched_sonnet_count(),
        corpus.sonnets.len(),
        result.query(),
        result.elapsed_seconds() * 1000.0
    );

    for m in result.matches() {
        println!("{} [{:2}] {}", m.sonnet_title(), m.line_number(), m.line_text());
    }

    Ok(())
}
