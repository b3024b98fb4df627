use anyhow::Result;
use clap::Parser;
use sift_core::{InvertedIndex, Results, ThreadedIndex, ThreadedResults, WorkQueue};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

/// Build a word-level inverted index from a directory of text files, run
/// searches against it, and write the results as JSON.
#[derive(Parser)]
#[command(name = "sift-indexer")]
struct Cli {
    /// Text file or directory tree to index
    #[arg(long)]
    text: Option<PathBuf>,

    /// Number of worker threads; omit for a single-threaded build,
    /// pass 0 for the default pool size
    #[arg(long)]
    threads: Option<usize>,

    /// File of query lines, one search per line
    #[arg(long)]
    query: Option<PathBuf>,

    /// Match query words by prefix instead of exact equality
    #[arg(long, default_value_t = false)]
    partial: bool,

    /// Where to write the per-location token counts as JSON
    #[arg(long)]
    counts: Option<PathBuf>,

    /// Where to write the full index as JSON
    #[arg(long)]
    index: Option<PathBuf>,

    /// Where to write the search results as JSON
    #[arg(long)]
    results: Option<PathBuf>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.threads {
        Some(threads) => run_threaded(&cli, threads),
        None => run_sequential(&cli),
    }
}

fn run_sequential(cli: &Cli) -> Result<()> {
    let mut index = InvertedIndex::new();
    if let Some(text) = &cli.text {
        sift_indexer::build(text, &mut index)?;
        tracing::info!(words = index.num_words(), "index built");
    }

    let mut results = Results::new(&index);
    if let Some(query) = &cli.query {
        results.read_queries(query, cli.partial)?;
    }

    if let Some(path) = &cli.counts {
        report_save(index.save_counts(path), path);
    }
    if let Some(path) = &cli.index {
        report_save(index.save_index(path), path);
    }
    if let Some(path) = &cli.results {
        report_save(results.save_results(path), path);
    }
    Ok(())
}

fn run_threaded(cli: &Cli, threads: usize) -> Result<()> {
    let queue = Arc::new(WorkQueue::with_threads(threads));
    let index = Arc::new(ThreadedIndex::new());

    if let Some(text) = &cli.text {
        sift_indexer::build_threaded(text, &index, &queue)?;
        tracing::info!(words = index.num_words(), "index built");
    }

    let results = Arc::new(ThreadedResults::new(
        Arc::clone(&index),
        Arc::clone(&queue),
    ));
    if let Some(query) = &cli.query {
        ThreadedResults::read_queries(&results, query, cli.partial)?;
    }

    if let Some(path) = &cli.counts {
        report_save(index.save_counts(path), path);
    }
    if let Some(path) = &cli.index {
        report_save(index.save_index(path), path);
    }
    if let Some(path) = &cli.results {
        report_save(results.save_results(path), path);
    }

    queue.join();
    Ok(())
}

/// Output failures are reported without aborting the remaining stages.
fn report_save(outcome: Result<()>, path: &std::path::Path) {
    if let Err(error) = outcome {
        tracing::error!(path = %path.display(), %error, "failed to write output");
    }
}
