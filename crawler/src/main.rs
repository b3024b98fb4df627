use anyhow::Result;
use clap::Parser;
use sift_core::{ThreadedIndex, ThreadedResults, WorkQueue};
use sift_crawler::fetch::HttpFetcher;
use sift_crawler::WebCrawler;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};
use url::Url;

/// Crawl the web from a seed URL, index the pages, and optionally run
/// searches against the result.
#[derive(Parser)]
#[command(name = "sift-crawler")]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(long)]
    seed: Url,

    /// Maximum number of pages to fetch, seed included
    #[arg(long, default_value_t = 1)]
    pages: usize,

    /// Number of worker threads; 0 for the default pool size
    #[arg(long, default_value_t = 0)]
    threads: usize,

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

    let queue = Arc::new(WorkQueue::with_threads(cli.threads));
    let index = Arc::new(ThreadedIndex::new());
    let fetcher = Arc::new(HttpFetcher::new()?);

    let crawler = Arc::new(WebCrawler::new(
        Arc::clone(&queue),
        Arc::clone(&index),
        fetcher,
    ));
    WebCrawler::build(&crawler, cli.seed, cli.pages);
    tracing::info!(
        pages = crawler.crawled_urls().len(),
        words = index.num_words(),
        "crawl complete"
    );

    if let Some(query) = &cli.query {
        let results = Arc::new(ThreadedResults::new(
            Arc::clone(&index),
            Arc::clone(&queue),
        ));
        ThreadedResults::read_queries(&results, query, cli.partial)?;
        if let Some(path) = &cli.results {
            report_save(results.save_results(path), path);
        }
    }

    if let Some(path) = &cli.counts {
        report_save(index.save_counts(path), path);
    }
    if let Some(path) = &cli.index {
        report_save(index.save_index(path), path);
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
