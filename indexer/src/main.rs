use anyhow::Result;
use clap::Parser;
use crawler::{FetchConfig, HttpFetcher, WebCrawler};
use engine::json::write_to_path;
use engine::{IndexBuilder, QueryEngine, ThreadSafeIndex, WorkQueue};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "indexer")]
#[command(about = "Build a word-location index from files or the web and run queries against it", long_about = None)]
struct Cli {
    /// Text file or directory to index
    #[arg(long)]
    text: Option<PathBuf>,
    /// File with one query per line
    #[arg(long)]
    query: Option<PathBuf>,
    /// Match query stems as prefixes instead of whole words
    #[arg(long, default_value_t = false)]
    partial: bool,
    /// Worker threads; when omitted, a single worker unless crawling
    #[arg(long, num_args = 0..=1, default_missing_value = "5")]
    threads: Option<usize>,
    /// Seed URL to crawl
    #[arg(long)]
    html: Option<String>,
    /// Maximum number of pages to crawl, seed included
    #[arg(long, default_value_t = 1)]
    crawl: usize,
    /// Write word counts per location
    #[arg(long, num_args = 0..=1, default_missing_value = "counts.json")]
    counts: Option<PathBuf>,
    /// Write the word index
    #[arg(long, num_args = 0..=1, default_missing_value = "index.json")]
    index: Option<PathBuf>,
    /// Write query results
    #[arg(long, num_args = 0..=1, default_missing_value = "results.json")]
    results: Option<PathBuf>,
}

impl Cli {
    fn worker_count(&self) -> usize {
        match self.threads {
            None if self.html.is_some() => WorkQueue::DEFAULT_THREADS,
            None => 1,
            Some(0) => WorkQueue::DEFAULT_THREADS,
            Some(n) => n,
        }
    }
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    let index = Arc::new(ThreadSafeIndex::new());
    let queue = Arc::new(WorkQueue::new(args.worker_count())?);
    tracing::info!(threads = queue.size(), "work queue started");

    if let Some(path) = &args.text {
        let builder = IndexBuilder::new(Arc::clone(&index), Arc::clone(&queue));
        if let Err(err) = builder.build(path) {
            tracing::error!(path = %path.display(), error = %format_args!("{err:#}"), "unable to build index");
        }
    }

    if let Some(seed) = &args.html {
        if let Err(err) = crawl(&index, &queue, seed, args.crawl) {
            tracing::error!(%seed, error = %format_args!("{err:#}"), "unable to crawl");
        }
    }

    let engine = QueryEngine::new(Arc::clone(&index), Arc::clone(&queue), args.partial);
    if let Some(path) = &args.query {
        if let Err(err) = engine.process_file(path) {
            tracing::error!(path = %path.display(), error = %format_args!("{err:#}"), "unable to search");
        }
    }

    queue.join();
    tracing::info!(
        locations = index.num_counts(),
        words = index.num_words(),
        queries = engine.num_queries(),
        "indexing complete"
    );

    if let Some(path) = &args.counts {
        report(path, "counts", write_to_path(path, |w| index.write_counts(w)));
    }
    if let Some(path) = &args.index {
        report(path, "index", write_to_path(path, |w| index.write_postings(w)));
    }
    if let Some(path) = &args.results {
        report(path, "results", write_to_path(path, |w| engine.write_results(w)));
    }
    Ok(())
}

fn crawl(index: &Arc<ThreadSafeIndex>, queue: &Arc<WorkQueue>, seed: &str, max_pages: usize) -> Result<()> {
    let fetcher = Arc::new(HttpFetcher::new(&FetchConfig::default())?);
    let crawler = WebCrawler::new(Arc::clone(index), Arc::clone(queue), fetcher, max_pages);
    crawler.crawl(seed)
}

fn report(path: &Path, what: &str, outcome: Result<()>) {
    match outcome {
        Ok(()) => tracing::info!(path = %path.display(), "wrote {what}"),
        Err(err) => tracing::error!(path = %path.display(), error = %format_args!("{err:#}"), "unable to write {what}"),
    }
}
