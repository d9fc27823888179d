use anyhow::Result;
use clap::Parser;
use crawler::{FetchConfig, HttpFetcher, WebCrawler};
use engine::json::write_to_path;
use engine::{ThreadSafeIndex, WorkQueue};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "crawler")]
#[command(about = "Crawl the web from a seed URL into a word-location index")]
struct Cli {
    /// Seed URL to start from
    #[arg(long)]
    seed: String,
    /// Maximum number of URLs to schedule, seed included
    #[arg(long, default_value_t = 50)]
    max_pages: usize,
    /// Number of worker threads
    #[arg(long, default_value_t = WorkQueue::DEFAULT_THREADS)]
    threads: usize,
    /// Request timeout seconds
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,
    /// Redirects followed per request
    #[arg(long, default_value_t = 3)]
    max_redirects: usize,
    /// User-Agent string sent with every request
    #[arg(long, default_value = "wordloc-bot/0.1")]
    user_agent: String,
    /// Write word counts per page as JSON
    #[arg(long)]
    counts: Option<PathBuf>,
    /// Write the word index as JSON
    #[arg(long)]
    index: Option<PathBuf>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();

    let config = FetchConfig {
        user_agent: args.user_agent.clone(),
        timeout: Duration::from_secs(args.timeout_secs),
        max_redirects: args.max_redirects,
        ..FetchConfig::default()
    };
    let fetcher = Arc::new(HttpFetcher::new(&config)?);
    let index = Arc::new(ThreadSafeIndex::new());
    let queue = Arc::new(WorkQueue::new(args.threads)?);

    let crawler = WebCrawler::new(Arc::clone(&index), Arc::clone(&queue), fetcher, args.max_pages);
    crawler.crawl(&args.seed)?;
    queue.join();

    eprintln!(
        "done: scheduled={} indexed={} words={}",
        crawler.frontier().len(),
        index.num_counts(),
        index.num_words()
    );

    if let Some(path) = &args.counts {
        write_to_path(path, |w| index.write_counts(w))?;
    }
    if let Some(path) = &args.index {
        write_to_path(path, |w| index.write_postings(w))?;
    }
    Ok(())
}
