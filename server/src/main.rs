use anyhow::Result;
use axum::Router;
use clap::Parser;
use crawler::{FetchConfig, HttpFetcher, WebCrawler};
use engine::{IndexBuilder, ThreadSafeIndex, WorkQueue};
use server::build_app;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Text file or directory to index before serving
    #[arg(long)]
    text: Option<PathBuf>,
    /// Seed URL to crawl before serving
    #[arg(long)]
    html: Option<String>,
    /// Maximum number of pages to crawl, seed included
    #[arg(long, default_value_t = 50)]
    crawl: usize,
    /// Worker threads used while building
    #[arg(long, default_value_t = WorkQueue::DEFAULT_THREADS)]
    threads: usize,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

// The blocking HTTP client cannot run inside the async runtime, so the index
// is finished before the runtime starts.
fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let index = build_index(&args)?;
    tracing::info!(locations = index.num_counts(), words = index.num_words(), "index ready");

    let app: Router = build_app(index);
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve(app, &args.host, args.port))
}

fn build_index(args: &Args) -> Result<Arc<ThreadSafeIndex>> {
    let index = Arc::new(ThreadSafeIndex::new());
    let queue = Arc::new(WorkQueue::new(args.threads)?);

    if let Some(path) = &args.text {
        IndexBuilder::new(Arc::clone(&index), Arc::clone(&queue)).build(path)?;
    }
    if let Some(seed) = &args.html {
        let fetcher = Arc::new(HttpFetcher::new(&FetchConfig::default())?);
        WebCrawler::new(Arc::clone(&index), Arc::clone(&queue), fetcher, args.crawl).crawl(seed)?;
    }
    queue.join();
    Ok(index)
}

async fn serve(app: Router, host: &str, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
