use crate::fetch::Fetcher;
use crate::html::{extract_links, normalize, strip_to_text};
use anyhow::{Context, Result};
use engine::builder::parse_text;
use engine::{ThreadSafeIndex, WorkQueue};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

struct CrawlState {
    index: Arc<ThreadSafeIndex>,
    queue: Arc<WorkQueue>,
    fetcher: Arc<dyn Fetcher>,
    /// Every URL ever scheduled, normalized. Guarded apart from the index.
    frontier: Mutex<HashSet<String>>,
    max_pages: usize,
}

/// Crawls outward from a seed, feeding each page into the shared index.
///
/// At most `max_pages` URLs are ever scheduled, seed included; a page that
/// fails to fetch still uses up its slot.
pub struct WebCrawler {
    state: Arc<CrawlState>,
}

impl WebCrawler {
    pub fn new(
        index: Arc<ThreadSafeIndex>,
        queue: Arc<WorkQueue>,
        fetcher: Arc<dyn Fetcher>,
        max_pages: usize,
    ) -> Self {
        let state = CrawlState {
            index,
            queue,
            fetcher,
            frontier: Mutex::new(HashSet::new()),
            max_pages: max_pages.max(1),
        };
        Self { state: Arc::new(state) }
    }

    /// Crawls from `seed` and blocks until every page reachable within the
    /// budget has been processed.
    pub fn crawl(&self, seed: &str) -> Result<()> {
        let seed = Url::parse(seed).with_context(|| format!("invalid seed url {seed:?}"))?;
        let seed = normalize(&seed);
        if try_admit(&self.state, &seed) {
            schedule(&self.state, seed.clone());
        }
        self.state.queue.finish();
        tracing::info!(%seed, pages = self.state.frontier.lock().len(), "crawl finished");
        Ok(())
    }

    /// URLs scheduled so far, sorted.
    pub fn frontier(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.state.frontier.lock().iter().cloned().collect();
        urls.sort();
        urls
    }
}

/// Adds `url` to the frontier if it is new and the budget allows, as one
/// critical section.
fn try_admit(state: &CrawlState, url: &Url) -> bool {
    let mut frontier = state.frontier.lock();
    if frontier.len() >= state.max_pages || frontier.contains(url.as_str()) {
        return false;
    }
    frontier.insert(url.as_str().to_string())
}

fn schedule(state: &Arc<CrawlState>, url: Url) {
    let task_state = Arc::clone(state);
    if let Err(err) = state.queue.execute(move || visit(&task_state, url)) {
        tracing::warn!(error = %err, "could not schedule page");
    }
}

fn visit(state: &Arc<CrawlState>, url: Url) {
    let Some(html) = state.fetcher.fetch(&url) else {
        tracing::debug!(%url, "skipping page");
        return;
    };

    let local = parse_text(&strip_to_text(&html), url.as_str());
    tracing::debug!(%url, words = local.num_words(), "parsed page");
    state.index.merge_from(local);

    for link in extract_links(&url, &html) {
        if state.frontier.lock().len() >= state.max_pages {
            break;
        }
        if try_admit(state, &link) {
            schedule(state, link);
        }
    }
}
