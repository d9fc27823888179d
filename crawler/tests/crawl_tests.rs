use crawler::{Fetcher, WebCrawler};
use engine::{ThreadSafeIndex, WorkQueue};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use url::Url;

/// Serves canned pages and records how often each URL was requested.
#[derive(Default)]
struct FakeWeb {
    pages: HashMap<String, String>,
    hits: Mutex<HashMap<String, usize>>,
}

impl FakeWeb {
    fn page(mut self, url: &str, html: String) -> Self {
        self.pages.insert(url.to_string(), html);
        self
    }

    fn hits(&self) -> HashMap<String, usize> {
        self.hits.lock().clone()
    }
}

impl Fetcher for FakeWeb {
    fn fetch(&self, url: &Url) -> Option<String> {
        *self.hits.lock().entry(url.to_string()).or_insert(0) += 1;
        // widen the window for racing tasks
        thread::sleep(Duration::from_millis(2));
        self.pages.get(url.as_str()).cloned()
    }
}

fn links(targets: impl IntoIterator<Item = String>) -> String {
    let anchors: String = targets.into_iter().map(|t| format!("<a href=\"{t}\">link</a>")).collect();
    format!("<html><body><p>apple banana</p>{anchors}</body></html>")
}

fn crawl(web: Arc<FakeWeb>, seed: &str, max_pages: usize, threads: usize) -> (Arc<ThreadSafeIndex>, Vec<String>) {
    let index = Arc::new(ThreadSafeIndex::new());
    let queue = Arc::new(WorkQueue::new(threads).unwrap());
    let crawler = WebCrawler::new(Arc::clone(&index), Arc::clone(&queue), web, max_pages);
    crawler.crawl(seed).unwrap();
    let frontier = crawler.frontier();
    queue.join();
    (index, frontier)
}

#[test]
fn budget_caps_scheduled_urls() {
    let seed = "http://site.test/";
    let web = FakeWeb::default().page(seed, links((1..=10).map(|i| format!("/p{i}"))));
    let web = Arc::new(web);

    let (index, frontier) = crawl(Arc::clone(&web), seed, 5, 4);

    assert_eq!(frontier.len(), 5);
    let hits = web.hits();
    assert_eq!(hits.len(), 5);
    assert!(hits.values().all(|&n| n == 1));
    // links are taken in document order
    for expected in [seed, "http://site.test/p1", "http://site.test/p2", "http://site.test/p3", "http://site.test/p4"] {
        assert!(frontier.contains(&expected.to_string()), "missing {expected}");
    }
    // only the seed page exists; the others fail but still used their slot
    assert_eq!(index.num_counts(), 1);
}

#[test]
fn racing_tasks_never_schedule_a_url_twice() {
    let seed = "http://mesh.test/";
    let all: Vec<String> = (0..10).map(|i| format!("http://mesh.test/n{i}#frag")).collect();
    let mut web = FakeWeb::default().page(seed, links(all.clone()));
    for i in 0..10 {
        let mut targets = all.clone();
        targets.push(seed.to_string());
        web = web.page(&format!("http://mesh.test/n{i}"), links(targets));
    }
    let web = Arc::new(web);

    let (index, frontier) = crawl(Arc::clone(&web), seed, 100, 8);

    assert_eq!(frontier.len(), 11);
    let hits = web.hits();
    assert_eq!(hits.len(), 11);
    assert!(hits.values().all(|&n| n == 1), "duplicate fetches: {hits:?}");
    assert_eq!(index.num_counts(), 11);
    assert_eq!(index.num_locations("appl"), 11);
}

#[test]
fn page_text_is_indexed_under_its_url() {
    let seed = "https://docs.test/start";
    let html = "<html><head><title>ignored</title></head><body>Running dogs <script>skip()</script>run</body></html>";
    let web = Arc::new(FakeWeb::default().page(seed, html.to_string()));

    let (index, frontier) = crawl(web, seed, 3, 2);

    assert_eq!(frontier, vec![seed.to_string()]);
    assert_eq!(index.get_count(seed), 3);
    assert_eq!(index.view_positions("run", seed).into_iter().collect::<Vec<_>>(), vec![1, 3]);
    assert!(!index.has_word("skip"));
    assert!(!index.has_word("ignor"));
}

#[test]
fn seed_fragment_is_dropped() {
    let web = Arc::new(FakeWeb::default().page("http://frag.test/page", links(Vec::new())));
    let (index, frontier) = crawl(web, "http://frag.test/page#section", 1, 1);
    assert_eq!(frontier, vec!["http://frag.test/page".to_string()]);
    assert!(index.has_count("http://frag.test/page"));
}

#[test]
fn failed_seed_indexes_nothing() {
    let web = Arc::new(FakeWeb::default());
    let (index, frontier) = crawl(Arc::clone(&web), "http://down.test/", 10, 2);
    assert_eq!(frontier.len(), 1);
    assert_eq!(index.num_counts(), 0);
    assert_eq!(web.hits().len(), 1);
}

#[test]
fn invalid_seed_is_rejected() {
    let index = Arc::new(ThreadSafeIndex::new());
    let queue = Arc::new(WorkQueue::new(1).unwrap());
    let crawler = WebCrawler::new(index, Arc::clone(&queue), Arc::new(FakeWeb::default()), 5);
    assert!(crawler.crawl("not a url").is_err());
    assert!(crawler.frontier().is_empty());
    queue.join();
}
