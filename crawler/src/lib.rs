//! Web crawling into the shared word index.

pub mod crawl;
pub mod fetch;
pub mod html;

pub use crawl::WebCrawler;
pub use fetch::{FetchConfig, Fetcher, HttpFetcher};
