use anyhow::Result;
use reqwest::blocking::Client;
use reqwest::header;
use std::io::Read;
use std::time::Duration;
use url::Url;

/// Source of page HTML. `None` means the page could not be used, for any reason.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> Option<String>;
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub max_redirects: usize,
    pub max_body_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "wordloc-bot/0.1".to_string(),
            timeout: Duration::from_secs(12),
            max_redirects: 3,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Blocking HTTP fetcher. Only successful `text/html` responses count.
pub struct HttpFetcher {
    client: Client,
    max_body_bytes: usize,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, max_body_bytes: config.max_body_bytes })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Option<String> {
        let resp = match self.client.get(url.clone()).send() {
            Ok(resp) => resp,
            Err(err) => {
                tracing::debug!(%url, error = %err, "request failed");
                return None;
            }
        };
        if !resp.status().is_success() {
            tracing::debug!(%url, status = %resp.status(), "unsuccessful response");
            return None;
        }
        let is_html = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/html"));
        if !is_html {
            tracing::debug!(%url, "not html");
            return None;
        }
        let cap = self.max_body_bytes as u64;
        if let Some(declared) = resp.content_length().filter(|&len| len > cap) {
            tracing::debug!(%url, bytes = declared, "page too large");
            return None;
        }
        // at most cap + 1 bytes are read
        let mut body = Vec::new();
        if let Err(err) = resp.take(cap + 1).read_to_end(&mut body) {
            tracing::debug!(%url, error = %err, "reading body failed");
            return None;
        }
        if body.len() > self.max_body_bytes {
            tracing::debug!(%url, "page too large");
            return None;
        }
        Some(String::from_utf8_lossy(&body).into_owned())
    }
}
