//! Runs query lines against the shared index and keeps the ranked results.

use crate::json;
use crate::pool::WorkQueue;
use crate::search::SearchResult;
use crate::shared::ThreadSafeIndex;
use crate::tokenizer::unique_tokens;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;

/// Query (unique stems joined by a space) -> results. `None` while a task
/// is still computing it.
type ResultMap = BTreeMap<String, Option<Vec<SearchResult>>>;

/// Normalized form of a query line: its distinct stems, sorted, space-joined.
pub fn normalize_query(line: &str) -> String {
    join_stems(&unique_tokens(line))
}

fn join_stems(stems: &BTreeSet<String>) -> String {
    stems.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
}

pub struct QueryEngine {
    index: Arc<ThreadSafeIndex>,
    queue: Arc<WorkQueue>,
    use_partial: bool,
    results: Arc<Mutex<ResultMap>>,
}

impl QueryEngine {
    pub fn new(index: Arc<ThreadSafeIndex>, queue: Arc<WorkQueue>, use_partial: bool) -> Self {
        Self { index, queue, use_partial, results: Arc::default() }
    }

    /// Schedules every line of `path` as a query and waits for all of them.
    pub fn process_file(&self, path: &Path) -> Result<()> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut outcome = Ok(());
        for line in BufReader::new(file).lines() {
            match line {
                Ok(line) => self.process_line(&line)?,
                Err(err) => {
                    outcome = Err(err).with_context(|| format!("reading {}", path.display()));
                    break;
                }
            }
        }
        self.queue.finish();
        outcome
    }

    /// Schedules one query line. Blank queries and queries already seen are skipped.
    pub fn process_line(&self, line: &str) -> Result<()> {
        let line = line.to_string();
        let index = Arc::clone(&self.index);
        let results = Arc::clone(&self.results);
        let use_partial = self.use_partial;
        self.queue.execute(move || {
            let stems = unique_tokens(&line);
            let query = join_stems(&stems);
            {
                let mut results = results.lock();
                if query.is_empty() || results.contains_key(&query) {
                    return;
                }
                // reserve so a concurrent duplicate does not search again
                results.insert(query.clone(), None);
            }
            let found = index.search(&stems, use_partial);
            tracing::debug!(query = %query, hits = found.len(), "query answered");
            results.lock().insert(query, Some(found));
        })?;
        Ok(())
    }

    /// Answers a single line on the calling thread, caching the result.
    pub fn search_line(&self, line: &str) -> Vec<SearchResult> {
        let stems = unique_tokens(line);
        let query = join_stems(&stems);
        if query.is_empty() {
            return Vec::new();
        }
        if let Some(Some(cached)) = self.results.lock().get(&query) {
            return cached.clone();
        }
        let found = self.index.search(&stems, self.use_partial);
        self.results.lock().insert(query, Some(found.clone()));
        found
    }

    pub fn view_queries(&self) -> Vec<String> {
        self.results
            .lock()
            .iter()
            .filter(|(_, found)| found.is_some())
            .map(|(query, _)| query.clone())
            .collect()
    }

    pub fn view_results(&self, line: &str) -> Vec<SearchResult> {
        self.results
            .lock()
            .get(&normalize_query(line))
            .and_then(Option::clone)
            .unwrap_or_default()
    }

    pub fn has_query(&self, line: &str) -> bool {
        matches!(self.results.lock().get(&normalize_query(line)), Some(Some(_)))
    }

    pub fn num_queries(&self) -> usize {
        self.results.lock().values().filter(|found| found.is_some()).count()
    }

    pub fn num_results(&self, line: &str) -> usize {
        self.results
            .lock()
            .get(&normalize_query(line))
            .and_then(Option::as_ref)
            .map_or(0, Vec::len)
    }

    /// Serializes `{query: [{count, score, where}]}` for every answered query.
    pub fn write_results<W: Write>(&self, writer: W) -> Result<()> {
        let results = self.results.lock();
        let answered: BTreeMap<&str, &[SearchResult]> = results
            .iter()
            .filter_map(|(query, found)| found.as_deref().map(|found| (query.as_str(), found)))
            .collect();
        json::write_pretty(writer, &answered)
    }
}
