//! Builds the shared index from a file tree, one pool task per text file.

use crate::index::InvertedIndex;
use crate::pool::WorkQueue;
use crate::shared::ThreadSafeIndex;
use crate::tokenizer::tokenize;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

const TEXT_EXTENSIONS: [&str; 2] = ["txt", "text"];

/// Whether `path` has a `.txt` or `.text` extension, ignoring case.
pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.iter().any(|t| ext.eq_ignore_ascii_case(t)))
}

/// Tokenizes `text` into a fresh private index under `location`, positions from 1.
pub fn parse_text(text: &str, location: &str) -> InvertedIndex {
    let mut local = InvertedIndex::new();
    local.add_range(&tokenize(text), location, 1);
    local
}

pub fn parse_file(path: &Path) -> Result<InvertedIndex> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(parse_text(&text, &path.to_string_lossy()))
}

pub struct IndexBuilder {
    index: Arc<ThreadSafeIndex>,
    queue: Arc<WorkQueue>,
}

impl IndexBuilder {
    pub fn new(index: Arc<ThreadSafeIndex>, queue: Arc<WorkQueue>) -> Self {
        Self { index, queue }
    }

    /// Schedules `path` for indexing: every text file below it if it is a
    /// directory, or the file itself otherwise. Returns once the tasks are
    /// queued; call [`WorkQueue::finish`] (or [`build`](Self::build)) before
    /// reading the results.
    pub fn process(&self, path: &Path) -> Result<()> {
        let metadata = fs::metadata(path).with_context(|| format!("reading {}", path.display()))?;
        if !metadata.is_dir() {
            return self.submit(path.to_path_buf());
        }

        let mut scheduled = 0usize;
        for entry in WalkDir::new(path).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && is_text_file(entry.path()) {
                self.submit(entry.into_path())?;
                scheduled += 1;
            }
        }
        tracing::info!(root = %path.display(), files = scheduled, "scheduled text files");
        Ok(())
    }

    /// [`process`](Self::process), then wait for the pool to drain.
    pub fn build(&self, path: &Path) -> Result<()> {
        let outcome = self.process(path);
        self.queue.finish();
        outcome
    }

    fn submit(&self, path: PathBuf) -> Result<()> {
        let index = Arc::clone(&self.index);
        self.queue.execute(move || match parse_file(&path) {
            Ok(local) => {
                tracing::debug!(location = %path.display(), words = local.num_words(), "parsed file");
                index.merge_from(local);
            }
            Err(err) => tracing::warn!(location = %path.display(), error = %format_args!("{err:#}"), "skipping file"),
        })?;
        Ok(())
    }
}
