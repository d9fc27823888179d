use crate::index::{InvertedIndex, Positions};
use crate::json;
use crate::lock::MultiReaderLock;
use crate::search::SearchResult;
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

/// The shared index: an [`InvertedIndex`] behind a [`MultiReaderLock`].
///
/// Every operation holds the lock for its whole duration. Accessors return
/// owned snapshots; nothing handed out aliases the live maps.
#[derive(Default)]
pub struct ThreadSafeIndex {
    inner: MultiReaderLock<InvertedIndex>,
}

impl ThreadSafeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<R>(&self, f: impl FnOnce(&InvertedIndex) -> R) -> R {
        let guard = self.inner.read();
        f(&*guard)
    }

    pub fn add_one(&self, word: &str, location: &str, position: usize) {
        self.inner.write().add_one(word, location, position);
    }

    pub fn add_range<S: AsRef<str>>(&self, words: &[S], location: &str, start: usize) {
        self.inner.write().add_range(words, location, start);
    }

    /// Merges a private index in a single write-lock hold, so readers see
    /// either none or all of it.
    pub fn merge_from(&self, other: InvertedIndex) {
        if other.is_empty() {
            return;
        }
        self.inner.write().merge_from(other);
    }

    pub fn search(&self, query: &BTreeSet<String>, use_partial: bool) -> Vec<SearchResult> {
        self.read(|index| index.search(query, use_partial))
    }

    pub fn exact_search(&self, query: &BTreeSet<String>) -> Vec<SearchResult> {
        self.read(|index| index.exact_search(query))
    }

    pub fn partial_search(&self, query: &BTreeSet<String>) -> Vec<SearchResult> {
        self.read(|index| index.partial_search(query))
    }

    pub fn view_counts(&self) -> BTreeMap<String, usize> {
        self.read(|index| index.view_counts().clone())
    }

    pub fn view_words(&self) -> Vec<String> {
        self.read(|index| index.view_words().map(str::to_string).collect())
    }

    pub fn view_locations(&self, word: &str) -> Vec<String> {
        self.read(|index| index.view_locations(word).map(str::to_string).collect())
    }

    pub fn view_positions(&self, word: &str, location: &str) -> Positions {
        self.read(|index| index.view_positions(word, location).collect())
    }

    /// Copies the whole index out.
    pub fn snapshot(&self) -> InvertedIndex {
        self.read(InvertedIndex::clone)
    }

    pub fn get_count(&self, location: &str) -> usize {
        self.read(|index| index.get_count(location))
    }

    pub fn num_counts(&self) -> usize {
        self.read(InvertedIndex::num_counts)
    }

    pub fn num_words(&self) -> usize {
        self.read(InvertedIndex::num_words)
    }

    pub fn num_locations(&self, word: &str) -> usize {
        self.read(|index| index.num_locations(word))
    }

    pub fn num_positions(&self, word: &str, location: &str) -> usize {
        self.read(|index| index.num_positions(word, location))
    }

    pub fn has_count(&self, location: &str) -> bool {
        self.read(|index| index.has_count(location))
    }

    pub fn has_word(&self, word: &str) -> bool {
        self.read(|index| index.has_word(word))
    }

    pub fn has_location(&self, word: &str, location: &str) -> bool {
        self.read(|index| index.has_location(word, location))
    }

    pub fn has_position(&self, word: &str, location: &str, position: usize) -> bool {
        self.read(|index| index.has_position(word, location, position))
    }

    /// Serializes `{location: count}` while holding the read lock.
    pub fn write_counts<W: Write>(&self, writer: W) -> Result<()> {
        self.read(|index| json::write_pretty(writer, index.view_counts()))
    }

    /// Serializes `{word: {location: [positions]}}` while holding the read lock.
    pub fn write_postings<W: Write>(&self, writer: W) -> Result<()> {
        self.read(|index| json::write_pretty(writer, index.view_postings()))
    }
}

impl From<InvertedIndex> for ThreadSafeIndex {
    fn from(index: InvertedIndex) -> Self {
        Self { inner: MultiReaderLock::new(index) }
    }
}
