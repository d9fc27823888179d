use crate::search::SearchResult;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Bound;

/// Positions of one word at one location, 1-based.
pub type Positions = BTreeSet<usize>;

/// Word stem -> location -> positions. Ordered by word: partial search scans
/// a contiguous key range, so this must stay a sorted map.
pub type Postings = BTreeMap<String, BTreeMap<String, Positions>>;

/// Word-location index plus the total word count of each location.
///
/// Not synchronized. Used directly as the private per-file / per-page index
/// and wrapped by [`crate::ThreadSafeIndex`] for the shared one.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct InvertedIndex {
    counts: BTreeMap<String, usize>,
    postings: Postings,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `word` at `position` (1-based) of `location`. The location's
    /// count is raised to at least `position`. Adding the same triple twice is
    /// a no-op.
    pub fn add_one(&mut self, word: &str, location: &str, position: usize) {
        let inserted = match self.postings.get_mut(word) {
            Some(locations) => match locations.get_mut(location) {
                Some(positions) => positions.insert(position),
                None => locations.insert(location.to_string(), Positions::from([position])).is_none(),
            },
            None => {
                let locations = BTreeMap::from([(location.to_string(), Positions::from([position]))]);
                self.postings.insert(word.to_string(), locations);
                true
            }
        };
        if inserted {
            self.raise_count(location, position);
        }
    }

    /// Records `words` at consecutive positions starting from `start`.
    pub fn add_range<S: AsRef<str>>(&mut self, words: &[S], location: &str, start: usize) {
        for (offset, word) in words.iter().enumerate() {
            self.add_one(word.as_ref(), location, start + offset);
        }
    }

    /// Moves every posting and count of `other` into this index.
    pub fn merge_from(&mut self, other: InvertedIndex) {
        for (word, locations) in other.postings {
            match self.postings.get_mut(&word) {
                Some(existing) => {
                    for (location, positions) in locations {
                        match existing.get_mut(&location) {
                            Some(current) => current.extend(positions),
                            None => {
                                existing.insert(location, positions);
                            }
                        }
                    }
                }
                None => {
                    self.postings.insert(word, locations);
                }
            }
        }
        for (location, count) in other.counts {
            self.raise_count(&location, count);
        }
    }

    fn raise_count(&mut self, location: &str, count: usize) {
        match self.counts.get_mut(location) {
            Some(current) => *current = (*current).max(count),
            None => {
                self.counts.insert(location.to_string(), count);
            }
        }
    }

    pub fn view_counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    pub fn view_postings(&self) -> &Postings {
        &self.postings
    }

    pub fn view_words(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    pub fn view_locations<'a>(&'a self, word: &str) -> impl Iterator<Item = &'a str> {
        self.postings
            .get(word)
            .into_iter()
            .flat_map(|locations| locations.keys().map(String::as_str))
    }

    pub fn view_positions<'a>(&'a self, word: &str, location: &str) -> impl Iterator<Item = usize> + 'a {
        self.postings
            .get(word)
            .and_then(|locations| locations.get(location))
            .into_iter()
            .flat_map(|positions| positions.iter().copied())
    }

    /// Total words at `location`, 0 if unknown.
    pub fn get_count(&self, location: &str) -> usize {
        self.counts.get(location).copied().unwrap_or(0)
    }

    pub fn num_counts(&self) -> usize {
        self.counts.len()
    }

    pub fn num_words(&self) -> usize {
        self.postings.len()
    }

    pub fn num_locations(&self, word: &str) -> usize {
        self.postings.get(word).map_or(0, BTreeMap::len)
    }

    pub fn num_positions(&self, word: &str, location: &str) -> usize {
        self.postings
            .get(word)
            .and_then(|locations| locations.get(location))
            .map_or(0, BTreeSet::len)
    }

    pub fn has_count(&self, location: &str) -> bool {
        self.counts.contains_key(location)
    }

    pub fn has_word(&self, word: &str) -> bool {
        self.postings.contains_key(word)
    }

    pub fn has_location(&self, word: &str, location: &str) -> bool {
        self.postings
            .get(word)
            .is_some_and(|locations| locations.contains_key(location))
    }

    pub fn has_position(&self, word: &str, location: &str, position: usize) -> bool {
        self.postings
            .get(word)
            .and_then(|locations| locations.get(location))
            .is_some_and(|positions| positions.contains(&position))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty() && self.postings.is_empty()
    }

    pub fn search(&self, query: &BTreeSet<String>, use_partial: bool) -> Vec<SearchResult> {
        if use_partial {
            self.partial_search(query)
        } else {
            self.exact_search(query)
        }
    }

    /// Locations containing any query word exactly.
    pub fn exact_search(&self, query: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut seen = HashMap::new();
        for word in query {
            if let Some(locations) = self.postings.get(word) {
                self.accumulate(locations, &mut seen);
            }
        }
        self.rank(seen)
    }

    /// Locations containing any word that starts with a query word.
    pub fn partial_search(&self, query: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut seen = HashMap::new();
        for prefix in query {
            let candidates = self
                .postings
                .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
                .take_while(|(word, _)| word.starts_with(prefix.as_str()));
            for (_, locations) in candidates {
                self.accumulate(locations, &mut seen);
            }
        }
        self.rank(seen)
    }

    fn accumulate<'a>(
        &'a self,
        locations: &'a BTreeMap<String, Positions>,
        seen: &mut HashMap<&'a str, SearchResult>,
    ) {
        for (location, positions) in locations {
            seen.entry(location.as_str())
                .or_insert_with(|| SearchResult::new(location.as_str(), self.get_count(location)))
                .add_matches(positions.len());
        }
    }

    fn rank(&self, seen: HashMap<&str, SearchResult>) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = seen.into_values().collect();
        results.sort();
        results
    }
}
