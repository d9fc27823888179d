use serde::{Serialize, Serializer};
use serde_json::value::RawValue;
use std::cmp::Ordering;

/// One location matching a query.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    #[serde(rename = "count")]
    matches: usize,
    #[serde(serialize_with = "fixed_score")]
    score: f64,
    #[serde(rename = "where")]
    location: String,
    #[serde(skip)]
    total_words: usize,
}

impl SearchResult {
    pub fn new(location: impl Into<String>, total_words: usize) -> Self {
        Self { matches: 0, score: 0.0, location: location.into(), total_words }
    }

    /// Adds `matches` occurrences and recomputes the score.
    pub(crate) fn add_matches(&mut self, matches: usize) {
        self.matches += matches;
        self.score = if self.total_words == 0 {
            0.0
        } else {
            self.matches as f64 / self.total_words as f64
        };
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn matches(&self) -> usize {
        self.matches
    }

    pub fn score(&self) -> f64 {
        self.score
    }
}

/// Scores are written with eight decimal places, e.g. `0.30000000`.
fn fixed_score<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    let raw = RawValue::from_string(format!("{score:.8}")).map_err(serde::ser::Error::custom)?;
    raw.serialize(serializer)
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Higher score first, then more matches, then location (case-insensitive).
impl Ord for SearchResult {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.matches.cmp(&self.matches))
            .then_with(|| cmp_ignore_case(&self.location, &other.location))
            .then_with(|| self.location.cmp(&other.location))
    }
}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SearchResult {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SearchResult {}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(location: &str, total: usize, matches: usize) -> SearchResult {
        let mut r = SearchResult::new(location, total);
        r.add_matches(matches);
        r
    }

    #[test]
    fn orders_by_score_then_count_then_location() {
        let mut results = vec![
            result("b.txt", 20, 2),
            result("a.txt", 10, 1),
            result("C.txt", 10, 5),
            result("d.txt", 4, 2),
        ];
        results.sort();
        let order: Vec<&str> = results.iter().map(|r| r.location()).collect();
        // d: 0.5, C: 0.5 but d has fewer matches, b: 0.1 with 2, a: 0.1 with 1
        assert_eq!(order, vec!["C.txt", "d.txt", "b.txt", "a.txt"]);
    }

    #[test]
    fn location_tie_break_ignores_case() {
        let mut results = vec![result("beta", 10, 1), result("Alpha", 10, 1), result("alpha", 10, 1)];
        results.sort();
        let order: Vec<&str> = results.iter().map(|r| r.location()).collect();
        assert_eq!(order, vec!["Alpha", "alpha", "beta"]);
    }

    #[test]
    fn score_is_matches_over_total() {
        let mut r = SearchResult::new("a", 10);
        r.add_matches(2);
        r.add_matches(1);
        assert_eq!(r.matches(), 3);
        assert!((r.score() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn score_serializes_with_eight_decimals() {
        let json = serde_json::to_string(&result("a.txt", 3, 1)).unwrap();
        assert_eq!(json, r#"{"count":1,"score":0.33333333,"where":"a.txt"}"#);
    }
}
