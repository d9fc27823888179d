use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use unicode_normalization::UnicodeNormalization;
use std::collections::BTreeSet;

lazy_static! {
    static ref CLEAN: Regex = Regex::new(r"[^\p{Alphabetic}\s]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Decompose (NFD), drop everything that is not a letter or whitespace, lowercase.
pub fn clean(text: &str) -> String {
    let decomposed = text.nfd().collect::<String>();
    CLEAN.replace_all(&decomposed, "").to_lowercase()
}

fn stems<C: FromIterator<String>>(text: &str) -> C {
    clean(text)
        .split_whitespace()
        .map(|word| STEMMER.stem(word).into_owned())
        .collect()
}

/// Tokenize text into English stems in order of appearance.
pub fn tokenize(text: &str) -> Vec<String> {
    stems(text)
}

/// Distinct stems of a line, sorted. Queries are driven by these rather than by token order.
pub fn unique_tokens(line: &str) -> BTreeSet<String> {
    stems(line)
}
