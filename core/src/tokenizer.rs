use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref NON_ALPHA: Regex = Regex::new(r"[^\p{Alphabetic}\s]+").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Cleans text by decomposing to NFD, dropping every non-alphabetic character
/// (which strips diacritic combining marks), and lowercasing.
pub fn clean(text: &str) -> String {
    let decomposed = text.nfd().collect::<String>();
    NON_ALPHA.replace_all(&decomposed, "").to_lowercase()
}

/// Cleans and splits text into words in document order.
pub fn parse(text: &str) -> Vec<String> {
    clean(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Stems a single already-cleaned word.
pub fn stem(word: &str) -> String {
    STEMMER.stem(word).to_string()
}

/// Cleans, splits, and stems text, preserving document order and duplicates.
pub fn stems(text: &str) -> Vec<String> {
    parse(text).iter().map(|word| stem(word)).collect()
}

/// Cleans, splits, and stems a query line into a sorted set of unique stems.
pub fn unique_stems(line: &str) -> BTreeSet<String> {
    parse(line).iter().map(|word| stem(word)).collect()
}
