use crate::persist;
use anyhow::Result;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Write;
use std::ops::Bound;
use std::path::Path;

/// Posting list for one word: location -> ascending 1-based token positions.
pub type Postings = BTreeMap<String, BTreeSet<usize>>;

/// Word-level inverted index over file paths and URLs, with per-location
/// token counts. Single-threaded; wrap in [`crate::ThreadedIndex`] for
/// concurrent use.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    /// word -> location -> positions where the word occurs.
    index: BTreeMap<String, Postings>,
    /// location -> highest token position observed for that location.
    counts: BTreeMap<String, usize>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `word` at `position` within `location`,
    /// raising the location's token count if this position extends it.
    pub fn add_entry(&mut self, word: &str, location: &str, position: usize) {
        self.index
            .entry(word.to_string())
            .or_default()
            .entry(location.to_string())
            .or_default()
            .insert(position);
        self.add_count(location, position);
    }

    /// Records every word of a document in order, positions starting at 1.
    pub fn add_all(&mut self, words: &[String], location: &str) {
        for (i, word) in words.iter().enumerate() {
            self.add_entry(word, location, i + 1);
        }
    }

    fn add_count(&mut self, location: &str, count: usize) {
        let current = self.counts.get(location).copied().unwrap_or(0);
        if count > current {
            self.counts.insert(location.to_string(), count);
        }
    }

    /// Merges another index into this one. Postings are unioned per
    /// (word, location); counts are summed, not maxed, because merge combines
    /// disjoint partial builds whose counts are each already a maximum.
    pub fn merge(&mut self, other: InvertedIndex) {
        for (word, locations) in other.index {
            match self.index.get_mut(&word) {
                None => {
                    self.index.insert(word, locations);
                }
                Some(existing) => {
                    for (location, positions) in locations {
                        match existing.get_mut(&location) {
                            None => {
                                existing.insert(location, positions);
                            }
                            Some(overlap) => {
                                overlap.extend(positions);
                            }
                        }
                    }
                }
            }
        }
        for (location, count) in other.counts {
            *self.counts.entry(location).or_insert(0) += count;
        }
    }

    /// Snapshot of every word in the index, in sorted order.
    pub fn words(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }

    /// Snapshot of the locations containing `word`, in sorted order.
    pub fn locations(&self, word: &str) -> Vec<String> {
        self.index
            .get(word)
            .map(|locations| locations.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Snapshot of the positions of `word` within `location`, ascending.
    pub fn positions(&self, word: &str, location: &str) -> Vec<usize> {
        self.index
            .get(word)
            .and_then(|locations| locations.get(location))
            .map(|positions| positions.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Snapshot of the per-location token counts.
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.counts.clone()
    }

    /// Token count for one location, if any tokens were recorded there.
    pub fn count(&self, location: &str) -> Option<usize> {
        self.counts.get(location).copied()
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.index
            .get(word)
            .is_some_and(|locations| locations.contains_key(location))
    }

    pub fn contains_position(&self, word: &str, location: &str, position: usize) -> bool {
        self.index
            .get(word)
            .and_then(|locations| locations.get(location))
            .is_some_and(|positions| positions.contains(&position))
    }

    pub fn num_words(&self) -> usize {
        self.index.len()
    }

    pub fn num_locations(&self, word: &str) -> usize {
        self.index.get(word).map_or(0, |locations| locations.len())
    }

    pub fn num_positions(&self, word: &str, location: &str) -> usize {
        self.index
            .get(word)
            .and_then(|locations| locations.get(location))
            .map_or(0, |positions| positions.len())
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Writes the counts map as pretty JSON to the given writer.
    pub fn write_counts<W: Write>(&self, writer: W) -> Result<()> {
        persist::write_counts(&self.counts, writer)
    }

    /// Writes the full index as pretty JSON to the given writer.
    pub fn write_index<W: Write>(&self, writer: W) -> Result<()> {
        persist::write_index(&self.index, writer)
    }

    pub fn save_counts(&self, path: &Path) -> Result<()> {
        persist::save(path, |writer| self.write_counts(writer))
    }

    pub fn save_index(&self, path: &Path) -> Result<()> {
        persist::save(path, |writer| self.write_index(writer))
    }

    /// Runs an exact or partial search for the given query stems.
    pub fn search(&self, queries: &BTreeSet<String>, partial: bool) -> Vec<SearchResult> {
        if partial {
            self.partial_search(queries)
        } else {
            self.exact_search(queries)
        }
    }

    /// Finds results for queries matched by exact word equality.
    pub fn exact_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut results = Vec::new();
        let mut lookup = HashMap::new();
        for query in queries {
            self.collect_matches(query, &mut results, &mut lookup);
        }
        results.sort();
        results
    }

    /// Finds results for queries matched by word prefix, using a range scan
    /// over the sorted word keys rather than a full scan.
    pub fn partial_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut results = Vec::new();
        let mut lookup = HashMap::new();
        for query in queries {
            let tail = self
                .index
                .range::<str, _>((Bound::Included(query.as_str()), Bound::Unbounded));
            for (word, _) in tail.take_while(|(word, _)| word.starts_with(query.as_str())) {
                self.collect_matches(word, &mut results, &mut lookup);
            }
        }
        results.sort();
        results
    }

    /// Accumulates the postings of one matched word into per-location results.
    /// `lookup` maps a location to its slot in `results` so that a location
    /// matched by several query words accumulates a cumulative count.
    fn collect_matches(
        &self,
        word: &str,
        results: &mut Vec<SearchResult>,
        lookup: &mut HashMap<String, usize>,
    ) {
        let Some(locations) = self.index.get(word) else {
            return;
        };
        for (location, positions) in locations {
            let slot = *lookup.entry(location.clone()).or_insert_with(|| {
                results.push(SearchResult::new(location.clone()));
                results.len() - 1
            });
            let total = self.counts.get(location).copied().unwrap_or(0);
            results[slot].update(positions.len(), total);
        }
    }
}

/// One ranked search result: how many query matches a location holds and what
/// fraction of its tokens they represent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub count: usize,
    #[serde(serialize_with = "serialize_score")]
    pub score: f64,
    #[serde(rename = "where")]
    pub location: String,
}

impl SearchResult {
    fn new(location: String) -> Self {
        SearchResult {
            count: 0,
            score: 0.0,
            location,
        }
    }

    /// Adds matches for this location and recomputes the score against the
    /// location's total token count.
    fn update(&mut self, matches: usize, total: usize) {
        self.count += matches;
        if total > 0 {
            self.score = self.count as f64 / total as f64;
        }
    }
}

fn serialize_score<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{score:.8}"))
}

impl Eq for SearchResult {}

impl Ord for SearchResult {
    /// Descending score, then descending count, then ascending
    /// case-insensitive location.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .partial_cmp(&self.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.count.cmp(&self.count))
            .then_with(|| {
                self.location
                    .to_lowercase()
                    .cmp(&other.location.to_lowercase())
            })
    }
}

impl PartialOrd for SearchResult {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
