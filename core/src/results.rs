use crate::index::{InvertedIndex, SearchResult};
use crate::persist;
use crate::queue::WorkQueue;
use crate::threaded::ThreadedIndex;
use crate::tokenizer;
use anyhow::Result;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;

/// Joins a query line's unique stems into the canonical cache key, or `None`
/// when nothing survives tokenization.
fn query_key(line: &str) -> Option<(std::collections::BTreeSet<String>, String)> {
    let words = tokenizer::unique_stems(line);
    if words.is_empty() {
        return None;
    }
    let key = words.iter().cloned().collect::<Vec<_>>().join(" ");
    Some((words, key))
}

/// Sequential query store: maps each normalized query line to its ranked
/// results, computing a search only for queries not seen before.
pub struct Results<'a> {
    results: BTreeMap<String, Vec<SearchResult>>,
    index: &'a InvertedIndex,
}

impl<'a> Results<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self {
        Results {
            results: BTreeMap::new(),
            index,
        }
    }

    /// Reads a query file line by line, searching each line.
    pub fn read_queries(&mut self, path: &Path, partial: bool) -> Result<()> {
        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            self.read_query_line(&line?, partial);
        }
        Ok(())
    }

    /// Searches a single query line unless its normalized form was already
    /// searched.
    pub fn read_query_line(&mut self, line: &str, partial: bool) {
        let Some((words, key)) = query_key(line) else {
            return;
        };
        if !self.results.contains_key(&key) {
            let found = self.index.search(&words, partial);
            self.results.insert(key, found);
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.results.keys().cloned().collect()
    }

    /// Ranked results for a query line, normalized before lookup.
    pub fn results(&self, query: &str) -> Vec<SearchResult> {
        match query_key(query) {
            Some((_, key)) => self.results.get(&key).cloned().unwrap_or_default(),
            None => Vec::new(),
        }
    }

    pub fn contains_query(&self, query: &str) -> bool {
        match query_key(query) {
            Some((_, key)) => self.results.contains_key(&key),
            None => false,
        }
    }

    pub fn num_queries(&self) -> usize {
        self.results.len()
    }

    pub fn num_results(&self, query: &str) -> usize {
        self.results(query).len()
    }

    pub fn write_results<W: Write>(&self, writer: W) -> Result<()> {
        persist::write_results(&self.results, writer)
    }

    pub fn save_results(&self, path: &Path) -> Result<()> {
        persist::save(path, |writer| self.write_results(writer))
    }
}

/// Concurrent query store with duplicate suppression. Each query line becomes
/// a task on the shared work queue; the cache maps the normalized key to
/// `None` while a search is in flight and to the ranked list once done, so at
/// most one search runs per distinct normalized query even when identical
/// lines arrive concurrently.
pub struct ThreadedResults {
    results: Mutex<BTreeMap<String, Option<Vec<SearchResult>>>>,
    index: Arc<ThreadedIndex>,
    queue: Arc<WorkQueue>,
}

impl ThreadedResults {
    pub fn new(index: Arc<ThreadedIndex>, queue: Arc<WorkQueue>) -> Self {
        ThreadedResults {
            results: Mutex::new(BTreeMap::new()),
            index,
            queue,
        }
    }

    /// Reads a query file line by line, submitting one search task per line,
    /// then blocks until all submitted searches have finished.
    pub fn read_queries(this: &Arc<Self>, path: &Path, partial: bool) -> Result<()> {
        let reader = BufReader::new(File::open(path)?);
        for line in reader.lines() {
            Self::read_query_line(this, &line?, partial);
        }
        this.queue.finish();
        Ok(())
    }

    /// Submits a search task for a single query line and returns immediately.
    pub fn read_query_line(this: &Arc<Self>, line: &str, partial: bool) {
        let me = Arc::clone(this);
        let line = line.to_string();
        this.queue.execute(move || me.run_query(&line, partial));
    }

    fn run_query(&self, line: &str, partial: bool) {
        let Some((words, key)) = query_key(line) else {
            return;
        };
        // Reserve the slot under the lock before searching so concurrent
        // identical queries find the placeholder and return; the unlocked
        // search result is written back under the lock.
        {
            let mut results = self.results.lock();
            if results.contains_key(&key) {
                return;
            }
            results.insert(key.clone(), None);
        }
        let found = self.index.search(&words, partial);
        self.results.lock().insert(key, Some(found));
    }

    pub fn queries(&self) -> Vec<String> {
        self.results.lock().keys().cloned().collect()
    }

    /// Ranked results for a query line, normalized before lookup. A query
    /// still in flight (or never submitted) yields an empty list.
    pub fn results(&self, query: &str) -> Vec<SearchResult> {
        match query_key(query) {
            Some((_, key)) => self
                .results
                .lock()
                .get(&key)
                .and_then(|entry| entry.clone())
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    pub fn contains_query(&self, query: &str) -> bool {
        match query_key(query) {
            Some((_, key)) => self.results.lock().contains_key(&key),
            None => false,
        }
    }

    pub fn num_queries(&self) -> usize {
        self.results.lock().len()
    }

    pub fn num_results(&self, query: &str) -> usize {
        self.results(query).len()
    }

    /// Writes completed entries; queries still in flight are skipped.
    pub fn write_results<W: Write>(&self, writer: W) -> Result<()> {
        let completed: BTreeMap<String, Vec<SearchResult>> = self
            .results
            .lock()
            .iter()
            .filter_map(|(key, entry)| entry.clone().map(|found| (key.clone(), found)))
            .collect();
        persist::write_results(&completed, writer)
    }

    pub fn save_results(&self, path: &Path) -> Result<()> {
        persist::save(path, |writer| self.write_results(writer))
    }
}
