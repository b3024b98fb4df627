use crate::index::{InvertedIndex, SearchResult};
use crate::lock::MultiReaderLock;
use anyhow::Result;
use std::cell::UnsafeCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;

/// Thread-safe decorator over [`InvertedIndex`]: every view, search, and
/// export runs under the read lock, every mutator under the write lock, so
/// the semantics under concurrency are exactly those of the wrapped index.
///
/// Safety invariant: `inner` is only dereferenced while the corresponding
/// guard from `lock` is held (shared for reads, exclusive for writes), and
/// no reference outlives its guard.
pub struct ThreadedIndex {
    lock: MultiReaderLock,
    inner: UnsafeCell<InvertedIndex>,
}

unsafe impl Sync for ThreadedIndex {}
unsafe impl Send for ThreadedIndex {}

impl ThreadedIndex {
    pub fn new() -> Self {
        ThreadedIndex {
            lock: MultiReaderLock::new(),
            inner: UnsafeCell::new(InvertedIndex::new()),
        }
    }

    fn read<T>(&self, view: impl FnOnce(&InvertedIndex) -> T) -> T {
        let _guard = self.lock.read();
        view(unsafe { &*self.inner.get() })
    }

    fn write<T>(&self, mutate: impl FnOnce(&mut InvertedIndex) -> T) -> T {
        let _guard = self.lock.write();
        mutate(unsafe { &mut *self.inner.get() })
    }

    pub fn add_entry(&self, word: &str, location: &str, position: usize) {
        self.write(|index| index.add_entry(word, location, position));
    }

    pub fn add_all(&self, words: &[String], location: &str) {
        self.write(|index| index.add_all(words, location));
    }

    pub fn merge(&self, other: InvertedIndex) {
        self.write(|index| index.merge(other));
    }

    pub fn words(&self) -> Vec<String> {
        self.read(|index| index.words())
    }

    pub fn locations(&self, word: &str) -> Vec<String> {
        self.read(|index| index.locations(word))
    }

    pub fn positions(&self, word: &str, location: &str) -> Vec<usize> {
        self.read(|index| index.positions(word, location))
    }

    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.read(|index| index.counts())
    }

    pub fn count(&self, location: &str) -> Option<usize> {
        self.read(|index| index.count(location))
    }

    pub fn contains_word(&self, word: &str) -> bool {
        self.read(|index| index.contains_word(word))
    }

    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.read(|index| index.contains_location(word, location))
    }

    pub fn contains_position(&self, word: &str, location: &str, position: usize) -> bool {
        self.read(|index| index.contains_position(word, location, position))
    }

    pub fn num_words(&self) -> usize {
        self.read(|index| index.num_words())
    }

    pub fn num_locations(&self, word: &str) -> usize {
        self.read(|index| index.num_locations(word))
    }

    pub fn num_positions(&self, word: &str, location: &str) -> usize {
        self.read(|index| index.num_positions(word, location))
    }

    pub fn len(&self) -> usize {
        self.read(|index| index.len())
    }

    pub fn is_empty(&self) -> bool {
        self.read(|index| index.is_empty())
    }

    pub fn write_counts<W: Write>(&self, writer: W) -> Result<()> {
        self.read(|index| index.write_counts(writer))
    }

    pub fn write_index<W: Write>(&self, writer: W) -> Result<()> {
        self.read(|index| index.write_index(writer))
    }

    pub fn save_counts(&self, path: &Path) -> Result<()> {
        self.read(|index| index.save_counts(path))
    }

    pub fn save_index(&self, path: &Path) -> Result<()> {
        self.read(|index| index.save_index(path))
    }

    pub fn search(&self, queries: &BTreeSet<String>, partial: bool) -> Vec<SearchResult> {
        self.read(|index| index.search(queries, partial))
    }

    pub fn exact_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        self.read(|index| index.exact_search(queries))
    }

    pub fn partial_search(&self, queries: &BTreeSet<String>) -> Vec<SearchResult> {
        self.read(|index| index.partial_search(queries))
    }

    /// Consumes the wrapper, returning the inner index.
    pub fn into_inner(self) -> InvertedIndex {
        self.inner.into_inner()
    }
}

impl Default for ThreadedIndex {
    fn default() -> Self {
        Self::new()
    }
}
