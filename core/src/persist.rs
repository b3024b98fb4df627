//! JSON export seam. The index and results own ordered maps; these helpers
//! pretty-print them (two-space indent, lexicographic key order) in the
//! layout consumed by downstream tooling:
//!
//! - counts:  `{ location: count, ... }`
//! - index:   `{ word: { location: [positions...] }, ... }`
//! - results: `{ query: [ { "count": n, "score": "0.00000000", "where": location } ] }`

use crate::index::{Postings, SearchResult};
use anyhow::Result;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes the flat location -> count object.
pub fn write_counts<W: Write>(counts: &BTreeMap<String, usize>, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, counts)?;
    Ok(())
}

/// Writes the nested word -> location -> positions object.
pub fn write_index<W: Write>(index: &BTreeMap<String, Postings>, writer: W) -> Result<()> {
    serde_json::to_writer_pretty(writer, index)?;
    Ok(())
}

/// Writes the query -> ranked results object. Scores are formatted to eight
/// decimal places by the [`SearchResult`] serializer.
pub fn write_results<W: Write>(
    results: &BTreeMap<String, Vec<SearchResult>>,
    writer: W,
) -> Result<()> {
    serde_json::to_writer_pretty(writer, results)?;
    Ok(())
}

/// Creates the file at `path` and hands a buffered writer to `write`.
pub fn save<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    let mut writer = BufWriter::new(File::create(path)?);
    write(&mut writer)?;
    writer.flush()?;
    Ok(())
}
