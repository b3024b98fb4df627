//! Builds an inverted index from a directory tree of plain-text files.
//!
//! Each `.txt` or `.text` file becomes one location keyed by its path; every
//! other file is skipped. The threaded build hands one task per file to a
//! shared work queue and merges per-file indexes into the shared one.

use anyhow::Result;
use sift_core::{InvertedIndex, ThreadedIndex, WorkQueue};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Whether a path looks like a plain-text file, by extension,
/// case-insensitively.
pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            ext == "txt" || ext == "text"
        })
}

/// Stems one file into the index, positions numbered from 1 and continuing
/// across lines. The location key is the path as given.
pub fn process_file(path: &Path, index: &mut InvertedIndex) -> Result<()> {
    let location = path.to_string_lossy().into_owned();
    let reader = BufReader::new(File::open(path)?);
    let mut position = 1;
    for line in reader.lines() {
        for word in sift_core::tokenizer::parse(&line?) {
            index.add_entry(&sift_core::tokenizer::stem(&word), &location, position);
            position += 1;
        }
    }
    Ok(())
}

/// The text files under `path`, in walk order. A file path is returned as
/// itself; a directory is walked recursively.
fn text_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }
    WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && is_text_file(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// Builds the index from a file or directory tree, one file at a time.
/// Unreadable files are logged and skipped rather than aborting the build.
pub fn build(path: &Path, index: &mut InvertedIndex) -> Result<()> {
    for file in text_files(path) {
        if let Err(error) = process_file(&file, index) {
            tracing::warn!(file = %file.display(), %error, "skipping unreadable file");
        }
    }
    Ok(())
}

/// Builds the index concurrently: one queue task per file, each stemming into
/// a private index that is merged into the shared one when the file is done.
/// Blocks until every file task has finished.
pub fn build_threaded(path: &Path, index: &Arc<ThreadedIndex>, queue: &WorkQueue) -> Result<()> {
    for file in text_files(path) {
        let index = Arc::clone(index);
        queue.execute(move || {
            let mut local = InvertedIndex::new();
            match process_file(&file, &mut local) {
                Ok(()) => index.merge(local),
                Err(error) => {
                    tracing::warn!(file = %file.display(), %error, "skipping unreadable file");
                }
            }
        });
    }
    queue.finish();
    Ok(())
}
