use sift_core::{InvertedIndex, ThreadedIndex, WorkQueue};
use sift_indexer::{build, build_threaded, is_text_file, process_file};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn sample_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("one.txt"), "Cats and dogs.\nMore cats!").unwrap();
    fs::write(dir.path().join("two.TEXT"), "birds").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested/three.txt"), "dogs dogs dogs").unwrap();
    fs::write(dir.path().join("readme.md"), "cats should not appear").unwrap();
    dir
}

#[test]
fn text_extension_check_is_case_insensitive() {
    assert!(is_text_file(Path::new("a.txt")));
    assert!(is_text_file(Path::new("a.TXT")));
    assert!(is_text_file(Path::new("b.text")));
    assert!(is_text_file(Path::new("b.Text")));
    assert!(!is_text_file(Path::new("c.md")));
    assert!(!is_text_file(Path::new("no_extension")));
}

#[test]
fn positions_continue_across_lines() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("doc.txt");
    fs::write(&file, "cat dog\nbird").unwrap();

    let mut index = InvertedIndex::new();
    process_file(&file, &mut index).unwrap();

    let location = file.to_string_lossy().into_owned();
    assert_eq!(index.positions("cat", &location), vec![1]);
    assert_eq!(index.positions("dog", &location), vec![2]);
    assert_eq!(index.positions("bird", &location), vec![3]);
    assert_eq!(index.count(&location), Some(3));
}

#[test]
fn build_indexes_only_text_files() {
    let dir = sample_tree();
    let mut index = InvertedIndex::new();
    build(dir.path(), &mut index).unwrap();

    // one.txt, two.TEXT, nested/three.txt -- but not readme.md
    assert_eq!(index.counts().len(), 3);
    assert_eq!(index.num_locations("cat"), 1);
    assert_eq!(index.num_locations("dog"), 2);
    let nested = dir.path().join("nested/three.txt");
    assert_eq!(
        index.positions("dog", &nested.to_string_lossy()),
        vec![1, 2, 3]
    );
}

#[test]
fn build_on_single_file_skips_extension_check() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.md");
    fs::write(&file, "cat").unwrap();

    let mut index = InvertedIndex::new();
    build(&file, &mut index).unwrap();
    assert!(index.contains_word("cat"));
}

#[test]
fn words_are_stemmed_during_build() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("doc.txt"), "running cats").unwrap();

    let mut index = InvertedIndex::new();
    build(dir.path(), &mut index).unwrap();
    assert!(index.contains_word("run"));
    assert!(index.contains_word("cat"));
    assert!(!index.contains_word("running"));
}

#[test]
fn threaded_build_matches_sequential_build() {
    let dir = sample_tree();

    let mut sequential = InvertedIndex::new();
    build(dir.path(), &mut sequential).unwrap();

    let queue = WorkQueue::with_threads(4);
    let threaded = Arc::new(ThreadedIndex::new());
    build_threaded(dir.path(), &threaded, &queue).unwrap();
    queue.join();

    assert_eq!(threaded.words(), sequential.words());
    assert_eq!(threaded.counts(), sequential.counts());
    for word in sequential.words() {
        for location in sequential.locations(&word) {
            assert_eq!(
                threaded.positions(&word, &location),
                sequential.positions(&word, &location)
            );
        }
    }
}
