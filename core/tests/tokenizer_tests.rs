use sift_core::tokenizer::{parse, stems, unique_stems};

#[test]
fn it_normalizes_and_stems() {
    let words = stems("Running Runners RUN! The café's menu.");
    assert!(words.contains(&"run".to_string()));
    // Unicode normalization: café -> cafe
    assert!(words.contains(&"cafe".to_string()));
}

#[test]
fn parse_strips_non_alphabetic() {
    let words = parse("hello, world! 42 ok");
    assert_eq!(words, vec!["hello", "world", "ok"]);
}

#[test]
fn query_normalization_is_order_and_case_insensitive() {
    let a = unique_stems("Dog CAT");
    let b = unique_stems("cats dogs");
    assert_eq!(a, b);
}

#[test]
fn empty_line_yields_no_stems() {
    assert!(unique_stems("  \t 123 !?! ").is_empty());
}
