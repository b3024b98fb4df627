//! Strips HTML down to indexable plain text with the same regexes the link
//! extractor leaves behind: block elements whose content is never prose go
//! first, then remaining tags, then entities.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref BLOCK_ELEMENTS: Regex = Regex::new(
        r"(?is)<!--.*?-->|<head.*?>.*?</head\s*>|<style.*?>.*?</style\s*>|<script.*?>.*?</script\s*>|<noscript.*?>.*?</noscript\s*>|<svg.*?>.*?</svg\s*>"
    )
    .unwrap();
    static ref TAGS: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref ENTITIES: Regex = Regex::new(r"&[^\s;]*?;").unwrap();
}

/// Removes comments plus head, style, script, noscript, and svg elements,
/// including their contents.
pub fn strip_block_elements(html: &str) -> String {
    BLOCK_ELEMENTS.replace_all(html, " ").into_owned()
}

/// Removes every remaining tag, leaving the text between them.
pub fn strip_tags(html: &str) -> String {
    TAGS.replace_all(html, " ").into_owned()
}

/// Removes character entities like `&amp;` and `&#39;`.
pub fn strip_entities(html: &str) -> String {
    ENTITIES.replace_all(html, " ").into_owned()
}

/// Reduces a full HTML page to plain text.
pub fn strip_to_text(html: &str) -> String {
    strip_entities(&strip_tags(&strip_block_elements(html)))
}
