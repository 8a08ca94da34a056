//! Section lookup and list-item splitting.
//!
//! Sections are found by a plain case-insensitive substring test against the
//! blank-line separated blocks of the document text. A header word that also
//! occurs inside an unrelated block will match that block if it comes first.

use serde::{Deserialize, Serialize};

use crate::model::PAGE_SEPARATOR;

/// Delimiters that separate list items inside a section body.
pub const ITEM_DELIMITERS: &[char] = &['•', '-', '*'];

/// Body of the section introduced by `header`.
///
/// The text is split on [`PAGE_SEPARATOR`]. The first block containing
/// `header` (ignoring case) is located; the following block is returned
/// trimmed, or the matched block itself when it is the last one.
pub fn section_text(full_text: &str, header: &str) -> Option<String> {
    let needle = header.to_lowercase();
    let blocks: Vec<&str> = full_text.split(PAGE_SEPARATOR).collect();

    let index = blocks
        .iter()
        .position(|block| block.to_lowercase().contains(&needle))?;

    let body = blocks.get(index + 1).unwrap_or(&blocks[index]);
    Some(body.trim().to_string())
}

/// Split a section body into trimmed, non-empty candidate items.
pub fn split_items(body: &str) -> Vec<&str> {
    body.split(ITEM_DELIMITERS)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Rules deciding which candidate items are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemFilter {
    /// Items starting with one of these words are dropped (compared lowercase)
    pub stoplist: Vec<String>,
    /// Items shorter than this many characters are dropped
    pub min_len: usize,
}

impl Default for ItemFilter {
    fn default() -> Self {
        Self {
            stoplist: vec!["see".into(), "refer".into(), "follow".into()],
            min_len: 4,
        }
    }
}

impl ItemFilter {
    /// Check if an item survives filtering.
    pub fn accepts(&self, item: &str) -> bool {
        let item = item.trim();
        if item.chars().count() < self.min_len {
            return false;
        }
        if is_bare_list_marker(item) {
            return false;
        }
        match item.split_whitespace().next() {
            Some(first) => !self.is_stopword(first),
            None => false,
        }
    }

    /// Check if any word of `text` is on the stoplist.
    pub fn mentions_stopword(&self, text: &str) -> bool {
        text.split_whitespace().any(|w| self.is_stopword(w))
    }

    /// Section items that survive filtering.
    pub fn filter<'a>(&self, body: &'a str) -> Vec<&'a str> {
        split_items(body)
            .into_iter()
            .filter(|item| self.accepts(item))
            .collect()
    }

    fn is_stopword(&self, word: &str) -> bool {
        let word = word
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        self.stoplist.iter().any(|s| s.to_lowercase() == word)
    }
}

/// A numbered-list marker with nothing after it, such as `12.` or `3)`.
fn is_bare_list_marker(item: &str) -> bool {
    let digits = item.trim_end_matches(['.', ')']);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
