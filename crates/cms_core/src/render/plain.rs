//! Plain-text views of a document.
//!
//! # Responsibility
//! - Provide the content-empty predicate shared by the publish gate and the
//!   list view.
//! - Provide short excerpts for list rows.

use crate::model::document::Document;
use once_cell::sync::Lazy;
use regex::Regex;

const PREVIEW_MAX_CHARS: usize = 100;

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex must compile"));

/// Concatenates every text leaf in document order.
pub fn plain_text(document: &Document) -> String {
    document.blocks().iter().map(|block| block.text()).collect()
}

/// Returns whether the trimmed plain text is empty.
pub fn is_content_empty(document: &Document) -> bool {
    plain_text(document).trim().is_empty()
}

/// Whitespace-collapsed excerpt of at most 100 chars, `None` for empty content.
///
/// Blocks are separated by a single space so adjacent paragraphs do not run
/// together.
pub fn preview_text(document: &Document) -> Option<String> {
    let joined = document
        .blocks()
        .iter()
        .map(|block| block.text())
        .collect::<Vec<_>>()
        .join(" ");
    let collapsed = WHITESPACE_RE.replace_all(joined.trim(), " ");
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed.chars().take(PREVIEW_MAX_CHARS).collect())
}
