//! Read-only renderings of a document.
//!
//! # Responsibility
//! - Serialize documents to sanitized HTML.
//! - Derive plain text, emptiness and excerpts.

pub mod html;
pub mod plain;

pub use html::{escape_html, sanitize_url, to_html};
pub use plain::{is_content_empty, plain_text, preview_text};
