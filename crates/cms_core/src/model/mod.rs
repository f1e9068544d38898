//! Domain model for article bodies and article records.
//!
//! # Responsibility
//! - Define the document tree and its validity contract.
//! - Define the article record exchanged with storage.
//!
//! # Invariants
//! - No editing logic lives here; mutation belongs to `crate::editor`.

pub mod article;
pub mod document;
