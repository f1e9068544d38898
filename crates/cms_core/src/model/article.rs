//! Article record.
//!
//! # Responsibility
//! - Define the persisted article shape that wraps a document body.
//! - Validate record-level invariants before persistence.
//!
//! # Invariants
//! - `id` is stable and never nil.
//! - `title` is trimmed and non-empty.
//! - A published article has non-empty plain-text content.
//! - `html` is the serializer output for `document` at save time.

use crate::model::document::Document;
use crate::render::plain::is_content_empty;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of an article.
pub type ArticleId = Uuid;

/// Publication state of an article.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
}

impl ArticleStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            _ => None,
        }
    }
}

/// Validation errors for article records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleValidationError {
    NilId,
    EmptyTitle,
    /// Published articles must carry body text.
    EmptyPublishedContent,
}

impl Display for ArticleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "article id must not be nil"),
            Self::EmptyTitle => write!(f, "article title must not be empty"),
            Self::EmptyPublishedContent => {
                write!(f, "published article content must not be empty")
            }
        }
    }
}

impl Error for ArticleValidationError {}

/// Canonical article record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub summary: String,
    /// Cover image reference (data URL or path), owned by the host.
    pub image: Option<String>,
    pub status: ArticleStatus,
    /// Opaque tag ids, normalized and deduplicated.
    pub tags: Vec<String>,
    pub document: Document,
    pub html: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

impl Article {
    /// Creates a draft with a generated id and the default document.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into().trim().to_string(),
            summary: String::new(),
            image: None,
            status: ArticleStatus::Draft,
            tags: Vec::new(),
            document: Document::new(),
            html: String::new(),
            created_at: 0,
            updated_at: 0,
        }
    }

    /// Checks record invariants.
    pub fn validate(&self) -> Result<(), ArticleValidationError> {
        if self.id.is_nil() {
            return Err(ArticleValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(ArticleValidationError::EmptyTitle);
        }
        if self.status == ArticleStatus::Published && is_content_empty(&self.document) {
            return Err(ArticleValidationError::EmptyPublishedContent);
        }
        Ok(())
    }

    /// Returns whether this article could be published as-is.
    pub fn can_publish(&self) -> bool {
        !self.title.trim().is_empty() && !is_content_empty(&self.document)
    }
}
