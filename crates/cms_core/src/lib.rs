//! Core of the mini CMS article editor.
//!
//! Owns the rich-text document model, its editing engines, the HTML
//! serializer and local article storage. Hosts (FFI, CLI) only wire I/O.

pub mod db;
pub mod editor;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;

pub use editor::{BlockFormat, ContainerKind, Editor, HistoryConfig, Operation, Position, Selection};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::article::{Article, ArticleId, ArticleStatus, ArticleValidationError};
pub use model::document::{
    validate, Align, Block, BlockKind, Document, Link, ListKind, Mark, Marks, Node, Text,
};
pub use render::{escape_html, is_content_empty, plain_text, preview_text, sanitize_url, to_html};
pub use repo::article_repo::{
    ArticleListQuery, ArticleRepository, RepoError, RepoResult, SqliteArticleRepository,
};
pub use service::article_form::{
    check_publish, ArticleForm, ArticleSeed, ArticleSubmission, SubmitError,
};
pub use service::article_service::{
    ArticleListItem, ArticleService, ArticleServiceError, ArticlesListResult,
};

/// Health-check entry point for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Version of the core crate.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
