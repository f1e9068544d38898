//! Persistence contracts for articles.
//!
//! # Responsibility
//! - Define the article data access trait.
//! - Keep SQL inside the repository boundary.
//!
//! # Invariants
//! - Writes run `Article::validate()` before touching storage.
//! - Missing rows surface as `RepoError::NotFound`, not as transport errors.

pub mod article_repo;
