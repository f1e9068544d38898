//! Article use-cases above the editor and the repository.
//!
//! # Responsibility
//! - Own the load/save boundary of an editing session.
//! - Orchestrate repository calls for stored articles.

pub mod article_form;
pub mod article_service;
