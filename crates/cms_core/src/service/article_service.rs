//! Article use-case service.
//!
//! # Responsibility
//! - Turn form submissions into stored articles.
//! - Offer list rows with publishability and excerpts for the article list.
//!
//! # Invariants
//! - `save` creates when the submission has no id and fully replaces
//!   otherwise; `created_at` survives updates.
//! - Every write is followed by a read-back, so callers see stored state.

use crate::model::article::{Article, ArticleId, ArticleStatus, ArticleValidationError};
use crate::render::plain::preview_text;
use crate::repo::article_repo::{
    normalize_article_limit, normalize_tags, ArticleListQuery, ArticleRepository, RepoError,
    RepoResult,
};
use crate::service::article_form::ArticleSubmission;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for article use-cases.
#[derive(Debug)]
pub enum ArticleServiceError {
    /// Record-level validation failed before storage.
    Validation(ArticleValidationError),
    ArticleNotFound(ArticleId),
    Repo(RepoError),
    /// Write succeeded but the read-back did not find the row.
    InconsistentState(&'static str),
}

impl Display for ArticleServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ArticleNotFound(id) => write!(f, "article not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent article state: {details}"),
        }
    }
}

impl Error for ArticleServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ArticleServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ArticleNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Article list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleListItem {
    pub id: ArticleId,
    pub title: String,
    pub summary: String,
    pub image: Option<String>,
    pub status: ArticleStatus,
    pub tags: Vec<String>,
    /// Whitespace-collapsed body excerpt.
    pub preview: Option<String>,
    /// Whether title and content would pass the publish gate.
    pub can_publish: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&Article> for ArticleListItem {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id,
            title: article.title.clone(),
            summary: article.summary.clone(),
            image: article.image.clone(),
            status: article.status,
            tags: article.tags.clone(),
            preview: preview_text(&article.document),
            can_publish: article.can_publish(),
            created_at: article.created_at,
            updated_at: article.updated_at,
        }
    }
}

/// List result envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlesListResult {
    /// Rows sorted by `created_at DESC, uuid ASC`.
    pub items: Vec<ArticleListItem>,
    /// Effective limit after normalization.
    pub applied_limit: u32,
}

/// Article service facade over a repository implementation.
pub struct ArticleService<R: ArticleRepository> {
    repo: R,
}

impl<R: ArticleRepository> ArticleService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Stores a submission, creating or replacing the article.
    pub fn save(&mut self, submission: ArticleSubmission) -> Result<Article, ArticleServiceError> {
        let is_new = submission.id.is_none();
        let id = match submission.id {
            None => {
                let mut article = Article::new(submission.title.as_str());
                apply_submission(&mut article, submission);
                self.repo.create_article(&article)?
            }
            Some(id) => {
                let mut article = self
                    .repo
                    .get_article(id)?
                    .ok_or(ArticleServiceError::ArticleNotFound(id))?;
                apply_submission(&mut article, submission);
                self.repo.update_article_full(&article)?;
                id
            }
        };

        let stored = self
            .repo
            .get_article(id)?
            .ok_or(ArticleServiceError::InconsistentState(
                "saved article not found in read-back",
            ))?;
        info!(
            "event=article_save module=service status=ok article_id={} is_new={} article_status={}",
            stored.id,
            is_new,
            stored.status.as_str()
        );
        Ok(stored)
    }

    pub fn get(&self, id: ArticleId) -> RepoResult<Option<Article>> {
        self.repo.get_article(id)
    }

    /// Lists article rows with optional status filter and pagination.
    pub fn list(
        &self,
        status: Option<ArticleStatus>,
        limit: Option<u32>,
        offset: u32,
    ) -> Result<ArticlesListResult, ArticleServiceError> {
        let applied_limit = normalize_article_limit(limit);
        let query = ArticleListQuery {
            status,
            limit: Some(applied_limit),
            offset,
        };
        let items = self
            .repo
            .list_articles(&query)?
            .iter()
            .map(ArticleListItem::from)
            .collect();
        Ok(ArticlesListResult {
            items,
            applied_limit,
        })
    }

    /// Replaces the tag set of one article.
    pub fn set_tags(
        &mut self,
        id: ArticleId,
        tags: Vec<String>,
    ) -> Result<Article, ArticleServiceError> {
        self.repo.replace_tags(id, &normalize_tags(&tags))?;
        self.repo
            .get_article(id)?
            .ok_or(ArticleServiceError::InconsistentState(
                "article missing after tag replacement",
            ))
    }

    pub fn delete(&mut self, id: ArticleId) -> Result<(), ArticleServiceError> {
        self.repo.delete_article(id)?;
        info!(
            "event=article_delete module=service status=ok article_id={}",
            id
        );
        Ok(())
    }
}

fn apply_submission(article: &mut Article, submission: ArticleSubmission) {
    article.title = submission.title.trim().to_string();
    article.summary = submission.summary.trim().to_string();
    article.image = submission.image;
    article.status = submission.status;
    article.tags = normalize_tags(&submission.tags);
    article.document = submission.document;
    article.html = submission.html;
}
