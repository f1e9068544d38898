//! Load/save boundary between an editing session and article storage.
//!
//! # Responsibility
//! - Seed an editing session from stored article fields.
//! - Gate draft and publish submissions and hand an owned snapshot to the
//!   caller's save callback.
//!
//! # Invariants
//! - A rejected submission never invokes the callback.
//! - A submission captures title, document and HTML as they were when the
//!   save was requested; later edits do not leak into it.
//! - Drafts need a title; publishing also needs non-empty content.

use crate::editor::history::HistoryConfig;
use crate::editor::session::Editor;
use crate::model::article::{Article, ArticleId, ArticleStatus};
use crate::model::document::Document;
use crate::render::html::to_html;
use crate::render::plain::is_content_empty;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fields supplied by the host when an article is opened for editing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleSeed {
    /// `None` for a new article.
    pub id: Option<ArticleId>,
    pub title: String,
    pub summary: String,
    pub image: Option<String>,
    pub status: ArticleStatus,
    pub tags: Vec<String>,
    /// Raw document JSON; absent or invalid input opens the default document.
    pub document: Option<serde_json::Value>,
}

impl ArticleSeed {
    pub fn from_article(article: &Article) -> Self {
        Self {
            id: Some(article.id),
            title: article.title.clone(),
            summary: article.summary.clone(),
            image: article.image.clone(),
            status: article.status,
            tags: article.tags.clone(),
            document: serde_json::to_value(&article.document).ok(),
        }
    }
}

/// Owned snapshot handed to the save callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSubmission {
    pub id: Option<ArticleId>,
    /// Trimmed title.
    pub title: String,
    pub summary: String,
    pub image: Option<String>,
    pub status: ArticleStatus,
    pub tags: Vec<String>,
    pub document: Document,
    pub html: String,
}

/// Local validation failure of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    TitleRequired,
    ContentRequired,
}

impl SubmitError {
    /// Message shown next to the form.
    pub fn user_message(self) -> &'static str {
        match self {
            Self::TitleRequired => "Enter the article title.",
            Self::ContentRequired => "The article text must not be empty to publish.",
        }
    }

    fn code(self) -> &'static str {
        match self {
            Self::TitleRequired => "title_required",
            Self::ContentRequired => "content_required",
        }
    }
}

impl Display for SubmitError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl Error for SubmitError {}

/// Publish gate: trimmed title and plain-text content must both be non-empty.
pub fn check_publish(title: &str, document: &Document) -> Result<(), SubmitError> {
    if title.trim().is_empty() {
        return Err(SubmitError::TitleRequired);
    }
    if is_content_empty(document) {
        return Err(SubmitError::ContentRequired);
    }
    Ok(())
}

/// Editing form state for one article.
pub struct ArticleForm {
    id: Option<ArticleId>,
    title: String,
    summary: String,
    image: Option<String>,
    status: ArticleStatus,
    tags: Vec<String>,
    editor: Editor,
    preview: Option<(u64, String)>,
    last_error: Option<SubmitError>,
}

impl ArticleForm {
    /// Opens `seed` for editing.
    pub fn load(seed: ArticleSeed, config: HistoryConfig) -> Self {
        let document = Document::load_or_default(seed.document);
        info!(
            "event=article_form_load module=service status=ok is_new={} blocks={}",
            seed.id.is_none(),
            document.blocks().len()
        );
        Self {
            id: seed.id,
            title: seed.title,
            summary: seed.summary,
            image: seed.image,
            status: seed.status,
            tags: seed.tags,
            editor: Editor::new(document, config),
            preview: None,
            last_error: None,
        }
    }

    pub fn id(&self) -> Option<ArticleId> {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn status(&self) -> ArticleStatus {
        self.status
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = summary.into();
    }

    pub fn set_image(&mut self, image: Option<String>) {
        self.image = image;
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    /// Records the id assigned by storage after the first save.
    pub fn set_id(&mut self, id: ArticleId) {
        self.id = Some(id);
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    /// Error of the last rejected submission, cleared by a successful one.
    pub fn last_error(&self) -> Option<SubmitError> {
        self.last_error
    }

    /// HTML preview, recomputed only when the document revision moved.
    pub fn preview_html(&mut self) -> &str {
        let revision = self.editor.revision();
        let stale = !matches!(&self.preview, Some((cached, _)) if *cached == revision);
        if stale {
            self.preview = Some((revision, self.editor.to_html()));
        }
        self.preview.as_ref().map_or("", |(_, html)| html.as_str())
    }

    pub fn can_publish(&self) -> bool {
        check_publish(&self.title, self.editor.document()).is_ok()
    }

    /// Saves a draft. Only the title is required.
    pub fn save_draft<R>(
        &mut self,
        on_save: impl FnOnce(ArticleSubmission) -> R,
    ) -> Result<R, SubmitError> {
        let gate = if self.title.trim().is_empty() {
            Err(SubmitError::TitleRequired)
        } else {
            Ok(())
        };
        self.submit(ArticleStatus::Draft, gate, on_save)
    }

    /// Publishes. Title and content are both required.
    pub fn publish<R>(
        &mut self,
        on_save: impl FnOnce(ArticleSubmission) -> R,
    ) -> Result<R, SubmitError> {
        let gate = check_publish(&self.title, self.editor.document());
        self.submit(ArticleStatus::Published, gate, on_save)
    }

    fn submit<R>(
        &mut self,
        status: ArticleStatus,
        gate: Result<(), SubmitError>,
        on_save: impl FnOnce(ArticleSubmission) -> R,
    ) -> Result<R, SubmitError> {
        if let Err(err) = gate {
            warn!(
                "event=article_submit module=service status=rejected target={} error_code={}",
                status.as_str(),
                err.code()
            );
            self.last_error = Some(err);
            return Err(err);
        }

        self.last_error = None;
        self.status = status;
        let document = self.editor.document().clone();
        let submission = ArticleSubmission {
            id: self.id,
            title: self.title.trim().to_string(),
            summary: self.summary.clone(),
            image: self.image.clone(),
            status,
            tags: self.tags.clone(),
            html: to_html(&document),
            document,
        };
        info!(
            "event=article_submit module=service status=ok target={} is_new={}",
            status.as_str(),
            submission.id.is_none()
        );
        Ok(on_save(submission))
    }
}
