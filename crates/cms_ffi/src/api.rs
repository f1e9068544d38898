//! FFI use-case API for the Flutter host.
//!
//! # Responsibility
//! - Expose article rendering and storage use-cases to Dart via FRB.
//! - Translate core errors into flat response envelopes.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Document payloads cross the boundary as JSON strings.

use cms_core::db::open_db;
use cms_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, is_content_empty,
    ping as ping_inner, to_html, validate, Article, ArticleForm, ArticleListItem, ArticleSeed,
    ArticleService, ArticleStatus, Document, HistoryConfig, SqliteArticleRepository,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const ARTICLE_DB_FILE_NAME: &str = "mini_cms_articles.sqlite3";
static ARTICLE_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Health check.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// # FFI contract
/// - `level`: `trace|debug|info|warn|error`, case-insensitive.
/// - `log_dir`: absolute directory for rolling log files.
/// - Returns an empty string on success, the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Renders document JSON to HTML. Invalid input renders the default document.
#[flutter_rust_bridge::frb(sync)]
pub fn render_document_html(document_json: String) -> String {
    to_html(&decode_document(&document_json))
}

/// Content-empty check used by list rows and the publish button.
#[flutter_rust_bridge::frb(sync)]
pub fn document_content_empty(document_json: String) -> bool {
    is_content_empty(&decode_document(&document_json))
}

/// Strict structural check; no repair or fallback is applied.
#[flutter_rust_bridge::frb(sync)]
pub fn document_is_valid(document_json: String) -> bool {
    serde_json::from_str::<Document>(&document_json)
        .map(|document| validate(&document))
        .unwrap_or(false)
}

/// Input of `article_save`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSaveRequest {
    /// Existing article id; `None` or empty creates a new article.
    pub article_id: Option<String>,
    pub title: String,
    pub summary: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub document_json: String,
    /// `true` publishes, `false` saves a draft.
    pub publish: bool,
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleActionResponse {
    pub ok: bool,
    pub article_id: Option<String>,
    /// Human-readable message for the UI.
    pub message: String,
}

impl ArticleActionResponse {
    fn success(message: impl Into<String>, article_id: String) -> Self {
        Self {
            ok: true,
            article_id: Some(article_id),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            article_id: None,
            message: message.into(),
        }
    }
}

/// Article row for list screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleListEntry {
    pub article_id: String,
    pub title: String,
    pub summary: String,
    pub image: Option<String>,
    /// `draft|published`.
    pub status: String,
    pub tags: Vec<String>,
    pub preview: Option<String>,
    pub can_publish: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleListResponse {
    pub ok: bool,
    pub items: Vec<ArticleListEntry>,
    pub applied_limit: u32,
    pub message: String,
}

/// Full article for the edit screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDetail {
    pub article_id: String,
    pub title: String,
    pub summary: String,
    pub image: Option<String>,
    pub status: String,
    pub tags: Vec<String>,
    pub document_json: String,
    pub html: String,
}

/// Saves a draft or publishes through the form gate.
///
/// # FFI contract
/// - Gate failures return `ok=false` with the user-facing message and do not
///   touch storage.
#[flutter_rust_bridge::frb(sync)]
pub fn article_save(request: ArticleSaveRequest) -> ArticleActionResponse {
    let article_id = match parse_optional_id(request.article_id.as_deref()) {
        Ok(id) => id,
        Err(message) => return ArticleActionResponse::failure(message),
    };
    let seed = ArticleSeed {
        id: article_id,
        title: request.title,
        summary: request.summary,
        image: request.image,
        status: ArticleStatus::Draft,
        tags: request.tags,
        document: serde_json::from_str(&request.document_json).ok(),
    };
    let mut form = ArticleForm::load(seed, HistoryConfig::default());
    let gate = if request.publish {
        form.publish(|submission| submission)
    } else {
        form.save_draft(|submission| submission)
    };
    let submission = match gate {
        Ok(submission) => submission,
        Err(err) => return ArticleActionResponse::failure(err.user_message()),
    };

    match with_article_service(|service| service.save(submission).map_err(|err| err.to_string()))
    {
        Ok(article) => {
            let message = match article.status {
                ArticleStatus::Draft => "Draft saved.",
                ArticleStatus::Published => "Article published.",
            };
            ArticleActionResponse::success(message, article.id.to_string())
        }
        Err(err) => ArticleActionResponse::failure(format!("article_save failed: {err}")),
    }
}

/// Lists articles newest first.
///
/// # FFI contract
/// - `status`: `draft|published` or `None` for all; unknown values fail.
/// - Limit defaults to 20 and clamps to 100.
#[flutter_rust_bridge::frb(sync)]
pub fn article_list(
    status: Option<String>,
    limit: Option<u32>,
    offset: u32,
) -> ArticleListResponse {
    let status = match status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match ArticleStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return ArticleListResponse {
                    ok: false,
                    items: Vec::new(),
                    applied_limit: 0,
                    message: format!("article_list failed: unknown status `{raw}`"),
                }
            }
        },
    };

    match with_article_service(|service| {
        service
            .list(status, limit, offset)
            .map_err(|err| err.to_string())
    }) {
        Ok(result) => ArticleListResponse {
            ok: true,
            message: format!("Found {} article(s).", result.items.len()),
            items: result.items.iter().map(to_list_entry).collect(),
            applied_limit: result.applied_limit,
        },
        Err(err) => ArticleListResponse {
            ok: false,
            items: Vec::new(),
            applied_limit: 0,
            message: format!("article_list failed: {err}"),
        },
    }
}

/// Loads one article for editing. `None` when missing or on error.
#[flutter_rust_bridge::frb(sync)]
pub fn article_get(article_id: String) -> Option<ArticleDetail> {
    let id = Uuid::parse_str(article_id.trim()).ok()?;
    match with_article_service(|service| service.get(id).map_err(|err| err.to_string())) {
        Ok(article) => article.as_ref().map(to_detail),
        Err(err) => {
            warn!(
                "event=ffi_call module=ffi status=error call=article_get error={}",
                err
            );
            None
        }
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn article_delete(article_id: String) -> ArticleActionResponse {
    let id = match Uuid::parse_str(article_id.trim()) {
        Ok(id) => id,
        Err(_) => {
            return ArticleActionResponse::failure(format!("invalid article id `{article_id}`"))
        }
    };
    match with_article_service(|service| service.delete(id).map_err(|err| err.to_string())) {
        Ok(()) => ArticleActionResponse::success("Article deleted.", id.to_string()),
        Err(err) => ArticleActionResponse::failure(format!("article_delete failed: {err}")),
    }
}

fn decode_document(document_json: &str) -> Document {
    Document::load_or_default(serde_json::from_str(document_json).ok())
}

fn parse_optional_id(raw: Option<&str>) -> Result<Option<Uuid>, String> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => Uuid::parse_str(value)
            .map(Some)
            .map_err(|_| format!("invalid article id `{value}`")),
    }
}

fn resolve_article_db_path() -> PathBuf {
    ARTICLE_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("MINI_CMS_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(ARTICLE_DB_FILE_NAME)
        })
        .clone()
}

fn with_article_service<T>(
    f: impl FnOnce(&mut ArticleService<SqliteArticleRepository<'_>>) -> Result<T, String>,
) -> Result<T, String> {
    let mut conn = open_db(resolve_article_db_path())
        .map_err(|err| format!("article DB open failed: {err}"))?;
    let repo = SqliteArticleRepository::try_new(&mut conn)
        .map_err(|err| format!("article repo init failed: {err}"))?;
    let mut service = ArticleService::new(repo);
    f(&mut service)
}

fn to_list_entry(item: &ArticleListItem) -> ArticleListEntry {
    ArticleListEntry {
        article_id: item.id.to_string(),
        title: item.title.clone(),
        summary: item.summary.clone(),
        image: item.image.clone(),
        status: item.status.as_str().to_string(),
        tags: item.tags.clone(),
        preview: item.preview.clone(),
        can_publish: item.can_publish,
        created_at: item.created_at,
        updated_at: item.updated_at,
    }
}

fn to_detail(article: &Article) -> ArticleDetail {
    ArticleDetail {
        article_id: article.id.to_string(),
        title: article.title.clone(),
        summary: article.summary.clone(),
        image: article.image.clone(),
        status: article.status.as_str().to_string(),
        tags: article.tags.clone(),
        document_json: serde_json::to_string(&article.document)
            .unwrap_or_else(|_| "[]".to_string()),
        html: article.html.clone(),
    }
}
