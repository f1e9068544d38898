//! Article repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Store article records together with their document JSON and HTML.
//! - Replace an article's tag set atomically.
//!
//! # Invariants
//! - Title and summary are trimmed on write.
//! - Lists are ordered by `created_at DESC, uuid ASC`.
//! - A stored document that no longer decodes is read back as the default
//!   document instead of failing the whole read.

use crate::db::DbError;
use crate::model::article::{Article, ArticleId, ArticleStatus, ArticleValidationError};
use crate::model::document::Document;
use log::warn;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const ARTICLES_DEFAULT_LIMIT: u32 = 20;
const ARTICLES_LIMIT_MAX: u32 = 100;

const ARTICLE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    summary,
    image,
    status,
    document,
    html,
    created_at,
    updated_at
FROM articles";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for article persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(ArticleValidationError),
    Db(DbError),
    NotFound(ArticleId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "article not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid stored article data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ArticleValidationError> for RepoError {
    fn from(value: ArticleValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for article lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleListQuery {
    /// Optional exact status filter.
    pub status: Option<ArticleStatus>,
    /// Maximum rows to return. Defaults to 20 and clamps to 100.
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Data access contract for articles.
pub trait ArticleRepository {
    /// Inserts a new article with its tags and returns its id.
    fn create_article(&mut self, article: &Article) -> RepoResult<ArticleId>;
    /// Replaces every stored field of an existing article, tags included.
    fn update_article_full(&mut self, article: &Article) -> RepoResult<()>;
    fn get_article(&self, id: ArticleId) -> RepoResult<Option<Article>>;
    fn list_articles(&self, query: &ArticleListQuery) -> RepoResult<Vec<Article>>;
    fn delete_article(&mut self, id: ArticleId) -> RepoResult<()>;
    /// Replaces the tag set of one article in a single transaction.
    fn replace_tags(&mut self, id: ArticleId, tags: &[String]) -> RepoResult<()>;
}

/// SQLite-backed article repository.
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteArticleRepository<'conn> {
    /// Wraps a connection returned by `db::open_db*`.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn create_article(&mut self, article: &Article) -> RepoResult<ArticleId> {
        article.validate()?;
        let document = encode_document(&article.document)?;
        let now = now_millis();
        let created_at = if article.created_at > 0 {
            article.created_at
        } else {
            now
        };

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO articles (
                uuid,
                title,
                summary,
                image,
                status,
                document,
                html,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                article.id.to_string(),
                article.title.trim(),
                article.summary.trim(),
                article.image.as_deref(),
                article.status.as_str(),
                document,
                article.html,
                created_at,
                created_at.max(now),
            ],
        )?;
        write_tags(&tx, article.id, &article.tags)?;
        tx.commit()?;

        Ok(article.id)
    }

    fn update_article_full(&mut self, article: &Article) -> RepoResult<()> {
        article.validate()?;
        let document = encode_document(&article.document)?;

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE articles
             SET
                title = ?2,
                summary = ?3,
                image = ?4,
                status = ?5,
                document = ?6,
                html = ?7,
                updated_at = ?8
             WHERE uuid = ?1;",
            params![
                article.id.to_string(),
                article.title.trim(),
                article.summary.trim(),
                article.image.as_deref(),
                article.status.as_str(),
                document,
                article.html,
                now_millis(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(article.id));
        }
        write_tags(&tx, article.id, &article.tags)?;
        tx.commit()?;

        Ok(())
    }

    fn get_article(&self, id: ArticleId) -> RepoResult<Option<Article>> {
        let sql = format!("{ARTICLE_SELECT_SQL} WHERE uuid = ?1;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_article_row(self.conn, row)?)),
            None => Ok(None),
        }
    }

    fn list_articles(&self, query: &ArticleListQuery) -> RepoResult<Vec<Article>> {
        let mut sql = String::from(ARTICLE_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" WHERE status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }

        sql.push_str(" ORDER BY created_at DESC, uuid ASC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(normalize_article_limit(
            query.limit,
        ))));
        if query.offset > 0 {
            sql.push_str(" OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut articles = Vec::new();
        while let Some(row) = rows.next()? {
            articles.push(parse_article_row(self.conn, row)?);
        }
        Ok(articles)
    }

    fn delete_article(&mut self, id: ArticleId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM articles WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn replace_tags(&mut self, id: ArticleId, tags: &[String]) -> RepoResult<()> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        if !article_exists_in_tx(&tx, id)? {
            return Err(RepoError::NotFound(id));
        }
        write_tags(&tx, id, tags)?;
        tx.execute(
            "UPDATE articles SET updated_at = ?2 WHERE uuid = ?1;",
            params![id.to_string(), now_millis()],
        )?;
        tx.commit()?;
        Ok(())
    }
}

/// Normalizes a list limit: `None` or `0` use the default, larger values clamp.
pub fn normalize_article_limit(limit: Option<u32>) -> u32 {
    match limit {
        Some(0) | None => ARTICLES_DEFAULT_LIMIT,
        Some(value) if value > ARTICLES_LIMIT_MAX => ARTICLES_LIMIT_MAX,
        Some(value) => value,
    }
}

/// Trims, drops empty values and deduplicates tag ids.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn write_tags(tx: &Transaction<'_>, id: ArticleId, tags: &[String]) -> RepoResult<()> {
    let id_text = id.to_string();
    tx.execute(
        "DELETE FROM article_tags WHERE article_uuid = ?1;",
        [id_text.as_str()],
    )?;
    for tag in normalize_tags(tags) {
        tx.execute(
            "INSERT INTO article_tags (article_uuid, tag) VALUES (?1, ?2);",
            params![id_text.as_str(), tag],
        )?;
    }
    Ok(())
}

fn load_tags(conn: &Connection, id_text: &str) -> RepoResult<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT tag FROM article_tags WHERE article_uuid = ?1 ORDER BY tag ASC;")?;
    let mut rows = stmt.query([id_text])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        tags.push(row.get(0)?);
    }
    Ok(tags)
}

fn parse_article_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Article> {
    let id_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in articles.uuid"))
    })?;
    let status_text: String = row.get("status")?;
    let status = ArticleStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` for article {id}"))
    })?;
    let document_text: String = row.get("document")?;

    Ok(Article {
        id,
        title: row.get("title")?,
        summary: row.get("summary")?,
        image: row.get("image")?,
        status,
        tags: load_tags(conn, &id_text)?,
        document: decode_document(id, &document_text),
        html: row.get("html")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn encode_document(document: &Document) -> RepoResult<String> {
    serde_json::to_string(document)
        .map_err(|err| RepoError::InvalidData(format!("failed to encode document: {err}")))
}

fn decode_document(id: ArticleId, text: &str) -> Document {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => Document::load_or_default(Some(value)),
        Err(err) => {
            warn!(
                "event=article_read module=repo status=fallback article_id={} reason=document_json error={}",
                id, err
            );
            Document::new()
        }
    }
}

fn article_exists_in_tx(tx: &Transaction<'_>, id: ArticleId) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM articles WHERE uuid = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or_default()
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    for table in ["articles", "article_tags"] {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::InvalidData(format!(
                "missing required table `{table}`; open the connection with db::open_db"
            )));
        }
    }
    Ok(())
}
