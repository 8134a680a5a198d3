//! Article repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Insert articles bound to a resolved author.
//! - Execute composed count and page queries.
//!
//! # Invariants
//! - `created_at` is persisted as Unix epoch microseconds (UTC).
//! - A missing author row yields an empty `author_name`, never an error.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::Namespace;
use crate::model::article::{Article, ArticleId};
use crate::pagination::PageWindow;
use crate::repo::{RepoError, RepoResult};
use crate::search::compose::ArticleQuery;
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, Row};
use uuid::Uuid;

/// Repository interface for article ingestion and listing.
pub trait ArticleRepository {
    /// Persists `article`; `author_name` is not stored on the article row.
    fn insert_article(&self, article: &Article) -> RepoResult<ArticleId>;
    /// Counts every row matching `query`, ignoring any page window.
    fn count_articles(&self, query: &ArticleQuery) -> RepoResult<u64>;
    /// Returns one page of rows matching `query`, newest first.
    fn list_articles(&self, query: &ArticleQuery, window: &PageWindow)
        -> RepoResult<Vec<Article>>;
}

/// SQLite-backed article repository.
pub struct SqliteArticleRepository<'conn> {
    conn: &'conn Connection,
    namespace: &'conn Namespace,
}

impl<'conn> SqliteArticleRepository<'conn> {
    pub fn new(conn: &'conn Connection, namespace: &'conn Namespace) -> Self {
        Self { conn, namespace }
    }
}

impl ArticleRepository for SqliteArticleRepository<'_> {
    fn insert_article(&self, article: &Article) -> RepoResult<ArticleId> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (
                    article_uuid,
                    author_uuid,
                    title,
                    body,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                self.namespace.qualify("articles")
            ),
            params![
                article.article_id.to_string(),
                article.author_id.to_string(),
                article.title.as_str(),
                article.body.as_str(),
                article.created_at.timestamp_micros(),
            ],
        )?;

        Ok(article.article_id)
    }

    fn count_articles(&self, query: &ArticleQuery) -> RepoResult<u64> {
        let statement = query.count_statement(self.namespace);
        let count: i64 = self.conn.query_row(
            &statement.sql,
            params_from_iter(statement.params),
            |row| row.get(0),
        )?;

        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative article count `{count}`")))
    }

    fn list_articles(
        &self,
        query: &ArticleQuery,
        window: &PageWindow,
    ) -> RepoResult<Vec<Article>> {
        let statement = query.page_statement(self.namespace, window);
        let mut stmt = self.conn.prepare(&statement.sql)?;
        let mut rows = stmt.query(params_from_iter(statement.params))?;
        let mut articles = Vec::new();

        while let Some(row) = rows.next()? {
            articles.push(parse_article_row(row)?);
        }

        Ok(articles)
    }
}

fn parse_article_row(row: &Row<'_>) -> RepoResult<Article> {
    let article_uuid: String = row.get("article_uuid")?;
    let author_uuid: String = row.get("author_uuid")?;
    let created_at_micros: i64 = row.get("created_at")?;
    let created_at = DateTime::<Utc>::from_timestamp_micros(created_at_micros).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid timestamp `{created_at_micros}` in articles.created_at"
        ))
    })?;

    Ok(Article {
        article_id: parse_uuid(&article_uuid, "articles.article_uuid")?,
        author_id: parse_uuid(&author_uuid, "articles.author_uuid")?,
        author_name: row
            .get::<_, Option<String>>("author_name")?
            .unwrap_or_default(),
        title: row.get("title")?,
        body: row.get::<_, Option<String>>("body")?.unwrap_or_default(),
        created_at,
    })
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
