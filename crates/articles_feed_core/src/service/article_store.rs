//! Article ingestion and listing use-case.
//!
//! # Responsibility
//! - Create articles bound to a resolved author.
//! - Assemble list pages from a count query and a page query.
//!
//! # Invariants
//! - Field validation is the caller's job; `create` persists input as given.
//! - `total_items` comes from the same predicates as the page, without window.
//! - An author created before a failed article insert is left in place.

use crate::db::FeedPool;
use crate::model::article::{Article, ArticleFilter, ArticlePage, NewArticle};
use crate::pagination::PageWindow;
use crate::repo::article_repo::{ArticleRepository, SqliteArticleRepository};
use crate::search::compose::ArticleQuery;
use crate::service::author_directory::AuthorDirectory;
use crate::service::error::{FeedError, FeedResult};
use chrono::{DateTime, Utc};
use log::{error, info};
use std::time::Instant;
use uuid::Uuid;

/// Article store facade over the pooled repositories.
#[derive(Clone)]
pub struct ArticleStore {
    pool: FeedPool,
    authors: AuthorDirectory,
}

impl ArticleStore {
    pub fn new(pool: FeedPool) -> Self {
        Self {
            authors: AuthorDirectory::new(pool.clone()),
            pool,
        }
    }

    pub fn authors(&self) -> &AuthorDirectory {
        &self.authors
    }

    /// Resolves the author, stamps the creation time and persists the article.
    ///
    /// Returns the stored article; its `article_id` is the new identity.
    pub async fn create(&self, input: NewArticle) -> FeedResult<Article> {
        let started_at = Instant::now();
        let author_id = self.authors.resolve(&input.author_name).await?;

        let article = Article {
            article_id: Uuid::new_v4(),
            author_id,
            author_name: input.author_name,
            title: input.title,
            body: input.body,
            created_at: now_utc(),
        };

        let record = article.clone();
        let inserted = self
            .pool
            .run("article_insert", move |conn, namespace| {
                SqliteArticleRepository::new(conn, namespace).insert_article(&record)
            })
            .await;

        if let Err(err) = inserted {
            let err = FeedError::from(err);
            error!(
                "event=article_create module=service status=error author_id={} duration_ms={} error_kind={}",
                author_id,
                started_at.elapsed().as_millis(),
                err.kind().as_str()
            );
            return Err(err);
        }

        info!(
            "event=article_create module=service status=ok article_id={} author_id={} title_len={} body_len={} duration_ms={}",
            article.article_id,
            author_id,
            article.title.chars().count(),
            article.body.chars().count(),
            started_at.elapsed().as_millis()
        );

        Ok(article)
    }

    /// Lists one page of articles matching `filter`, newest first.
    pub async fn list(&self, filter: &ArticleFilter) -> FeedResult<ArticlePage> {
        let started_at = Instant::now();
        let window = PageWindow::normalize(filter.page, filter.page_size);
        let query = ArticleQuery::build(filter);

        let count_query = query.clone();
        let total_items = self
            .pool
            .run("article_count", move |conn, namespace| {
                SqliteArticleRepository::new(conn, namespace).count_articles(&count_query)
            })
            .await?;

        let predicates = query.predicates().len();
        let articles = self
            .pool
            .run("article_page", move |conn, namespace| {
                SqliteArticleRepository::new(conn, namespace).list_articles(&query, &window)
            })
            .await?;

        info!(
            "event=article_list module=service status=ok page={} page_size={} predicates={} returned={} total_items={} duration_ms={}",
            window.page(),
            window.page_size(),
            predicates,
            articles.len(),
            total_items,
            started_at.elapsed().as_millis()
        );

        Ok(ArticlePage {
            articles,
            page: window.page(),
            page_size: window.page_size(),
            total_items,
        })
    }
}

/// Current instant truncated to the microsecond precision that is persisted.
fn now_utc() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::<Utc>::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}
