//! Article domain model.
//!
//! # Responsibility
//! - Define the article read model, the create input and the list filter.
//! - Provide caller-side validation for create input.
//!
//! # Invariants
//! - `article_id` and `author_id` are set once at creation.
//! - `title` is non-empty after trimming for every accepted [`NewArticle`].
//! - `created_at` is UTC.

use crate::model::author::AuthorId;
use crate::pagination::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one article, assigned once at creation.
pub type ArticleId = Uuid;

/// Persisted article, denormalized with its author's display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub article_id: ArticleId,
    pub author_id: AuthorId,
    /// Empty when the author row is missing.
    pub author_name: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Create input as accepted from callers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub author_name: String,
    #[serde(default)]
    pub body: String,
}

/// Validation failures for [`NewArticle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticleValidationError {
    MissingTitle,
    MissingAuthorName,
}

impl Display for ArticleValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "'title' is required"),
            Self::MissingAuthorName => write!(f, "'authorName' is required"),
        }
    }
}

impl Error for ArticleValidationError {}

impl NewArticle {
    pub fn new(
        title: impl Into<String>,
        author_name: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author_name: author_name.into(),
            body: body.into(),
        }
    }

    /// Checks the fields the store relies on.
    ///
    /// The store does not call this; request layers must, before handing the
    /// input to [`crate::ArticleStore::create`].
    pub fn validate(&self) -> Result<(), ArticleValidationError> {
        if self.title.trim().is_empty() {
            return Err(ArticleValidationError::MissingTitle);
        }
        if self.author_name.trim().is_empty() {
            return Err(ArticleValidationError::MissingAuthorName);
        }
        Ok(())
    }
}

/// List criteria: page window plus optional full-text criteria.
///
/// Page values are kept as requested; [`crate::pagination::PageWindow`]
/// normalizes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleFilter {
    pub page: i64,
    pub page_size: i64,
    /// Token match over title and body.
    pub query: Option<String>,
    /// Token match over the author display name.
    pub author_name: Option<String>,
}

impl Default for ArticleFilter {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            query: None,
            author_name: None,
        }
    }
}

impl ArticleFilter {
    pub fn with_window(mut self, page: i64, page_size: i64) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_author_name(mut self, author_name: impl Into<String>) -> Self {
        self.author_name = Some(author_name.into());
        self
    }
}

/// One page of list results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePage {
    /// Sorted by `created_at` descending.
    pub articles: Vec<Article>,
    pub page: i64,
    pub page_size: i64,
    /// Matching rows across all pages.
    pub total_items: u64,
}
