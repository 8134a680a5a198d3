//! Core domain logic for the articles feed.
//! This crate owns author resolution, list query composition and the
//! pooled SQLite store; outer layers only bind requests and render responses.

pub mod db;
pub mod logging;
pub mod model;
pub mod pagination;
pub mod repo;
pub mod search;
pub mod service;

pub use db::{FeedPool, Namespace, NamespaceError, PoolConfig};
pub use logging::{default_log_level, init_logging};
pub use model::article::{
    Article, ArticleFilter, ArticleId, ArticlePage, ArticleValidationError, NewArticle,
};
pub use model::author::{Author, AuthorId};
pub use pagination::{PageWindow, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
pub use repo::{RepoError, RepoResult};
pub use search::compose::ArticleQuery;
pub use service::article_store::ArticleStore;
pub use service::author_directory::AuthorDirectory;
pub use service::error::{ErrorKind, FeedError, FeedResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
