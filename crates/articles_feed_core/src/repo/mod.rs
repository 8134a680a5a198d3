//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repositories operate on one already-checked-out connection and one
//!   namespace; they never acquire connections themselves.
//! - Repository APIs return semantic errors (`AuthorNotFound`) separately from
//!   transport errors and namespace setup failures.

pub mod article_repo;
pub mod author_repo;

use crate::db::{DbError, NamespaceError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for author/article persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    /// Exact-name author lookup missed. Recoverable.
    AuthorNotFound(String),
    /// Search-context setup failed before the query ran.
    Namespace(NamespaceError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthorNotFound(name) => write!(f, "author not found: `{name}`"),
            Self::Namespace(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Namespace(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::AuthorNotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Namespace(err) => Self::Namespace(err),
            other => Self::Db(other),
        }
    }
}

impl From<NamespaceError> for RepoError {
    fn from(value: NamespaceError) -> Self {
        Self::Namespace(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
