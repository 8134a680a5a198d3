//! Service-level error taxonomy.
//!
//! # Invariants
//! - The set of kinds is closed; callers map kinds, never inspect messages.
//! - Namespace setup failures are always `Configuration`, never `Storage`.

use crate::db::NamespaceError;
use crate::model::article::ArticleValidationError;
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type FeedResult<T> = Result<T, FeedError>;

/// Coarse failure category exposed to outer layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Configuration,
    Storage,
}

impl ErrorKind {
    /// Stable machine-readable name, used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Configuration => "configuration",
            Self::Storage => "storage",
        }
    }
}

/// Error returned by [`crate::ArticleStore`] and [`crate::AuthorDirectory`].
#[derive(Debug)]
pub enum FeedError {
    Validation(ArticleValidationError),
    /// Lookup miss that escaped its recovery path.
    NotFound(String),
    Configuration(NamespaceError),
    Storage(RepoError),
}

impl FeedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl Display for FeedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(message) => write!(f, "{message}"),
            Self::Configuration(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FeedError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Configuration(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<ArticleValidationError> for FeedError {
    fn from(value: ArticleValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for FeedError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Namespace(err) => Self::Configuration(err),
            RepoError::AuthorNotFound(name) => Self::NotFound(format!("author not found: `{name}`")),
            other => Self::Storage(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, FeedError};
    use crate::db::{DbError, NamespaceError};
    use crate::repo::RepoError;

    #[test]
    fn namespace_failures_map_to_configuration() {
        let err = FeedError::from(RepoError::Namespace(NamespaceError::UnknownSchema(
            "articles_feed".to_string(),
        )));
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn db_failures_map_to_storage() {
        let err = FeedError::from(RepoError::Db(DbError::Pool("timed out".to_string())));
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(err.kind().as_str(), "storage");
    }

    #[test]
    fn escaped_author_miss_maps_to_not_found() {
        let err = FeedError::from(RepoError::AuthorNotFound("Ann".to_string()));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
