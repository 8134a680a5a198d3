//! Author resolution use-case.
//!
//! # Responsibility
//! - Resolve a display name to a stable author identity.
//! - Create the author on first use of a name.
//!
//! # Invariants
//! - A lookup miss is control flow, never a caller-visible error.
//! - Lookup and create are separate pool checkouts; no transaction spans both.
//! - Concurrent first use of a name converges on one identity.

use crate::db::FeedPool;
use crate::model::author::{Author, AuthorId};
use crate::repo::author_repo::{AuthorRepository, SqliteAuthorRepository};
use crate::repo::{RepoError, RepoResult};
use crate::service::error::FeedResult;
use log::info;

/// Resolves author names against the pooled store.
#[derive(Clone)]
pub struct AuthorDirectory {
    pool: FeedPool,
}

impl AuthorDirectory {
    pub fn new(pool: FeedPool) -> Self {
        Self { pool }
    }

    /// Returns the identity bound to `name`, creating one when absent.
    ///
    /// `name` is expected to be validated (non-blank) by the caller.
    ///
    /// # Errors
    /// - `Configuration` when namespace setup fails.
    /// - `Storage` for any other store failure; no retry is attempted.
    pub async fn resolve(&self, name: &str) -> FeedResult<AuthorId> {
        match self.lookup(name).await {
            Ok(author) => return Ok(author.author_id),
            Err(RepoError::AuthorNotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }

        let candidate = Author::new(name);
        let candidate_id = candidate.author_id;
        let stored = self
            .pool
            .run("author_create", move |conn, namespace| {
                SqliteAuthorRepository::new(conn, namespace).create_author(&candidate)
            })
            .await?;

        if stored.author_id == candidate_id {
            info!(
                "event=author_create module=service status=ok author_id={}",
                stored.author_id
            );
        }

        Ok(stored.author_id)
    }

    /// Exact-name lookup reporting a miss as [`RepoError::AuthorNotFound`].
    pub async fn lookup(&self, name: &str) -> RepoResult<Author> {
        let owned = name.to_string();
        let found = self
            .pool
            .run("author_lookup", move |conn, namespace| {
                SqliteAuthorRepository::new(conn, namespace).find_author_by_name(&owned)
            })
            .await?;

        found.ok_or_else(|| RepoError::AuthorNotFound(name.to_string()))
    }
}
