//! Author repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Look up authors by exact display name.
//! - Create authors with insert-or-get semantics.
//!
//! # Invariants
//! - At most one author row exists per name (`UNIQUE(name)`).
//! - `create_author` always returns the row stored for the name, which may
//!   belong to a concurrent writer.

use crate::db::Namespace;
use crate::model::author::{Author, AuthorId};
use crate::repo::{RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

/// Repository interface for author resolution.
pub trait AuthorRepository {
    /// Exact-name lookup. `Ok(None)` is a miss, not a failure.
    fn find_author_by_name(&self, name: &str) -> RepoResult<Option<Author>>;
    /// Inserts `author` unless the name exists, then returns the stored row.
    fn create_author(&self, author: &Author) -> RepoResult<Author>;
}

/// SQLite-backed author repository.
pub struct SqliteAuthorRepository<'conn> {
    conn: &'conn Connection,
    namespace: &'conn Namespace,
}

impl<'conn> SqliteAuthorRepository<'conn> {
    pub fn new(conn: &'conn Connection, namespace: &'conn Namespace) -> Self {
        Self { conn, namespace }
    }
}

impl AuthorRepository for SqliteAuthorRepository<'_> {
    fn find_author_by_name(&self, name: &str) -> RepoResult<Option<Author>> {
        let sql = format!(
            "SELECT author_uuid, name FROM {} WHERE name = ?1;",
            self.namespace.qualify("authors")
        );
        let row = self
            .conn
            .query_row(&sql, [name], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .optional()?;

        row.map(|(uuid_text, name)| {
            Ok(Author {
                author_id: parse_author_uuid(&uuid_text)?,
                name,
            })
        })
        .transpose()
    }

    fn create_author(&self, author: &Author) -> RepoResult<Author> {
        let inserted = self.conn.execute(
            &format!(
                "INSERT INTO {} (author_uuid, name) VALUES (?1, ?2)
                 ON CONFLICT (name) DO NOTHING;",
                self.namespace.qualify("authors")
            ),
            params![author.author_id.to_string(), author.name.as_str()],
        )?;

        let stored = self.find_author_by_name(&author.name)?.ok_or_else(|| {
            RepoError::InvalidData("author row missing after insert-or-get".to_string())
        })?;

        if inserted == 0 {
            info!(
                "event=author_create module=repo status=ok outcome=existing author_id={}",
                stored.author_id
            );
        }

        Ok(stored)
    }
}

fn parse_author_uuid(value: &str) -> RepoResult<AuthorId> {
    Uuid::parse_str(value).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{value}` in authors.author_uuid"))
    })
}
