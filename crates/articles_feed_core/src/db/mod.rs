//! SQLite storage bootstrap, pooling and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the articles feed.
//! - Apply schema migrations in deterministic order.
//! - Hand out pooled connections scoped to a verified namespace.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations succeed.
//! - Every query group enters the configured namespace first.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
pub mod namespace;
mod open;
pub mod pool;

pub use namespace::{attach_namespace, enter_namespace, namespace_db_path, Namespace, NamespaceError};
pub use open::{bootstrap_connection, open_db};
pub use pool::{FeedPool, PoolConfig};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Pool could not hand out a connection (timeout or connect failure).
    Pool(String),
    /// Blocking storage task panicked or was cancelled by the runtime.
    Task(String),
    /// A new connection could not attach its namespace.
    Namespace(NamespaceError),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Pool(message) => write!(f, "connection pool error: {message}"),
            Self::Task(message) => write!(f, "storage task failed: {message}"),
            Self::Namespace(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Namespace(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Pool(_) | Self::Task(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<NamespaceError> for DbError {
    fn from(value: NamespaceError) -> Self {
        Self::Namespace(value)
    }
}
