//! Bounded SQLite connection pool built on bb8.
//!
//! # Responsibility
//! - Create and validate pooled `rusqlite` connections.
//! - Run one query group per checkout on the blocking thread pool.
//!
//! # Invariants
//! - Migrations run once in [`FeedPool::open`] before any checkout, against
//!   the database backing the namespace.
//! - Every pooled connection has the namespace attached.
//! - A connection is held for exactly one query group, never across calls.
//! - The namespace is entered before every query group.

use super::namespace::{
    attach_namespace, enter_namespace, namespace_db_path, Namespace, NamespaceError,
};
use super::{bootstrap_connection, open_db, DbError, DbResult};
use bb8::{Pool, RunError};
use log::{debug, error, info};
use rusqlite::Connection;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Pool sizing and lifetime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_size: u32,
    pub min_idle: u32,
    pub max_lifetime: Option<Duration>,
    pub idle_timeout: Option<Duration>,
    /// Upper bound on waiting for a free slot.
    pub connection_timeout: Duration,
    /// Interval at which idle connections are reaped.
    pub health_check_period: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 10,
            min_idle: 2,
            max_lifetime: Some(Duration::from_secs(60 * 60)),
            idle_timeout: Some(Duration::from_secs(30 * 60)),
            connection_timeout: Duration::from_secs(30),
            health_check_period: Duration::from_secs(60),
        }
    }
}

/// Connection manager for the bb8 pool.
pub struct SqliteConnectionManager {
    path: Arc<PathBuf>,
    namespace: Namespace,
}

impl SqliteConnectionManager {
    pub fn new(path: impl Into<PathBuf>, namespace: Namespace) -> Self {
        Self {
            path: Arc::new(path.into()),
            namespace,
        }
    }
}

impl bb8::ManageConnection for SqliteConnectionManager {
    type Connection = Connection;
    type Error = DbError;

    async fn connect(&self) -> DbResult<Connection> {
        let path = Arc::clone(&self.path);
        let namespace = self.namespace.clone();
        tokio::task::spawn_blocking(move || -> DbResult<Connection> {
            let conn = Connection::open(path.as_path())?;
            bootstrap_connection(&conn)?;
            attach_namespace(&conn, &path, &namespace)?;
            Ok(conn)
        })
        .await
        .map_err(|err| DbError::Task(err.to_string()))?
    }

    async fn is_valid(&self, conn: &mut Connection) -> DbResult<()> {
        conn.query_row("SELECT 1;", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    fn has_broken(&self, _conn: &mut Connection) -> bool {
        false
    }
}

/// Shared handle to the pooled feed database.
///
/// Cloning is cheap; all clones share the same bounded pool.
#[derive(Clone)]
pub struct FeedPool {
    pool: Pool<SqliteConnectionManager>,
    namespace: Namespace,
}

impl FeedPool {
    /// Migrates the database backing `namespace` and builds the pool.
    ///
    /// For `main` that is the file at `path`; any other namespace is backed
    /// by a sibling file (see [`namespace_db_path`]) created on first use.
    ///
    /// # Errors
    /// - Returns [`DbError`] when migration or the initial connections fail.
    pub async fn open(
        path: impl AsRef<Path>,
        namespace: Namespace,
        config: &PoolConfig,
    ) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let migrate_path = if namespace.is_main() {
            path.clone()
        } else {
            namespace_db_path(&path, &namespace).ok_or_else(|| {
                DbError::Namespace(NamespaceError::InvalidName(format!(
                    "{namespace} (database path `{}` has no file name)",
                    path.display()
                )))
            })?
        };
        tokio::task::spawn_blocking(move || open_db(migrate_path).map(drop))
            .await
            .map_err(|err| DbError::Task(err.to_string()))??;

        let pool = Pool::builder()
            .max_size(config.max_size.max(1))
            .min_idle(Some(config.min_idle.min(config.max_size)))
            .max_lifetime(config.max_lifetime)
            .idle_timeout(config.idle_timeout)
            .connection_timeout(config.connection_timeout)
            .reaper_rate(config.health_check_period)
            .test_on_check_out(true)
            .build(SqliteConnectionManager::new(path, namespace.clone()))
            .await?;

        info!(
            "event=pool_open module=db status=ok max_size={} min_idle={} namespace={}",
            config.max_size, config.min_idle, namespace
        );

        Ok(Self { pool, namespace })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Runs one query group on a pooled connection.
    ///
    /// Acquires a connection, enters the namespace, runs `work` on the
    /// blocking pool and releases the connection when `work` returns.
    /// Dropping the returned future while waiting for a slot abandons the
    /// checkout; work already started runs to completion.
    pub async fn run<T, E, F>(&self, op: &'static str, work: F) -> Result<T, E>
    where
        T: Send + 'static,
        E: From<DbError> + From<NamespaceError> + Display + Send + 'static,
        F: FnOnce(&Connection, &Namespace) -> Result<T, E> + Send + 'static,
    {
        let started_at = Instant::now();
        let pooled = self.pool.get_owned().await.map_err(|err| {
            error!(
                "event=db_checkout module=db status=error op={} duration_ms={} error={}",
                op,
                started_at.elapsed().as_millis(),
                err
            );
            E::from(DbError::from(err))
        })?;

        let namespace = self.namespace.clone();
        let result = tokio::task::spawn_blocking(move || {
            enter_namespace(&pooled, &namespace)?;
            work(&pooled, &namespace)
        })
        .await
        .map_err(|err| E::from(DbError::Task(err.to_string())))?;

        match &result {
            Ok(_) => debug!(
                "event=db_query module=db status=ok op={} duration_ms={}",
                op,
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=db_query module=db status=error op={} duration_ms={} error={}",
                op,
                started_at.elapsed().as_millis(),
                err
            ),
        }

        result
    }
}

impl From<RunError<DbError>> for DbError {
    fn from(value: RunError<DbError>) -> Self {
        match value {
            RunError::User(err) => err,
            RunError::TimedOut => Self::Pool("timed out waiting for a connection".to_string()),
        }
    }
}
