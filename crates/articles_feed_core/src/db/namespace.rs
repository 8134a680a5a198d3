//! Schema namespace (search context) selection.
//!
//! # Responsibility
//! - Validate configured namespace names so they are safe to interpolate.
//! - Attach the backing database of a non-`main` namespace on a connection.
//! - Verify, before each query group, that the namespace is attached on the
//!   connection and holds the feed relations.
//!
//! # Invariants
//! - A [`Namespace`] always matches `^[A-Za-z_][A-Za-z0-9_]*$` and is never
//!   the reserved `temp` schema.
//! - The `main` namespace lives in the configured database file; any other
//!   namespace lives in a sibling file named `<namespace>.<file name>`.
//! - Every failure while entering a namespace is a [`NamespaceError`], never a
//!   generic storage error.

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

const REQUIRED_RELATIONS: [&str; 4] = ["authors", "articles", "authors_fts", "articles_fts"];
const MAIN_SCHEMA: &str = "main";
const TEMP_SCHEMA: &str = "temp";

/// Failure of the per-query namespace setup step.
#[derive(Debug)]
pub enum NamespaceError {
    /// Configured name is not a plain SQL identifier.
    InvalidName(String),
    /// No database with this schema name is attached on the connection.
    UnknownSchema(String),
    /// Schema exists but lacks a relation the feed needs.
    MissingRelation {
        schema: String,
        relation: &'static str,
    },
    /// The setup queries themselves failed.
    Setup(rusqlite::Error),
}

impl Display for NamespaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "invalid namespace name `{name}`"),
            Self::UnknownSchema(name) => write!(f, "namespace `{name}` is not attached"),
            Self::MissingRelation { schema, relation } => {
                write!(f, "namespace `{schema}` has no relation `{relation}`")
            }
            Self::Setup(err) => write!(f, "namespace setup failed: {err}"),
        }
    }
}

impl Error for NamespaceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Setup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for NamespaceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Setup(value)
    }
}

/// Validated schema name that qualifies every feed relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(String);

impl Namespace {
    pub fn new(name: impl Into<String>) -> Result<Self, NamespaceError> {
        let name = name.into();
        if !IDENTIFIER_RE.is_match(&name) || name.eq_ignore_ascii_case(TEMP_SCHEMA) {
            return Err(NamespaceError::InvalidName(name));
        }
        Ok(Self(name))
    }

    /// The SQLite default schema.
    pub fn main() -> Self {
        Self(MAIN_SCHEMA.to_string())
    }

    pub fn is_main(&self) -> bool {
        self.0.eq_ignore_ascii_case(MAIN_SCHEMA)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `"<schema>".<relation>` for use inside SQL text.
    pub fn qualify(&self, relation: &str) -> String {
        format!("\"{}\".{relation}", self.0)
    }
}

impl Default for Namespace {
    fn default() -> Self {
        Self::main()
    }
}

impl Display for Namespace {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backing file of `namespace` for a feed database at `main_path`.
///
/// Returns `None` for `main`, which lives in `main_path` itself.
pub fn namespace_db_path(main_path: &Path, namespace: &Namespace) -> Option<PathBuf> {
    if namespace.is_main() {
        return None;
    }
    let file_name = main_path.file_name()?.to_string_lossy();
    Some(main_path.with_file_name(format!("{}.{file_name}", namespace.as_str())))
}

/// Attaches the backing database of `namespace` unless already attached.
///
/// No-op for `main`.
pub fn attach_namespace(
    conn: &Connection,
    main_path: &Path,
    namespace: &Namespace,
) -> Result<(), NamespaceError> {
    let Some(backing) = namespace_db_path(main_path, namespace) else {
        return Ok(());
    };
    if is_attached(conn, namespace)? {
        return Ok(());
    }
    conn.execute(
        &format!("ATTACH DATABASE ?1 AS \"{}\";", namespace.as_str()),
        [backing.to_string_lossy()],
    )?;
    Ok(())
}

/// Verifies the namespace on this connection before a query group runs.
///
/// # Errors
/// - [`NamespaceError::UnknownSchema`] when the schema is not attached.
/// - [`NamespaceError::MissingRelation`] when a feed relation is absent.
/// - [`NamespaceError::Setup`] when the catalog queries fail.
pub fn enter_namespace(conn: &Connection, namespace: &Namespace) -> Result<(), NamespaceError> {
    if !is_attached(conn, namespace)? {
        return Err(NamespaceError::UnknownSchema(namespace.as_str().to_string()));
    }

    let present: String = conn.query_row(
        &format!(
            "SELECT COALESCE(group_concat(name, ','), '') FROM {}
             WHERE type = 'table' AND name IN ('authors', 'articles', 'authors_fts', 'articles_fts');",
            namespace.qualify("sqlite_master")
        ),
        [],
        |row| row.get(0),
    )?;
    let present: Vec<&str> = present.split(',').collect();
    if let Some(relation) = REQUIRED_RELATIONS
        .into_iter()
        .find(|relation| !present.contains(relation))
    {
        return Err(NamespaceError::MissingRelation {
            schema: namespace.as_str().to_string(),
            relation,
        });
    }

    Ok(())
}

fn is_attached(conn: &Connection, namespace: &Namespace) -> Result<bool, NamespaceError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM pragma_database_list WHERE name = ?1 COLLATE NOCASE;",
            [namespace.as_str()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(found.is_some())
}
