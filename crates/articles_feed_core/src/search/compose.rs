//! Article list query composition.
//!
//! # Responsibility
//! - Translate an [`ArticleFilter`] into predicates over the FTS indexes.
//! - Render the count query and the page query from the same predicates.
//!
//! # Invariants
//! - Composition is pure: no I/O happens here.
//! - User-provided values are always bound, never spliced into SQL text.
//! - Placeholders are numbered only at render time, in predicate order.

use crate::db::Namespace;
use crate::model::article::ArticleFilter;
use crate::pagination::PageWindow;
use crate::search::fts::{build_match_expression, MatchExpression};
use rusqlite::types::Value;

/// What a single predicate tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    /// Token match over article title and body.
    ArticleText,
    /// Token match over the author display name.
    AuthorName,
    /// Criterion had text but no searchable token.
    Unsatisfiable,
}

/// One immutable `(kind, bound value)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    kind: PredicateKind,
    value: Option<Value>,
}

impl Predicate {
    pub fn kind(&self) -> PredicateKind {
        self.kind
    }

    fn render(&self, namespace: &Namespace, index: usize) -> String {
        match self.kind {
            PredicateKind::ArticleText => format!(
                "art.id IN (SELECT rowid FROM {} WHERE articles_fts MATCH ?{index})",
                namespace.qualify("articles_fts")
            ),
            PredicateKind::AuthorName => format!(
                "aut.id IN (SELECT rowid FROM {} WHERE authors_fts MATCH ?{index})",
                namespace.qualify("authors_fts")
            ),
            PredicateKind::Unsatisfiable => "0 = 1".to_string(),
        }
    }
}

/// Rendered SQL text with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Composed predicate set for listing articles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleQuery {
    predicates: Vec<Predicate>,
}

impl ArticleQuery {
    /// Builds one predicate per non-blank text criterion.
    pub fn build(filter: &ArticleFilter) -> Self {
        let mut query = Self::default();
        if let Some(text) = filter.query.as_deref() {
            query.push(PredicateKind::ArticleText, text);
        }
        if let Some(text) = filter.author_name.as_deref() {
            query.push(PredicateKind::AuthorName, text);
        }
        query
    }

    fn push(&mut self, kind: PredicateKind, text: &str) {
        let predicate = match build_match_expression(text) {
            MatchExpression::Blank => return,
            MatchExpression::NoTokens => Predicate {
                kind: PredicateKind::Unsatisfiable,
                value: None,
            },
            MatchExpression::Terms(expr) => Predicate {
                kind,
                value: Some(Value::Text(expr)),
            },
        };
        self.predicates.push(predicate);
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Returns `true` when every row qualifies.
    pub fn is_unfiltered(&self) -> bool {
        self.predicates.is_empty()
    }

    /// `SELECT COUNT(...)` over all matching rows, without a page window.
    pub fn count_statement(&self, namespace: &Namespace) -> SqlStatement {
        let mut params = Vec::new();
        let where_clause = self.render_where(namespace, &mut params);
        SqlStatement {
            sql: format!(
                "SELECT COUNT(art.id){}{where_clause};",
                from_clause(namespace)
            ),
            params,
        }
    }

    /// Page select, newest first, limited to `window`.
    pub fn page_statement(&self, namespace: &Namespace, window: &PageWindow) -> SqlStatement {
        let mut params = Vec::new();
        let where_clause = self.render_where(namespace, &mut params);
        let limit_index = params.len() + 1;
        params.push(Value::Integer(window.page_size()));
        params.push(Value::Integer(window.offset()));
        SqlStatement {
            sql: format!(
                "SELECT
                    art.article_uuid AS article_uuid,
                    art.author_uuid AS author_uuid,
                    art.title AS title,
                    art.body AS body,
                    art.created_at AS created_at,
                    aut.name AS author_name{}{where_clause}
                 ORDER BY art.created_at DESC
                 LIMIT ?{limit_index} OFFSET ?{};",
                from_clause(namespace),
                limit_index + 1
            ),
            params,
        }
    }

    fn render_where(&self, namespace: &Namespace, params: &mut Vec<Value>) -> String {
        if self.predicates.is_empty() {
            return String::new();
        }

        let mut fragments = Vec::with_capacity(self.predicates.len());
        for predicate in &self.predicates {
            let index = params.len() + 1;
            fragments.push(predicate.render(namespace, index));
            if let Some(value) = predicate.value.clone() {
                params.push(value);
            }
        }

        format!(" WHERE {}", fragments.join(" AND "))
    }
}

fn from_clause(namespace: &Namespace) -> String {
    format!(
        " FROM {} AS art LEFT JOIN {} AS aut ON aut.author_uuid = art.author_uuid",
        namespace.qualify("articles"),
        namespace.qualify("authors")
    )
}
