//! FTS5 match-expression building.
//!
//! # Responsibility
//! - Turn free user text into a safe FTS5 match expression.
//!
//! # Invariants
//! - User text is never interpreted as raw FTS5 syntax.
//! - Every whitespace-separated term must match (`AND` semantics).
//! - Terms without any alphanumeric character are dropped.

/// Outcome of converting one text criterion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchExpression {
    /// Text was blank; the criterion is absent.
    Blank,
    /// Text had content but no searchable token; nothing can match.
    NoTokens,
    /// Expression to bind against `MATCH`.
    Terms(String),
}

/// Builds the match expression for `text`.
///
/// Each term becomes a quoted FTS5 phrase, so punctuation such as `:` or `-`
/// is tokenized instead of parsed as an operator.
pub fn build_match_expression(text: &str) -> MatchExpression {
    let text = text.trim();
    if text.is_empty() {
        return MatchExpression::Blank;
    }

    let terms = text
        .split_whitespace()
        .filter(|term| term.chars().any(char::is_alphanumeric))
        .map(escape_fts_term)
        .collect::<Vec<_>>();

    if terms.is_empty() {
        return MatchExpression::NoTokens;
    }

    MatchExpression::Terms(terms.join(" AND "))
}

fn escape_fts_term(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"")
}
