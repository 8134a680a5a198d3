//! Full-text search and list query composition.
//!
//! # Responsibility
//! - Build safe FTS5 match expressions from user text.
//! - Compose parameterized list/count queries from an article filter.

pub mod compose;
pub mod fts;
