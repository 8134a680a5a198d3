//! Domain model for the articles feed.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep write inputs, read models and query inputs as distinct types.
//!
//! # Invariants
//! - Authors and articles are identified by stable UUIDs assigned at creation.
//! - Neither authors nor articles are mutated after creation.

pub mod article;
pub mod author;
