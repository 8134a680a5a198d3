//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep HTTP and process wiring decoupled from storage details.

pub mod article_store;
pub mod author_directory;
pub mod error;
