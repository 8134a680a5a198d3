//! Author domain model.

use uuid::Uuid;

/// Stable identifier of one author, assigned once at creation.
pub type AuthorId = Uuid;

/// Named author that articles are attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub author_id: AuthorId,
    /// Display name; also the exact-match lookup key.
    pub name: String,
}

impl Author {
    /// Creates an author with a freshly generated identity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            author_id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}
